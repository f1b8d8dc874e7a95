//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Scaffold subcommand writing stub House0 layouts."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gw_layout_db::{House0LayoutDb, LayoutIDMap};
use tracing::info;

#[derive(Debug, Args)]
pub struct ScaffoldCommand {
    /// Path of the layout file to write.
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Number of thermal store tanks at the site (1-6).
    #[arg(long, value_name = "N")]
    tanks: u32,

    /// Heating zone names.
    #[arg(long, value_name = "NAME", value_delimiter = ',', required = true)]
    zones: Vec<String>,

    /// Overwrite an existing file, reusing the ids it already assigns.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    force: bool,
}

impl ScaffoldCommand {
    pub fn execute(self) -> Result<()> {
        if self.path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists; pass --force to rewrite it (ids are preserved)",
                self.path.display()
            );
        }
        // Rewrites reuse every id the existing file assigns, so downstream
        // channel history survives a re-scaffold.
        let loaded = LayoutIDMap::from_path(&self.path)
            .with_context(|| format!("reading existing ids from {}", self.path.display()))?;
        let db = House0LayoutDb::new(loaded, self.tanks, self.zones, true)?;
        db.write(&self.path)
            .with_context(|| format!("writing layout {}", self.path.display()))?;
        info!(
            path = %self.path.display(),
            tanks = self.tanks,
            zones = db.required_names().zones.len(),
            "scaffolded house0 layout"
        );
        println!("wrote {}", self.path.display());
        Ok(())
    }
}
