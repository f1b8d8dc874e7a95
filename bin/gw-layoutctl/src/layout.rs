//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Show and validate subcommands for layout files."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gw_layout_core::{HardwareLayout, LoadOptions};

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Path to the layout file.
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

impl ShowCommand {
    pub fn execute(self) -> Result<()> {
        let loaded = HardwareLayout::load(&self.path, &LoadOptions::collecting())
            .with_context(|| format!("loading layout {}", self.path.display()))?;
        let layout = &loaded.layout;
        println!("layout: {}", self.path.display());
        println!("  cacs:       {}", layout.cacs.len());
        println!("  components: {}", layout.components.len());
        println!("  nodes:      {}", layout.nodes.len());
        println!("  channels:   {}", layout.channels.len());
        if let Some(alias) = layout.atn_g_node_alias() {
            println!("  atn:        {alias}");
        }
        if let Some(alias) = layout.scada_g_node_alias() {
            println!("  scada:      {alias}");
        }
        if let Some(alias) = layout.terminal_asset_g_node_alias() {
            println!("  asset:      {alias}");
        }
        if !loaded.errors.is_empty() {
            println!("  problems:   {} (see `validate`)", loaded.errors.len());
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Path to the layout file.
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

impl ValidateCommand {
    pub fn execute(self) -> Result<()> {
        let loaded = HardwareLayout::load(&self.path, &LoadOptions::collecting())
            .with_context(|| format!("loading layout {}", self.path.display()))?;
        if loaded.errors.is_empty() {
            println!("{}: ok", self.path.display());
            return Ok(());
        }
        for error in &loaded.errors {
            eprintln!("[{}] {:#}", error.kind, error.source);
            eprintln!("  record: {}", error.record);
        }
        anyhow::bail!(
            "{}: {} invalid record(s)",
            self.path.display(),
            loaded.errors.len()
        );
    }
}
