//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Operator CLI for hardware layout files."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use gw_layout_common::{init_tracing, LoggingConfig, VersionInfo};

mod layout;
mod scaffold;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "GridWorks hardware layout utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a layout file and summarize its contents.
    Show(layout::ShowCommand),
    /// Load a layout file and report every per-record problem.
    Validate(layout::ValidateCommand),
    /// Write a stub House0 layout file for a new site.
    Scaffold(scaffold::ScaffoldCommand),
}

fn main() -> Result<()> {
    init_tracing("gw-layoutctl", &LoggingConfig::default())?;
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }
    match cli.command {
        Commands::Show(cmd) => cmd.execute()?,
        Commands::Validate(cmd) => cmd.execute()?,
        Commands::Scaffold(cmd) => cmd.execute()?,
    }
    Ok(())
}
