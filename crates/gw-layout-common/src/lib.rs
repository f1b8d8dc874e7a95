//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives for the layout toolchain."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Shared primitives for the GridWorks layout workspace.
//! This crate exposes tracing bootstrap helpers and version metadata
//! consumed by the layout library crates and the `gw-layoutctl` binary.

pub mod logging;
pub mod version;

pub use logging::{init_tracing, LogFormat, LoggingConfig};
pub use version::VersionInfo;
