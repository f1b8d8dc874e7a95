//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Version metadata for layout tooling."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fmt;

/// Version metadata reported by layout binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Semantic version of the workspace.
    pub version: &'static str,
    /// Crate that produced the binary.
    pub package: &'static str,
}

impl VersionInfo {
    /// Version information for the currently compiled crate tree.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            package: env!("CARGO_PKG_NAME"),
        }
    }

    /// Extended human-readable description.
    pub fn extended(&self) -> String {
        format!("gridworks-layout {} ({})", self.version, self.package)
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}
