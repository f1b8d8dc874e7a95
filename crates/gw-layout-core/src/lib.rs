//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware layout loader, link resolver, and aggregate."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Loader and resolver for GridWorks hardware layout documents.
//!
//! A layout document is stitched into a cross-referenced in-memory object
//! graph in two passes: the registry loaders in [`load`] populate id/name
//! keyed maps independently, then [`load::resolve_links`] cross-links nodes
//! to components and drives subtype-specific resolution. The
//! [`HardwareLayout`] aggregate owns the maps and exposes derived, cached
//! relationship queries; [`House0Layout`] adds the House0 strategy
//! invariants on top.
//!
//! Reads are permissive (broken optional links answer `None`), structural
//! checks are strict (missing parents, missing required roles, and House0
//! preconditions raise descriptive errors at the point of use).

use std::path::PathBuf;

use gw_layout_schema::Role;

/// Result alias used throughout the layout crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Error type for layout loading and structural checks.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A single record failed to decode (only surfaced directly under the
    /// raising error policy).
    #[error("failed to decode {kind} record: {source}")]
    Decode {
        /// Record-kind tag (the list the record came from).
        kind: String,
        /// Underlying decode failure.
        #[source]
        source: anyhow::Error,
    },
    /// A node references a component id that was never loaded.
    #[error("node {node} references missing component {component_id}")]
    MissingComponent {
        /// Alias of the referencing node.
        node: String,
        /// The dangling component id.
        component_id: String,
    },
    /// A dotted alias has a parent prefix that is not itself a loaded node.
    #[error("node {alias} has no loaded parent {parent}")]
    MissingParent {
        /// Alias whose parent was requested.
        alias: String,
        /// The missing parent alias.
        parent: String,
    },
    /// A derived property requiring a distinguished role found no node
    /// carrying it.
    #[error("layout has no node with role {role}")]
    MissingRequiredRole {
        /// The absent role.
        role: Role,
    },
    /// The document is not a House0 layout: no node named `"s"`.
    #[error("house0 layout requires a node named \"s\"")]
    MissingScadaNode,
    /// The document is not a valid House0 layout instance.
    #[error("house0 scada node field {field} is invalid: {reason}")]
    InvalidHouse0Field {
        /// Offending field on the `"s"` record.
        field: &'static str,
        /// Human-readable description of the violation.
        reason: String,
    },
    /// The layout file could not be read.
    #[error("unable to read layout file {path}: {source}")]
    Io {
        /// Path that failed to open or read.
        path: PathBuf,
        /// Underlying io failure.
        #[source]
        source: std::io::Error,
    },
    /// The layout file parsed, but its top level is not a JSON object.
    #[error("layout document is not a json object")]
    NotAnObject,
    /// The layout file is not valid JSON.
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod house0;
pub mod layout;
pub mod load;
pub mod test_support;

pub use house0::{House0Layout, House0RequiredNames};
pub use layout::{parent_alias, GNodes, HardwareLayout, Loaded, TelemetryTuple};
pub use load::{
    load_cacs, load_channels, load_components, load_nodes, resolve_links, ErrorPolicy,
    LayoutDocument, LoadError, LoadOptions,
};
