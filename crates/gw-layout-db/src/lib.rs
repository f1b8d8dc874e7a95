//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Layout generation with stable id reuse across rewrites."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Write path for GridWorks hardware layout documents.
//!
//! Re-generating a layout file must not churn identities: ids name physical
//! things and downstream history is keyed on them. [`LayoutIDMap`] captures
//! the id assignments of an existing document by logical key (make/model,
//! display name, node name, channel name), and [`LayoutDb`] consults it
//! before minting anything new. [`House0LayoutDb`] scaffolds the standard
//! House0 node set on top.

use std::path::PathBuf;

use gw_layout_schema::MakeModel;

/// Result alias used throughout the db crate.
pub type Result<T> = std::result::Result<T, DbError>;

/// Error type for layout generation and persistence.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A loaded cac claims an id the static registry table assigns to a
    /// different make/model.
    #[error(
        "cac id {cac_id} is canonically assigned to {canonical}, \
         but the document claims it for {claimed}"
    )]
    MakeModelIdClash {
        /// The contested id.
        cac_id: String,
        /// Make/model the document attaches to the id.
        claimed: MakeModel,
        /// Make/model the registry table assigns the id to.
        canonical: MakeModel,
    },
    /// A House0 site parameter is outside its allowed range.
    #[error("house0 site parameter {field} is invalid: {reason}")]
    InvalidSiteParameter {
        /// Offending parameter.
        field: &'static str,
        /// Human-readable description of the violation.
        reason: String,
    },
    /// The layout file could not be read or written.
    #[error("layout file io error at {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying io failure.
        #[source]
        source: std::io::Error,
    },
    /// The layout file parsed, but its top level is not a JSON object.
    #[error("layout document is not a json object")]
    NotAnObject,
    /// JSON encode/decode failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod db;
pub mod house0_db;
pub mod id_map;

pub use db::LayoutDb;
pub use house0_db::House0LayoutDb;
pub use id_map::LayoutIDMap;
