//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Typed hardware-description records and decoder tables."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Typed records for GridWorks hardware layout documents.
//!
//! A layout document is a single JSON object whose record lists describe
//! device classes ([`Cac`]), physical device instances ([`Component`]),
//! actor-hierarchy nodes ([`ShNode`]), and telemetry channels
//! ([`DataChannel`]). Records are PascalCase-keyed and carry a `TypeName`
//! tag; the decoder tables in [`decoder`] route catch-all records to the
//! right subtype and fall back to a minimal generic record for tags this
//! build does not know.

/// Result alias used throughout the schema crate.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Error type for record decoding and component resolution.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Wrapper for JSON decode failures on a single record.
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
    /// Raised when a record lacks a key the decoder needs to route it.
    #[error("record is missing required key {0}")]
    MissingKey(&'static str),
    /// Raised by component resolution when two sibling channel lists do not
    /// name the same channel set.
    #[error(
        "channel set mismatch while resolving component for node {node}: \
         io channels {io_channels:?} vs config channels {config_channels:?}"
    )]
    ChannelMismatch {
        /// Alias of the node whose component failed to resolve.
        node: String,
        /// Channel names declared by the register/io list.
        io_channels: Vec<String>,
        /// Channel names declared by the reporting config list.
        config_channels: Vec<String>,
    },
}

pub mod cac;
pub mod channel;
pub mod component;
pub mod decoder;
pub mod enums;
pub mod gnode;
pub mod node;

pub use cac::{Cac, CacAttrs};
pub use channel::DataChannel;
pub use component::{ChannelConfig, Component, ComponentConfig, EgaugeIo, EgaugeRegisterConfig};
pub use decoder::{CacDecoder, ComponentDecoder};
pub use enums::{ActorClass, MakeModel, Role, TelemetryName, Unit};
pub use gnode::GNode;
pub use node::ShNode;
