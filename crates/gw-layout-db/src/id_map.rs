//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Id assignments of an existing layout, keyed logically."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use gw_layout_core::load::{
    CAC_LIST_NAMES, CHANNEL_LIST, COMPONENT_LIST_NAMES, NODE_LIST, OTHER_CAC_LIST,
    OTHER_COMPONENT_LIST,
};
use gw_layout_core::LayoutDocument;
use gw_layout_schema::MakeModel;

use crate::{DbError, Result};

/// The id assignments of an existing layout document, keyed by the logical
/// identity of each record rather than by the id itself.
///
/// Extraction works on raw records: a document too malformed for the typed
/// loaders can still surrender its ids, so a rewrite repairs structure
/// without renaming anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutIDMap {
    /// Cac id per known make/model.
    pub cac_id_by_make_model: HashMap<MakeModel, String>,
    /// Cac id per display name, for unknown-make device classes whose
    /// identity is carried by their display name.
    pub unknown_cac_id_by_display_name: HashMap<String, String>,
    /// Component id per display name.
    pub component_id_by_display_name: HashMap<String, String>,
    /// Node id per node name.
    pub node_id_by_name: HashMap<String, String>,
    /// Channel id per channel name.
    pub channel_id_by_name: HashMap<String, String>,
}

fn records<'a>(doc: &'a LayoutDocument, list_name: &str) -> &'a [Value] {
    doc.get(list_name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

impl LayoutIDMap {
    /// Extract the id assignments present in a document.
    ///
    /// Fails hard on a [`DbError::MakeModelIdClash`]: an id the static
    /// registry table assigns to one make/model must not be claimed for
    /// another, and silently regenerating around the clash would fork the
    /// device class's history.
    pub fn from_document(doc: &LayoutDocument) -> Result<Self> {
        let mut map = Self::default();
        for &list_name in CAC_LIST_NAMES.iter().chain([&OTHER_CAC_LIST]) {
            for record in records(doc, list_name) {
                let Some(cac_id) = str_field(record, "ComponentAttributeClassId") else {
                    continue;
                };
                let make_model = str_field(record, "MakeModel")
                    .map(|raw| MakeModel::from(raw.to_owned()))
                    .unwrap_or_default();
                if let Some(canonical) = MakeModel::by_canonical_cac_id(cac_id) {
                    if canonical != make_model {
                        return Err(DbError::MakeModelIdClash {
                            cac_id: cac_id.to_owned(),
                            claimed: make_model,
                            canonical,
                        });
                    }
                }
                if make_model.is_unknown() {
                    if let Some(display_name) = str_field(record, "DisplayName") {
                        map.unknown_cac_id_by_display_name
                            .insert(display_name.to_owned(), cac_id.to_owned());
                    }
                } else {
                    map.cac_id_by_make_model
                        .insert(make_model, cac_id.to_owned());
                }
            }
        }
        for &list_name in COMPONENT_LIST_NAMES.iter().chain([&OTHER_COMPONENT_LIST]) {
            for record in records(doc, list_name) {
                if let (Some(display_name), Some(component_id)) = (
                    str_field(record, "DisplayName"),
                    str_field(record, "ComponentId"),
                ) {
                    map.component_id_by_display_name
                        .insert(display_name.to_owned(), component_id.to_owned());
                }
            }
        }
        for record in records(doc, NODE_LIST) {
            if let (Some(name), Some(node_id)) =
                (str_field(record, "Name"), str_field(record, "ShNodeId"))
            {
                map.node_id_by_name.insert(name.to_owned(), node_id.to_owned());
            }
        }
        for record in records(doc, CHANNEL_LIST) {
            if let (Some(name), Some(channel_id)) =
                (str_field(record, "Name"), str_field(record, "Id"))
            {
                map.channel_id_by_name
                    .insert(name.to_owned(), channel_id.to_owned());
            }
        }
        Ok(map)
    }

    /// Read and parse a layout file, then extract its id assignments.
    ///
    /// A missing file yields an empty map: first-time generation starts
    /// from nothing to reuse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| DbError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        match value {
            Value::Object(doc) => Self::from_document(&doc),
            _ => Err(DbError::NotAnObject),
        }
    }
}
