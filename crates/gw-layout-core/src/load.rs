//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Registry loaders and the node/component link resolver."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::HashSet;

use anyhow::anyhow;
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use gw_layout_schema::{Cac, CacDecoder, Component, ComponentDecoder, DataChannel, ShNode};

use crate::{LayoutError, Result};

/// A parsed layout document: the top-level JSON object mapping record-list
/// names to arrays of records, plus the free-form GNode identity blocks.
pub type LayoutDocument = serde_json::Map<String, Value>;

/// Well-known cac list names, decoded with the typed maker directly.
pub const CAC_LIST_NAMES: &[&str] = &[
    "RelayCacs",
    "ElectricMeterCacs",
    "MultipurposeSensorCacs",
    "SimpleTempSensorCacs",
];
/// Catch-all cac list, routed through the decoder table.
pub const OTHER_CAC_LIST: &str = "OtherCacs";

/// Well-known component list names, decoded with the typed maker directly.
pub const COMPONENT_LIST_NAMES: &[&str] = &[
    "RelayComponents",
    "ElectricMeterComponents",
    "MultipurposeSensorComponents",
    "SimpleTempSensorComponents",
];
/// Catch-all component list, routed through the decoder table.
pub const OTHER_COMPONENT_LIST: &str = "OtherComponents";

/// List name for spaceheat node records.
pub const NODE_LIST: &str = "ShNodes";
/// List name for data channel records.
pub const CHANNEL_LIST: &str = "DataChannels";

/// Per-record failure policy shared by every loader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// The first decode failure propagates immediately, aborting the load.
    #[default]
    Raise,
    /// Failures are appended to the error accumulator and loading
    /// continues with the next record.
    Collect,
}

/// One accumulated per-record failure: the record-kind tag, the raw
/// offending record, and the underlying error.
#[derive(Debug)]
pub struct LoadError {
    /// Record-kind tag (list name, or `"ShNode"` for link resolution).
    pub kind: String,
    /// The raw record (or a synthetic sub-record for link resolution).
    pub record: Value,
    /// The underlying failure.
    pub source: anyhow::Error,
}

/// Options threaded through `load`/`load_dict` into every loader stage.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Raise-or-collect policy applied per record.
    pub policy: ErrorPolicy,
    /// When present, only nodes with these names are decoded (partial
    /// layout load, e.g. for a single actor process).
    pub included_node_names: Option<HashSet<String>>,
    /// Dispatch table for catch-all cac records.
    pub cac_decoder: CacDecoder,
    /// Dispatch table for catch-all component records.
    pub component_decoder: ComponentDecoder,
}

impl LoadOptions {
    /// Options with the accumulate-and-continue policy.
    pub fn collecting() -> Self {
        Self {
            policy: ErrorPolicy::Collect,
            ..Self::default()
        }
    }
}

fn records<'a>(doc: &'a LayoutDocument, list_name: &str) -> &'a [Value] {
    doc.get(list_name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn report(
    kind: &str,
    record: &Value,
    source: anyhow::Error,
    policy: ErrorPolicy,
    errors: &mut Vec<LoadError>,
) -> Result<()> {
    match policy {
        ErrorPolicy::Raise => Err(LayoutError::Decode {
            kind: kind.to_owned(),
            source,
        }),
        ErrorPolicy::Collect => {
            errors.push(LoadError {
                kind: kind.to_owned(),
                record: record.clone(),
                source,
            });
            Ok(())
        }
    }
}

/// Scan every cac list in the document into an id-keyed map.
///
/// Later records with a colliding id silently overwrite earlier ones;
/// uniqueness is a caller concern.
pub fn load_cacs(
    doc: &LayoutDocument,
    decoder: &CacDecoder,
    policy: ErrorPolicy,
    errors: &mut Vec<LoadError>,
) -> Result<IndexMap<String, Cac>> {
    let mut cacs = IndexMap::new();
    for list_name in CAC_LIST_NAMES {
        for record in records(doc, list_name) {
            match serde_json::from_value::<Cac>(record.clone()) {
                Ok(cac) => {
                    cacs.insert(cac.component_attribute_class_id.clone(), cac);
                }
                Err(err) => report(list_name, record, anyhow!(err), policy, errors)?,
            }
        }
    }
    for record in records(doc, OTHER_CAC_LIST) {
        match decoder.decode(record) {
            Ok(cac) => {
                cacs.insert(cac.component_attribute_class_id.clone(), cac);
            }
            Err(err) => report(OTHER_CAC_LIST, record, anyhow!(err), policy, errors)?,
        }
    }
    debug!(count = cacs.len(), "loaded cacs");
    Ok(cacs)
}

/// Scan every component list in the document into an id-keyed map.
pub fn load_components(
    doc: &LayoutDocument,
    decoder: &ComponentDecoder,
    policy: ErrorPolicy,
    errors: &mut Vec<LoadError>,
) -> Result<IndexMap<String, Component>> {
    let mut components = IndexMap::new();
    for list_name in COMPONENT_LIST_NAMES {
        for record in records(doc, list_name) {
            match serde_json::from_value::<Component>(record.clone()) {
                Ok(component) => {
                    components.insert(component.component_id.clone(), component);
                }
                Err(err) => report(list_name, record, anyhow!(err), policy, errors)?,
            }
        }
    }
    for record in records(doc, OTHER_COMPONENT_LIST) {
        match decoder.decode(record) {
            Ok(component) => {
                components.insert(component.component_id.clone(), component);
            }
            Err(err) => report(OTHER_COMPONENT_LIST, record, anyhow!(err), policy, errors)?,
        }
    }
    debug!(count = components.len(), "loaded components");
    Ok(components)
}

/// Scan the node list into a name-keyed map, optionally restricted to an
/// allow-list of node names.
pub fn load_nodes(
    doc: &LayoutDocument,
    policy: ErrorPolicy,
    errors: &mut Vec<LoadError>,
    included_names: Option<&HashSet<String>>,
) -> Result<IndexMap<String, ShNode>> {
    let mut nodes = IndexMap::new();
    for record in records(doc, NODE_LIST) {
        if let Some(allow) = included_names {
            let name = record.get("Name").and_then(Value::as_str).unwrap_or("");
            if !allow.contains(name) {
                continue;
            }
        }
        match serde_json::from_value::<ShNode>(record.clone()) {
            Ok(node) => {
                nodes.insert(node.name.clone(), node);
            }
            Err(err) => report(NODE_LIST, record, anyhow!(err), policy, errors)?,
        }
    }
    debug!(count = nodes.len(), "loaded nodes");
    Ok(nodes)
}

/// Scan the data channel list into a name-keyed map.
pub fn load_channels(
    doc: &LayoutDocument,
    policy: ErrorPolicy,
    errors: &mut Vec<LoadError>,
) -> Result<IndexMap<String, DataChannel>> {
    let mut channels = IndexMap::new();
    for record in records(doc, CHANNEL_LIST) {
        match serde_json::from_value::<DataChannel>(record.clone()) {
            Ok(channel) => {
                channels.insert(channel.name.clone(), channel);
            }
            Err(err) => report(CHANNEL_LIST, record, anyhow!(err), policy, errors)?,
        }
    }
    debug!(count = channels.len(), "loaded channels");
    Ok(channels)
}

/// Second pass: resolve every node's component reference and drive
/// subtype-specific component resolution.
///
/// Resolution is node-by-node in map-iteration order; nodes resolve
/// independently against the already-fully-loaded component map, so a
/// single node's failure under the collecting policy never blocks its
/// siblings. Each failure is tagged `"ShNode"` with a synthetic
/// `{"node": {"name": ...}}` sub-record.
pub fn resolve_links(
    nodes: &IndexMap<String, ShNode>,
    components: &mut IndexMap<String, Component>,
    policy: ErrorPolicy,
    errors: &mut Vec<LoadError>,
) -> Result<()> {
    // Read-only view handed to resolution hooks; a hook may not observe
    // mutations made while resolving sibling nodes.
    let component_view = components.clone();
    for node in nodes.values() {
        let Some(component_id) = node.component_id.as_deref() else {
            continue;
        };
        match components.get_mut(component_id) {
            None => {
                let err = LayoutError::MissingComponent {
                    node: node.name.clone(),
                    component_id: component_id.to_owned(),
                };
                if policy == ErrorPolicy::Raise {
                    return Err(err);
                }
                errors.push(LoadError {
                    kind: "ShNode".to_owned(),
                    record: json!({"node": {"name": node.name}}),
                    source: anyhow!(err),
                });
            }
            Some(component) => {
                if let Err(err) = component.resolve(&node.name, nodes, &component_view) {
                    if policy == ErrorPolicy::Raise {
                        return Err(LayoutError::Decode {
                            kind: "ShNode".to_owned(),
                            source: anyhow!(err),
                        });
                    }
                    errors.push(LoadError {
                        kind: "ShNode".to_owned(),
                        record: json!({"node": {"name": node.name}}),
                        source: anyhow!(err),
                    });
                }
            }
        }
    }
    Ok(())
}
