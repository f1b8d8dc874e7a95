//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "The layout write path with stable id reuse."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use gw_layout_schema::{
    Cac, CacAttrs, Component, ComponentConfig, DataChannel, MakeModel, ShNode,
};

use crate::id_map::LayoutIDMap;
use crate::{DbError, Result};

fn cac_list_name(cac: &Cac) -> &'static str {
    match cac.attrs {
        CacAttrs::ElectricMeter { .. } => "ElectricMeterCacs",
        CacAttrs::Relay { .. } => "RelayCacs",
        CacAttrs::MultipurposeSensor { .. } => "MultipurposeSensorCacs",
        CacAttrs::SimpleTempSensor { .. } => "SimpleTempSensorCacs",
        CacAttrs::Unknown => "OtherCacs",
    }
}

fn component_list_name(component: &Component) -> &'static str {
    match component.config {
        ComponentConfig::ElectricMeter { .. } => "ElectricMeterComponents",
        ComponentConfig::Relay { .. } => "RelayComponents",
        ComponentConfig::MultipurposeSensor { .. } => "MultipurposeSensorComponents",
        ComponentConfig::SimpleTempSensor { .. } => "SimpleTempSensorComponents",
        ComponentConfig::Unknown => "OtherComponents",
    }
}

/// Accumulates the records of a layout under construction and writes them
/// out as a layout document.
///
/// Every `make_*_id` consults [`LayoutIDMap`] before minting: re-generating
/// a layout a site already runs keeps the identity of everything whose
/// logical key is unchanged.
#[derive(Debug, Clone, Default)]
pub struct LayoutDb {
    /// Id assignments recovered from the document being rewritten.
    pub loaded: LayoutIDMap,
    /// Free-form top-level keys (GNode identity blocks and the like),
    /// merged into the document on write.
    pub misc: serde_json::Map<String, Value>,
    cacs: IndexMap<String, Cac>,
    components: IndexMap<String, Component>,
    nodes: IndexMap<String, ShNode>,
    channels: IndexMap<String, DataChannel>,
}

impl LayoutDb {
    /// An empty db minting fresh ids for everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty db reusing the id assignments of an existing document.
    pub fn with_loaded(loaded: LayoutIDMap) -> Self {
        Self {
            loaded,
            ..Self::default()
        }
    }

    /// The cac id for a device class: reused from the loaded document when
    /// its logical key matches, else the static registry id for known
    /// make/models, else fresh.
    ///
    /// Unknown make/models are keyed by display name; without one (or
    /// without a loaded match) the class gets a fresh id.
    pub fn make_cac_id(&self, make_model: MakeModel, display_name: Option<&str>) -> String {
        if make_model.is_unknown() {
            if let Some(id) = display_name
                .and_then(|name| self.loaded.unknown_cac_id_by_display_name.get(name))
            {
                return id.clone();
            }
            return Uuid::new_v4().to_string();
        }
        if let Some(id) = self.loaded.cac_id_by_make_model.get(&make_model) {
            return id.clone();
        }
        match make_model.canonical_cac_id() {
            Some(id) => id.to_owned(),
            None => Uuid::new_v4().to_string(),
        }
    }

    /// The component id for a display name: reused when loaded, else fresh.
    pub fn make_component_id(&self, display_name: &str) -> String {
        self.loaded
            .component_id_by_display_name
            .get(display_name)
            .cloned()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// The node id for a node name: reused when loaded, else fresh.
    pub fn make_node_id(&self, name: &str) -> String {
        self.loaded
            .node_id_by_name
            .get(name)
            .cloned()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// The channel id for a channel name: reused when loaded, else fresh.
    pub fn make_channel_id(&self, name: &str) -> String {
        self.loaded
            .channel_id_by_name
            .get(name)
            .cloned()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Register a device class. A duplicate id is a no-op, diagnosed and
    /// answered `false`; the first registration wins.
    pub fn add_cac(&mut self, cac: Cac) -> bool {
        let id = cac.component_attribute_class_id.clone();
        if self.cacs.contains_key(&id) {
            warn!(cac_id = %id, "cac already registered, keeping the first");
            return false;
        }
        self.cacs.insert(id, cac);
        true
    }

    /// Register a component. A duplicate id is a no-op, answered `false`.
    pub fn add_component(&mut self, component: Component) -> bool {
        let id = component.component_id.clone();
        if self.components.contains_key(&id) {
            warn!(component_id = %id, "component already registered, keeping the first");
            return false;
        }
        self.components.insert(id, component);
        true
    }

    /// Register a node. A duplicate name is a no-op, answered `false`.
    pub fn add_node(&mut self, node: ShNode) -> bool {
        let name = node.name.clone();
        if self.nodes.contains_key(&name) {
            warn!(node = %name, "node already registered, keeping the first");
            return false;
        }
        self.nodes.insert(name, node);
        true
    }

    /// Register a data channel. A duplicate name is a no-op, answered
    /// `false`.
    pub fn add_channel(&mut self, channel: DataChannel) -> bool {
        let name = channel.name.clone();
        if self.channels.contains_key(&name) {
            warn!(channel = %name, "channel already registered, keeping the first");
            return false;
        }
        self.channels.insert(name, channel);
        true
    }

    /// Registered device classes by id.
    pub fn cacs(&self) -> &IndexMap<String, Cac> {
        &self.cacs
    }

    /// Registered components by id.
    pub fn components(&self) -> &IndexMap<String, Component> {
        &self.components
    }

    /// Registered nodes by name.
    pub fn nodes(&self) -> &IndexMap<String, ShNode> {
        &self.nodes
    }

    /// Registered channels by name.
    pub fn channels(&self) -> &IndexMap<String, DataChannel> {
        &self.channels
    }

    /// Assemble the layout document: records grouped into their
    /// TypeName-matched lists, `misc` keys merged in, top-level keys
    /// sorted. Structured lists shadow colliding `misc` keys.
    pub fn to_document(&self) -> Result<Value> {
        let mut doc: BTreeMap<String, Value> = self
            .misc
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let mut cac_lists: BTreeMap<&'static str, Vec<Value>> = BTreeMap::new();
        for cac in self.cacs.values() {
            cac_lists
                .entry(cac_list_name(cac))
                .or_default()
                .push(serde_json::to_value(cac)?);
        }
        for (list_name, records) in cac_lists {
            doc.insert(list_name.to_owned(), Value::Array(records));
        }

        let mut component_lists: BTreeMap<&'static str, Vec<Value>> = BTreeMap::new();
        for component in self.components.values() {
            component_lists
                .entry(component_list_name(component))
                .or_default()
                .push(serde_json::to_value(component)?);
        }
        for (list_name, records) in component_lists {
            doc.insert(list_name.to_owned(), Value::Array(records));
        }

        let nodes = self
            .nodes
            .values()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        doc.insert("ShNodes".to_owned(), Value::Array(nodes));

        let channels = self
            .channels
            .values()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        doc.insert("DataChannels".to_owned(), Value::Array(channels));

        Ok(Value::Object(doc.into_iter().collect()))
    }

    /// Write the assembled document as pretty-printed JSON.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let document = self.to_document()?;
        let mut rendered = serde_json::to_string_pretty(&document)?;
        rendered.push('\n');
        std::fs::write(path, rendered).map_err(|source| DbError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
