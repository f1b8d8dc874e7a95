//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "The cross-referenced hardware layout aggregate."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde_json::Value;
use tracing::debug;

use gw_layout_schema::{
    Cac, Component, DataChannel, GNode, Role, ShNode, TelemetryName,
};

use crate::load::{
    load_cacs, load_channels, load_components, load_nodes, resolve_links, ErrorPolicy,
    LayoutDocument, LoadError, LoadOptions,
};
use crate::{LayoutError, Result};

/// Document key for the AtomicTNode identity block.
pub const ATN_GNODE_KEY: &str = "MyAtomicTNodeGNode";
/// Document key for the Scada identity block.
pub const SCADA_GNODE_KEY: &str = "MyScadaGNode";
/// Document key for the TerminalAsset identity block.
pub const TERMINAL_ASSET_GNODE_KEY: &str = "MyTerminalAssetGNode";

/// The dotted-name prefix of an alias, or empty for a top-level alias.
///
/// `parent_alias("s.power-meter.amp-1")` is `"s.power-meter"`;
/// `parent_alias("s")` is `""`.
pub fn parent_alias(alias: &str) -> String {
    match alias.rfind('.') {
        Some(idx) => alias[..idx].to_owned(),
        None => String::new(),
    }
}

/// The three GNode identity blocks, extracted into typed fields at
/// construction so the raw document does not have to be retained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GNodes {
    /// The remote coordinator's identity.
    pub atn: Option<GNode>,
    /// The site controller's identity.
    pub scada: Option<GNode>,
    /// The metered asset's identity.
    pub terminal_asset: Option<GNode>,
}

impl GNodes {
    /// Extract the identity blocks present in a document. A malformed
    /// block is reported through the per-record error policy.
    pub fn from_document(
        doc: &LayoutDocument,
        policy: ErrorPolicy,
        errors: &mut Vec<LoadError>,
    ) -> Result<Self> {
        let mut gnodes = Self::default();
        for (key, slot) in [
            (ATN_GNODE_KEY, &mut gnodes.atn),
            (SCADA_GNODE_KEY, &mut gnodes.scada),
            (TERMINAL_ASSET_GNODE_KEY, &mut gnodes.terminal_asset),
        ] {
            if let Some(record) = doc.get(key) {
                match serde_json::from_value::<GNode>(record.clone()) {
                    Ok(gnode) => *slot = Some(gnode),
                    Err(err) => match policy {
                        ErrorPolicy::Raise => {
                            return Err(LayoutError::Decode {
                                kind: key.to_owned(),
                                source: anyhow::anyhow!(err),
                            })
                        }
                        ErrorPolicy::Collect => errors.push(LoadError {
                            kind: key.to_owned(),
                            record: record.clone(),
                            source: anyhow::anyhow!(err),
                        }),
                    },
                }
            }
        }
        Ok(gnodes)
    }
}

/// A derived (AboutNode, SensorNode, TelemetryName) triple: what physical
/// quantity of what thing is measured by what sensor. Constructed on
/// demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryTuple {
    /// Node whose quantity is measured.
    pub about_node: ShNode,
    /// Node doing the measuring.
    pub sensor_node: ShNode,
    /// Quantity measured.
    pub telemetry_name: TelemetryName,
}

/// Memoized derived views. Cells are computed on first access and reset,
/// as a fixed field list, by [`HardwareLayout::clear_property_cache`].
#[derive(Debug, Clone, Default)]
struct DerivedCache {
    power_meter_node: OnceCell<String>,
    home_alone_node: OnceCell<String>,
    resistive_heaters: OnceCell<Vec<String>>,
    boolean_actuators: OnceCell<Vec<String>>,
    simple_sensors: OnceCell<Vec<String>>,
    multipurpose_sensors: OnceCell<Vec<String>>,
    agg_power_metering: OnceCell<Vec<String>>,
    power_meter_tuples: OnceCell<Vec<TelemetryTuple>>,
    multipurpose_tuples: OnceCell<Vec<TelemetryTuple>>,
    simple_sensor_tuples: OnceCell<Vec<TelemetryTuple>>,
}

/// The hardware layout aggregate: the loaded registries plus derived,
/// cached relationship queries.
///
/// Reads after construction do not mutate shared state beyond the
/// write-once property cells, so a constructed layout can be shared freely
/// as read-only. Generation tooling that mutates the maps directly must
/// call [`HardwareLayout::clear_property_cache`] before re-querying.
#[derive(Debug, Clone)]
pub struct HardwareLayout {
    /// Device classes by cac id.
    pub cacs: IndexMap<String, Cac>,
    /// Physical components by component id.
    pub components: IndexMap<String, Component>,
    /// Spaceheat nodes by name.
    pub nodes: IndexMap<String, ShNode>,
    /// Data channels by name.
    pub channels: IndexMap<String, DataChannel>,
    /// The three typed identity blocks.
    pub gnodes: GNodes,
    cache: DerivedCache,
}

/// A constructed layout together with the per-record errors accumulated
/// under the collecting policy.
#[derive(Debug)]
pub struct Loaded<T = HardwareLayout> {
    /// The constructed aggregate.
    pub layout: T,
    /// Per-record failures; empty under the raising policy.
    pub errors: Vec<LoadError>,
}

impl HardwareLayout {
    /// Construct the aggregate from explicitly supplied registries.
    ///
    /// The maps are owned by the instance; there are no process-wide
    /// default registries.
    pub fn new(
        cacs: IndexMap<String, Cac>,
        components: IndexMap<String, Component>,
        nodes: IndexMap<String, ShNode>,
        channels: IndexMap<String, DataChannel>,
        gnodes: GNodes,
    ) -> Self {
        Self {
            cacs,
            components,
            nodes,
            channels,
            gnodes,
            cache: DerivedCache::default(),
        }
    }

    /// Read, parse, and load a layout document from disk.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Loaded> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading hardware layout");
        let raw = fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        let doc = match value {
            Value::Object(map) => map,
            _ => return Err(LayoutError::NotAnObject),
        };
        Self::load_dict(&doc, options)
    }

    /// Load a layout from an in-memory document: registry loaders, then
    /// link resolution, then aggregate construction.
    pub fn load_dict(doc: &LayoutDocument, options: &LoadOptions) -> Result<Loaded> {
        let mut errors = Vec::new();
        let policy = options.policy;
        let cacs = load_cacs(doc, &options.cac_decoder, policy, &mut errors)?;
        let mut components = load_components(doc, &options.component_decoder, policy, &mut errors)?;
        let nodes = load_nodes(
            doc,
            policy,
            &mut errors,
            options.included_node_names.as_ref(),
        )?;
        let channels = load_channels(doc, policy, &mut errors)?;
        resolve_links(&nodes, &mut components, policy, &mut errors)?;
        let gnodes = GNodes::from_document(doc, policy, &mut errors)?;
        Ok(Loaded {
            layout: Self::new(cacs, components, nodes, channels, gnodes),
            errors,
        })
    }

    /// Point lookup of a node by name.
    pub fn node(&self, name: &str) -> Option<&ShNode> {
        self.nodes.get(name)
    }

    /// Point lookup of a node by name, answering `default` when the name
    /// is not loaded.
    pub fn node_or<'a>(&'a self, name: &str, default: &'a ShNode) -> &'a ShNode {
        self.nodes.get(name).unwrap_or(default)
    }

    /// The component a node represents, or `None` at any broken link.
    pub fn component(&self, node_name: &str) -> Option<&Component> {
        self.node(node_name)
            .and_then(|node| node.component_id.as_deref())
            .and_then(|id| self.components.get(id))
    }

    /// The device class behind a node's component, or `None` at any broken
    /// link.
    pub fn cac(&self, node_name: &str) -> Option<&Cac> {
        self.component(node_name)
            .and_then(|component| self.cacs.get(&component.component_attribute_class_id))
    }

    /// Point lookup of a data channel by name.
    pub fn channel(&self, name: &str) -> Option<&DataChannel> {
        self.channels.get(name)
    }

    /// The loaded parent of a dotted alias.
    ///
    /// `Ok(None)` for a top-level alias; [`LayoutError::MissingParent`]
    /// when the alias has a parent prefix that is not a loaded node.
    pub fn parent_node(&self, alias: &str) -> Result<Option<&ShNode>> {
        let parent = parent_alias(alias);
        if parent.is_empty() {
            return Ok(None);
        }
        self.nodes
            .get(&parent)
            .map(Some)
            .ok_or_else(|| LayoutError::MissingParent {
                alias: alias.to_owned(),
                parent,
            })
    }

    /// All loaded nodes whose name has `alias` as a literal string prefix.
    ///
    /// This is not a dot-boundary-aware test: `"ab"` matches `"abc.d"`.
    /// Callers relying on spawn hierarchy must account for this.
    pub fn descendants(&self, alias: &str) -> Vec<&ShNode> {
        self.nodes
            .values()
            .filter(|node| node.name.starts_with(alias))
            .collect()
    }

    fn names_with_role(&self, role: Role) -> Vec<String> {
        self.nodes
            .values()
            .filter(|node| node.role == Some(role))
            .map(|node| node.name.clone())
            .collect()
    }

    fn required_role_node(&self, cell: &OnceCell<String>, role: Role) -> Result<&ShNode> {
        let name = cell.get_or_try_init(|| {
            self.nodes
                .values()
                .find(|node| node.role == Some(role))
                .map(|node| node.name.clone())
                .ok_or(LayoutError::MissingRequiredRole { role })
        })?;
        self.nodes
            .get(name)
            .ok_or(LayoutError::MissingRequiredRole { role })
    }

    fn nodes_for<'a>(&'a self, names: &[String]) -> Vec<&'a ShNode> {
        names.iter().filter_map(|name| self.nodes.get(name)).collect()
    }

    /// The single aggregate power meter node.
    ///
    /// Relies on schema-level uniqueness: with duplicates, the first in
    /// map-iteration order wins. Errors when no node carries the role.
    pub fn power_meter_node(&self) -> Result<&ShNode> {
        self.required_role_node(&self.cache.power_meter_node, Role::PowerMeter)
    }

    /// The single home-alone supervisor node. Errors when absent.
    pub fn home_alone_node(&self) -> Result<&ShNode> {
        self.required_role_node(&self.cache.home_alone_node, Role::HomeAlone)
    }

    /// All resistive heating element nodes.
    pub fn all_resistive_heaters(&self) -> Vec<&ShNode> {
        let names = self
            .cache
            .resistive_heaters
            .get_or_init(|| self.names_with_role(Role::BoostElement));
        self.nodes_for(names)
    }

    /// All on/off actuator nodes.
    pub fn all_boolean_actuators(&self) -> Vec<&ShNode> {
        let names = self
            .cache
            .boolean_actuators
            .get_or_init(|| self.names_with_role(Role::BooleanActuator));
        self.nodes_for(names)
    }

    /// All single-channel sensor nodes.
    pub fn all_simple_sensors(&self) -> Vec<&ShNode> {
        let names = self
            .cache
            .simple_sensors
            .get_or_init(|| self.names_with_role(Role::SimpleSensor));
        self.nodes_for(names)
    }

    /// All multi-channel sensor nodes.
    pub fn all_multipurpose_sensors(&self) -> Vec<&ShNode> {
        let names = self
            .cache
            .multipurpose_sensors
            .get_or_init(|| self.names_with_role(Role::MultipurposeSensor));
        self.nodes_for(names)
    }

    /// All nodes whose power draw counts toward aggregate metering.
    pub fn all_nodes_in_agg_power_metering(&self) -> Vec<&ShNode> {
        let names = self.cache.agg_power_metering.get_or_init(|| {
            self.nodes
                .values()
                .filter(|node| node.in_power_metering == Some(true))
                .map(|node| node.name.clone())
                .collect()
        });
        self.nodes_for(names)
    }

    fn tuples_for_sensor(&self, sensor: &ShNode) -> Vec<TelemetryTuple> {
        let Some(component_id) = sensor.component_id.as_deref() else {
            return Vec::new();
        };
        let Some(component) = self.components.get(component_id) else {
            return Vec::new();
        };
        component
            .config
            .channel_configs()
            .iter()
            .filter_map(|cfg| {
                self.nodes.get(&cfg.about_node_name).map(|about| TelemetryTuple {
                    about_node: about.clone(),
                    sensor_node: sensor.clone(),
                    telemetry_name: cfg.telemetry_name,
                })
            })
            .collect()
    }

    /// Telemetry tuples reported by the aggregate power meter.
    ///
    /// Errors when the layout has no power meter node.
    pub fn all_power_meter_telemetry_tuples(&self) -> Result<Vec<TelemetryTuple>> {
        let sensor = self.power_meter_node()?;
        Ok(self
            .cache
            .power_meter_tuples
            .get_or_init(|| self.tuples_for_sensor(sensor))
            .clone())
    }

    /// Telemetry tuples reported by multipurpose sensors.
    pub fn all_multipurpose_telemetry_tuples(&self) -> Vec<TelemetryTuple> {
        self.cache
            .multipurpose_tuples
            .get_or_init(|| {
                self.all_multipurpose_sensors()
                    .into_iter()
                    .flat_map(|sensor| self.tuples_for_sensor(sensor))
                    .collect()
            })
            .clone()
    }

    /// Telemetry tuples reported by simple sensors: each simple sensor
    /// measures its own node, with the quantities its device class
    /// declares.
    pub fn all_simple_sensor_telemetry_tuples(&self) -> Vec<TelemetryTuple> {
        self.cache
            .simple_sensor_tuples
            .get_or_init(|| {
                self.all_simple_sensors()
                    .into_iter()
                    .flat_map(|sensor| {
                        self.cac(&sensor.name)
                            .map(Cac::telemetry_names)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|telemetry_name| TelemetryTuple {
                                about_node: sensor.clone(),
                                sensor_node: sensor.clone(),
                                telemetry_name,
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect()
            })
            .clone()
    }

    /// Every telemetry tuple in the layout: power meter tuples, then
    /// multipurpose, then simple sensor tuples.
    pub fn all_telemetry_tuples(&self) -> Result<Vec<TelemetryTuple>> {
        let mut tuples = self.all_power_meter_telemetry_tuples()?;
        tuples.extend(self.all_multipurpose_telemetry_tuples());
        tuples.extend(self.all_simple_sensor_telemetry_tuples());
        Ok(tuples)
    }

    /// Reset every memoized derived view so the next access re-derives
    /// from current map state.
    pub fn clear_property_cache(&mut self) {
        let cache = &mut self.cache;
        cache.power_meter_node.take();
        cache.home_alone_node.take();
        cache.resistive_heaters.take();
        cache.boolean_actuators.take();
        cache.simple_sensors.take();
        cache.multipurpose_sensors.take();
        cache.agg_power_metering.take();
        cache.power_meter_tuples.take();
        cache.multipurpose_tuples.take();
        cache.simple_sensor_tuples.take();
    }

    /// Alias of the AtomicTNode identity block, when present.
    pub fn atn_g_node_alias(&self) -> Option<&str> {
        self.gnodes.atn.as_ref().map(|g| g.alias.as_str())
    }

    /// Id of the AtomicTNode identity block, when present.
    pub fn atn_g_node_id(&self) -> Option<&str> {
        self.gnodes.atn.as_ref().map(|g| g.g_node_id.as_str())
    }

    /// Alias of the Scada identity block, when present.
    pub fn scada_g_node_alias(&self) -> Option<&str> {
        self.gnodes.scada.as_ref().map(|g| g.alias.as_str())
    }

    /// Id of the Scada identity block, when present.
    pub fn scada_g_node_id(&self) -> Option<&str> {
        self.gnodes.scada.as_ref().map(|g| g.g_node_id.as_str())
    }

    /// Alias of the TerminalAsset identity block, when present.
    pub fn terminal_asset_g_node_alias(&self) -> Option<&str> {
        self.gnodes.terminal_asset.as_ref().map(|g| g.alias.as_str())
    }

    /// Id of the TerminalAsset identity block, when present.
    pub fn terminal_asset_g_node_id(&self) -> Option<&str> {
        self.gnodes
            .terminal_asset
            .as_ref()
            .map(|g| g.g_node_id.as_str())
    }
}
