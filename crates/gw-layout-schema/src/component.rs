//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Physical component records and the resolve capability."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::enums::TelemetryName;
use crate::node::ShNode;
use crate::{SchemaError, SchemaResult};

/// TypeName tag for the generic component record.
pub const COMPONENT_GT: &str = "component.gt";
/// TypeName tag for electric meter components.
pub const ELECTRIC_METER_COMPONENT_GT: &str = "electric.meter.component.gt";
/// TypeName tag for relay components.
pub const RELAY_COMPONENT_GT: &str = "relay.component.gt";
/// TypeName tag for multipurpose sensor components.
pub const MULTIPURPOSE_SENSOR_COMPONENT_GT: &str = "multipurpose.sensor.component.gt";
/// TypeName tag for simple temperature sensor components.
pub const SIMPLE_TEMP_SENSOR_COMPONENT_GT: &str = "simple.temp.sensor.component.gt";

/// Per-channel polling/capture configuration carried by sensing components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelConfig {
    /// Locally-unique channel name.
    pub channel_name: String,
    /// Node whose physical quantity this channel measures.
    pub about_node_name: String,
    /// Quantity measured.
    pub telemetry_name: TelemetryName,
    /// Polling cadence, when polled rather than captured asynchronously.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_period_ms: Option<u32>,
    /// Fixed-point exponent applied to reported values.
    #[serde(default)]
    pub exponent: i32,
    /// True when the channel reports on change instead of on a poll cycle.
    #[serde(default)]
    pub async_capture: bool,
}

/// One eGauge register binding, matched to a [`ChannelConfig`] by channel
/// name during link resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EgaugeIo {
    /// Channel this register feeds.
    pub channel_name: String,
    /// Register description on the meter side.
    pub input_config: EgaugeRegisterConfig,
}

/// Modbus register description for one eGauge input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EgaugeRegisterConfig {
    /// Modbus register address.
    pub address: u32,
    /// Register name on the meter.
    pub name: String,
    /// Free-form register description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Register value encoding (e.g. "f32").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_type: Option<String>,
    /// Scaling denominator applied to the raw register value.
    #[serde(default = "default_denominator")]
    pub denominator: i32,
    /// Unit reported by the register.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

fn default_denominator() -> i32 {
    1
}

/// A physical instance of a device class.
///
/// `component_attribute_class_id` is a reference, never ownership: the cac
/// is looked up by id by whoever holds both registries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Component {
    /// Immutable UUID-canonical identity of the physical unit.
    pub component_id: String,
    /// Device class this unit instantiates.
    pub component_attribute_class_id: String,
    /// Optional mutable human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Hardware serial identifier, immutable once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_uid: Option<String>,
    /// Subtype-specific config, selected by the record's TypeName.
    #[serde(flatten)]
    pub config: ComponentConfig,
}

/// Subtype-specific component configuration.
///
/// Every variant answers the resolve capability explicitly: subtypes with
/// cross-list config implement a real body, all others decline with a
/// no-op. There is no runtime "does this object have this method" probing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "TypeName")]
pub enum ComponentConfig {
    /// eGauge-style electric meter with a register list that must be
    /// matched against the channel reporting config.
    #[serde(rename = "electric.meter.component.gt", rename_all = "PascalCase")]
    ElectricMeter {
        /// Per-channel reporting configuration.
        #[serde(default)]
        config_list: Vec<ChannelConfig>,
        /// Register bindings, one per reported channel.
        #[serde(default)]
        egauge_io_list: Vec<EgaugeIo>,
        /// Meter hostname on the local network.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modbus_host: Option<String>,
        /// Meter modbus port.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modbus_port: Option<u16>,
    },
    /// Relay board channel assignment.
    #[serde(rename = "relay.component.gt", rename_all = "PascalCase")]
    Relay {
        /// GPIO line driving the relay.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gpio: Option<u32>,
        /// True when the relay contact is normally open.
        #[serde(default)]
        normally_open: bool,
    },
    /// Multi-channel sensor with per-channel reporting config.
    #[serde(
        rename = "multipurpose.sensor.component.gt",
        rename_all = "PascalCase"
    )]
    MultipurposeSensor {
        /// Hardware channel indices in use.
        #[serde(default)]
        channel_list: Vec<u32>,
        /// Per-channel reporting configuration.
        #[serde(default)]
        config_list: Vec<ChannelConfig>,
    },
    /// Single-channel temperature sensor.
    #[serde(rename = "simple.temp.sensor.component.gt", rename_all = "PascalCase")]
    SimpleTempSensor {
        /// Hardware channel index in use.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel: Option<u32>,
    },
    /// Minimal generic component (catch-all).
    #[serde(rename = "component.gt")]
    Unknown,
}

impl Component {
    /// Complete cross-references that cannot be expressed as plain ids.
    ///
    /// Invoked once per owning node by the link resolver, with the full
    /// node and component maps. After a normal return the component's
    /// internal config is fully consistent. Variants without cross-list
    /// config return immediately.
    pub fn resolve(
        &mut self,
        node_name: &str,
        nodes: &IndexMap<String, ShNode>,
        components: &IndexMap<String, Component>,
    ) -> SchemaResult<()> {
        self.config.resolve(node_name, nodes, components)
    }
}

fn channel_mismatch(
    node_name: &str,
    egauge_io_list: &[EgaugeIo],
    config_list: &[ChannelConfig],
) -> SchemaError {
    SchemaError::ChannelMismatch {
        node: node_name.to_owned(),
        io_channels: egauge_io_list
            .iter()
            .map(|io| io.channel_name.clone())
            .collect(),
        config_channels: config_list
            .iter()
            .map(|cfg| cfg.channel_name.clone())
            .collect(),
    }
}

impl ComponentConfig {
    /// Subtype-specific resolution body; see [`Component::resolve`].
    pub fn resolve(
        &mut self,
        node_name: &str,
        _nodes: &IndexMap<String, ShNode>,
        _components: &IndexMap<String, Component>,
    ) -> SchemaResult<()> {
        match self {
            ComponentConfig::ElectricMeter {
                config_list,
                egauge_io_list,
                ..
            } => {
                // A meter with no register bindings has nothing to match.
                if egauge_io_list.is_empty() {
                    return Ok(());
                }
                let io_channels: BTreeSet<&str> = egauge_io_list
                    .iter()
                    .map(|io| io.channel_name.as_str())
                    .collect();
                let config_channels: BTreeSet<&str> = config_list
                    .iter()
                    .map(|cfg| cfg.channel_name.as_str())
                    .collect();
                if io_channels != config_channels || egauge_io_list.len() != config_list.len() {
                    return Err(channel_mismatch(node_name, egauge_io_list, config_list));
                }
                // Pair register bindings with their reporting config
                // positionally: reorder the io list into config-list order.
                let mut remaining = std::mem::take(egauge_io_list);
                for cfg in config_list.iter() {
                    match remaining
                        .iter()
                        .position(|io| io.channel_name == cfg.channel_name)
                    {
                        Some(pos) => egauge_io_list.push(remaining.remove(pos)),
                        // Equal sets but unequal multiplicities.
                        None => {
                            egauge_io_list.append(&mut remaining);
                            return Err(channel_mismatch(node_name, egauge_io_list, config_list));
                        }
                    }
                }
                Ok(())
            }
            ComponentConfig::Relay { .. }
            | ComponentConfig::MultipurposeSensor { .. }
            | ComponentConfig::SimpleTempSensor { .. }
            | ComponentConfig::Unknown => Ok(()),
        }
    }

    /// Per-channel reporting config declared by this subtype, if any.
    pub fn channel_configs(&self) -> &[ChannelConfig] {
        match self {
            ComponentConfig::ElectricMeter { config_list, .. }
            | ComponentConfig::MultipurposeSensor { config_list, .. } => config_list,
            _ => &[],
        }
    }
}
