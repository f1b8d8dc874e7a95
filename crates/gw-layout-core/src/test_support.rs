//! ---
//! ems_section: "08-testing-validation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Fixture builders for layout tests."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Per-test registry builders.
//!
//! There are no process-wide default registries to flush between tests:
//! each test builds its own maps through [`TestLayout`] and hands them to
//! the aggregate explicitly.

use indexmap::IndexMap;
use uuid::Uuid;

use gw_layout_schema::{
    ActorClass, Cac, CacAttrs, ChannelConfig, Component, ComponentConfig, DataChannel, MakeModel,
    Role, ShNode, TelemetryName,
};

use crate::layout::{GNodes, HardwareLayout};

/// Builder assembling fresh, explicitly-owned registries for one test.
#[derive(Debug, Default)]
pub struct TestLayout {
    cacs: IndexMap<String, Cac>,
    components: IndexMap<String, Component>,
    nodes: IndexMap<String, ShNode>,
    channels: IndexMap<String, DataChannel>,
    gnodes: GNodes,
}

impl TestLayout {
    /// Fresh, empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device class.
    pub fn with_cac(mut self, cac: Cac) -> Self {
        self.cacs.insert(cac.component_attribute_class_id.clone(), cac);
        self
    }

    /// Register a component.
    pub fn with_component(mut self, component: Component) -> Self {
        self.components
            .insert(component.component_id.clone(), component);
        self
    }

    /// Register a node.
    pub fn with_node(mut self, node: ShNode) -> Self {
        self.nodes.insert(node.name.clone(), node);
        self
    }

    /// Register a data channel.
    pub fn with_channel(mut self, channel: DataChannel) -> Self {
        self.channels.insert(channel.name.clone(), channel);
        self
    }

    /// Construct the aggregate from the assembled registries.
    pub fn layout(self) -> HardwareLayout {
        HardwareLayout::new(
            self.cacs,
            self.components,
            self.nodes,
            self.channels,
            self.gnodes,
        )
    }
}

/// A minimal unknown-make device class with the given id.
pub fn unknown_cac(cac_id: &str, display_name: &str) -> Cac {
    Cac {
        component_attribute_class_id: cac_id.to_owned(),
        make_model: MakeModel::UnknownMakeUnknownModel,
        display_name: Some(display_name.to_owned()),
        min_poll_period_ms: None,
        attrs: CacAttrs::Unknown,
    }
}

/// A minimal generic component instantiating the given device class.
pub fn unknown_component(component_id: &str, cac_id: &str, display_name: &str) -> Component {
    Component {
        component_id: component_id.to_owned(),
        component_attribute_class_id: cac_id.to_owned(),
        display_name: Some(display_name.to_owned()),
        hw_uid: None,
        config: ComponentConfig::Unknown,
    }
}

/// A node with the given name, role, and optional component reference.
pub fn node(name: &str, role: Role, component_id: Option<&str>) -> ShNode {
    ShNode {
        sh_node_id: Uuid::new_v4().to_string(),
        name: name.to_owned(),
        actor_class: actor_class_for(role),
        role: Some(role),
        handle: None,
        component_id: component_id.map(str::to_owned),
        display_name: None,
        in_power_metering: None,
        strategy: None,
        total_store_tanks: None,
        zone_list: None,
        type_name: gw_layout_schema::node::SPACEHEAT_NODE_GT.to_owned(),
    }
}

fn actor_class_for(role: Role) -> ActorClass {
    match role {
        Role::Scada => ActorClass::Scada,
        Role::HomeAlone => ActorClass::HomeAlone,
        Role::PowerMeter => ActorClass::PowerMeter,
        Role::BooleanActuator => ActorClass::BooleanActuator,
        Role::SimpleSensor => ActorClass::SimpleSensor,
        Role::MultipurposeSensor => ActorClass::MultipurposeSensor,
        _ => ActorClass::NoActor,
    }
}

/// An electric meter component with one PowerW reporting channel per
/// entry of `about_nodes`.
pub fn meter_component(component_id: &str, cac_id: &str, about_nodes: &[&str]) -> Component {
    Component {
        component_id: component_id.to_owned(),
        component_attribute_class_id: cac_id.to_owned(),
        display_name: Some("test meter".to_owned()),
        hw_uid: None,
        config: ComponentConfig::ElectricMeter {
            config_list: about_nodes
                .iter()
                .map(|about| ChannelConfig {
                    channel_name: format!("{}-pwr", about.rsplit('.').next().unwrap_or(about)),
                    about_node_name: (*about).to_owned(),
                    telemetry_name: TelemetryName::PowerW,
                    poll_period_ms: Some(1000),
                    exponent: 0,
                    async_capture: false,
                })
                .collect(),
            egauge_io_list: Vec::new(),
            modbus_host: None,
            modbus_port: None,
        },
    }
}
