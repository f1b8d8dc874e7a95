//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Spaceheat node records."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::enums::{ActorClass, Role};

/// TypeName tag for spaceheat node records.
pub const SPACEHEAT_NODE_GT: &str = "spaceheat.node.gt";

fn spaceheat_node_type_name() -> String {
    SPACEHEAT_NODE_GT.to_owned()
}

/// An organizing node in the actor/physical hierarchy.
///
/// `name` is immutable and locally unique; its dotted-path prefix structure
/// encodes the actor spawn hierarchy (`"s.analog-temp"` is spawned by
/// `"s"`). `handle` is the mutable finite-state-machine position and may
/// diverge from the name hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShNode {
    /// Immutable UUID-canonical node identity.
    pub sh_node_id: String,
    /// Immutable dotted-hierarchy alias.
    pub name: String,
    /// Which actor code governs this node.
    pub actor_class: ActorClass,
    /// Legacy-model role, when assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Mutable FSM-hierarchy position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Physical component this node represents, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// True when this node's power draw counts toward aggregate metering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_power_metering: Option<bool>,
    /// House0 strategy marker; present only on the node named `"s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// House0 store-tank count; present only on the node named `"s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_store_tanks: Option<u32>,
    /// House0 zone names; present only on the node named `"s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_list: Option<Vec<String>>,
    /// Wire-format tag.
    #[serde(default = "spaceheat_node_type_name")]
    pub type_name: String,
}

impl ShNode {
    /// True when the node's FSM handle diverges from its spawn-hierarchy
    /// name.
    pub fn handle_differs_from_name(&self) -> bool {
        self.handle.as_deref().is_some_and(|h| h != self.name)
    }
}
