//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "GNode identity blocks."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Identity block for one of the named top-level roles (AtomicTNode,
/// Scada, TerminalAsset).
///
/// Only id and alias are modeled; registry-side extras ride along in
/// `extra` so a write after a load does not shed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GNode {
    /// UUID-canonical GNode identity.
    pub g_node_id: String,
    /// Registry alias (dotted, globally unique).
    pub alias: String,
    /// Registry fields not otherwise modeled here.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gnode_preserves_extra_fields() {
        let record = json!({
            "GNodeId": "b6a32d9b-08cb-4ab4-a52e-d4f769ad0a62",
            "Alias": "hw1.isone.me.versant.keene.holly",
            "GNodeStatusValue": "Active",
            "PrimaryGNodeRoleAlias": "Scada"
        });
        let gnode: GNode = serde_json::from_value(record.clone()).unwrap();
        assert_eq!(gnode.alias, "hw1.isone.me.versant.keene.holly");
        assert_eq!(gnode.extra.len(), 2);
        let back = serde_json::to_value(&gnode).unwrap();
        assert_eq!(back, record);
    }
}
