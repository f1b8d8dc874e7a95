//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data channel records."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::enums::TelemetryName;

/// TypeName tag for data channel records.
pub const DATA_CHANNEL_GT: &str = "data.channel.gt";

fn data_channel_type_name() -> String {
    DATA_CHANNEL_GT.to_owned()
}

/// A named telemetry stream: what quantity of what node is captured by
/// what sensor node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataChannel {
    /// Immutable UUID-canonical channel identity.
    pub id: String,
    /// Locally-unique channel name.
    pub name: String,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Node whose quantity is measured.
    pub about_node_name: String,
    /// Node doing the measuring.
    pub captured_by_node_name: String,
    /// Quantity measured.
    pub telemetry_name: TelemetryName,
    /// True when this channel participates in aggregate power metering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_power_metering: Option<bool>,
    /// Wire-format tag.
    #[serde(default = "data_channel_type_name")]
    pub type_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_round_trips() {
        let record = json!({
            "Id": "19acb6c8-4e9e-4e16-8a64-5e5d0cb1b2d2",
            "Name": "hp-odu-pwr",
            "AboutNodeName": "s.hp-odu",
            "CapturedByNodeName": "s.power-meter",
            "TelemetryName": "PowerW",
            "InPowerMetering": true,
            "TypeName": "data.channel.gt"
        });
        let channel: DataChannel = serde_json::from_value(record.clone()).unwrap();
        assert_eq!(channel.telemetry_name, TelemetryName::PowerW);
        let back = serde_json::to_value(&channel).unwrap();
        assert_eq!(back, record);
    }
}
