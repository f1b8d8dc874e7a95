//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Component attribute class (device class) records."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::enums::{MakeModel, TelemetryName, Unit};

/// TypeName tag for the generic device-class record.
pub const CAC_GT: &str = "component.attribute.class.gt";
/// TypeName tag for electric meter device classes.
pub const ELECTRIC_METER_CAC_GT: &str = "electric.meter.cac.gt";
/// TypeName tag for relay device classes.
pub const RELAY_CAC_GT: &str = "relay.cac.gt";
/// TypeName tag for multipurpose sensor device classes.
pub const MULTIPURPOSE_SENSOR_CAC_GT: &str = "multipurpose.sensor.cac.gt";
/// TypeName tag for simple temperature sensor device classes.
pub const SIMPLE_TEMP_SENSOR_CAC_GT: &str = "simple.temp.sensor.cac.gt";

/// A component attribute class: one distinct device class (make/model
/// level), never a specific physical unit.
///
/// Created once per device class at load or generation time and immutable
/// afterward; re-registering the same id is a no-op upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cac {
    /// Immutable UUID-canonical identity of the device class.
    pub component_attribute_class_id: String,
    /// Make/model of the device class.
    #[serde(default)]
    pub make_model: MakeModel,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Floor on how often components of this class may be polled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_poll_period_ms: Option<u32>,
    /// Subtype-specific attributes, selected by the record's TypeName.
    #[serde(flatten)]
    pub attrs: CacAttrs,
}

/// Subtype-specific device-class attributes.
///
/// Closed set: catch-all records whose TypeName this build does not know
/// decode to [`CacAttrs::Unknown`] via the decoder table, keeping only the
/// fields the aggregate needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "TypeName")]
pub enum CacAttrs {
    /// Electric meter device class.
    #[serde(rename = "electric.meter.cac.gt", rename_all = "PascalCase")]
    ElectricMeter {
        /// Telemetry quantities meters of this class can report.
        #[serde(default)]
        telemetry_name_list: Vec<TelemetryName>,
        /// Physical interface (e.g. "ethernet").
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interface: Option<String>,
    },
    /// Relay device class.
    #[serde(rename = "relay.cac.gt", rename_all = "PascalCase")]
    Relay {
        /// Typical actuation latency.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        typical_response_time_ms: Option<u32>,
    },
    /// Multipurpose (multi-channel) sensor device class.
    #[serde(rename = "multipurpose.sensor.cac.gt", rename_all = "PascalCase")]
    MultipurposeSensor {
        /// Telemetry quantities sensors of this class can report.
        #[serde(default)]
        telemetry_name_list: Vec<TelemetryName>,
        /// Fixed-point exponent applied to reported values.
        #[serde(default)]
        exponent: i32,
        /// Unit of the temperature channels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temp_unit: Option<Unit>,
    },
    /// Single-channel temperature sensor device class.
    #[serde(rename = "simple.temp.sensor.cac.gt", rename_all = "PascalCase")]
    SimpleTempSensor {
        /// The one telemetry quantity sensors of this class report.
        telemetry_name: TelemetryName,
        /// Fixed-point exponent applied to reported values.
        #[serde(default)]
        exponent: i32,
        /// Unit of the reported temperature.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temp_unit: Option<Unit>,
    },
    /// Minimal generic device class (catch-all).
    #[serde(rename = "component.attribute.class.gt")]
    Unknown,
}

impl Cac {
    /// Telemetry quantities this device class can report, if its subtype
    /// declares any.
    pub fn telemetry_names(&self) -> Vec<TelemetryName> {
        match &self.attrs {
            CacAttrs::ElectricMeter {
                telemetry_name_list,
                ..
            }
            | CacAttrs::MultipurposeSensor {
                telemetry_name_list,
                ..
            } => telemetry_name_list.clone(),
            CacAttrs::SimpleTempSensor { telemetry_name, .. } => vec![*telemetry_name],
            CacAttrs::Relay { .. } => vec![TelemetryName::RelayState],
            CacAttrs::Unknown => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn electric_meter_cac_decodes_from_pascal_case_record() {
        let record = json!({
            "ComponentAttributeClassId": "739a6e32-bb9c-43bc-a28d-fb61be665522",
            "MakeModel": "EGAUGE__4030",
            "DisplayName": "eGauge 4030",
            "MinPollPeriodMs": 1000,
            "TelemetryNameList": ["PowerW", "CurrentRmsMicroAmps"],
            "Interface": "ethernet",
            "TypeName": "electric.meter.cac.gt"
        });
        let cac: Cac = serde_json::from_value(record).unwrap();
        assert_eq!(cac.make_model, MakeModel::Egauge4030);
        assert_eq!(
            cac.telemetry_names(),
            vec![TelemetryName::PowerW, TelemetryName::CurrentRmsMicroAmps]
        );
        match cac.attrs {
            CacAttrs::ElectricMeter { interface, .. } => {
                assert_eq!(interface.as_deref(), Some("ethernet"));
            }
            other => panic!("expected electric meter attrs, got {other:?}"),
        }
    }

    #[test]
    fn cac_serializes_with_type_name_tag() {
        let cac = Cac {
            component_attribute_class_id: "c6e736d8-8078-44f5-98bb-d72ca91dc773".into(),
            make_model: MakeModel::NcdPr814Spst,
            display_name: Some("NCD relay board".into()),
            min_poll_period_ms: None,
            attrs: CacAttrs::Relay {
                typical_response_time_ms: Some(200),
            },
        };
        let value = serde_json::to_value(&cac).unwrap();
        assert_eq!(value["TypeName"], "relay.cac.gt");
        assert_eq!(value["MakeModel"], "NCD__PR814SPST");
        assert_eq!(value["TypicalResponseTimeMs"], 200);
    }
}
