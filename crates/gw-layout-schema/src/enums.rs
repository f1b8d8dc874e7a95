//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware-description enums and the canonical cac-id table."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Device class at make/model granularity ("what you'd order to get the
/// same part").
///
/// Unrecognized registry spellings decode to
/// [`MakeModel::UnknownMakeUnknownModel`] rather than failing the record,
/// matching the tolerant treatment of catch-all hardware.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(from = "String")]
pub enum MakeModel {
    /// eGauge 4030 multi-register power meter.
    #[serde(rename = "EGAUGE__4030")]
    #[strum(serialize = "EGAUGE__4030")]
    Egauge4030,
    /// NCD PR8-14 single-pole relay board.
    #[serde(rename = "NCD__PR814SPST")]
    #[strum(serialize = "NCD__PR814SPST")]
    NcdPr814Spst,
    /// Adafruit 642 one-wire temperature probe.
    #[serde(rename = "ADAFRUIT__642")]
    #[strum(serialize = "ADAFRUIT__642")]
    Adafruit642,
    /// GridWorks TSnap1 multipurpose analog sensor.
    #[serde(rename = "GRIDWORKS__TSNAP1")]
    #[strum(serialize = "GRIDWORKS__TSNAP1")]
    GridworksTsnap1,
    /// GridWorks high-precision water temperature sensor.
    #[serde(rename = "GRIDWORKS__WATERTEMPHIGHPRECISION")]
    #[strum(serialize = "GRIDWORKS__WATERTEMPHIGHPRECISION")]
    GridworksWaterTempHighPrecision,
    /// Catch-all for hardware this build has no specific knowledge of.
    #[serde(rename = "UNKNOWNMAKE__UNKNOWNMODEL")]
    #[strum(serialize = "UNKNOWNMAKE__UNKNOWNMODEL")]
    UnknownMakeUnknownModel,
}

impl Default for MakeModel {
    fn default() -> Self {
        MakeModel::UnknownMakeUnknownModel
    }
}

impl From<String> for MakeModel {
    fn from(value: String) -> Self {
        value
            .parse()
            .unwrap_or(MakeModel::UnknownMakeUnknownModel)
    }
}

impl MakeModel {
    /// True for the catch-all make/model, whose identity is carried by
    /// display name rather than device class.
    pub fn is_unknown(self) -> bool {
        matches!(self, MakeModel::UnknownMakeUnknownModel)
    }

    /// Canonical cac id assigned to this make/model by the registry.
    ///
    /// The unknown make/model has no canonical id: distinct unknown devices
    /// must keep distinct, display-name-keyed identities.
    pub fn canonical_cac_id(self) -> Option<&'static str> {
        match self {
            MakeModel::Egauge4030 => Some("739a6e32-bb9c-43bc-a28d-fb61be665522"),
            MakeModel::NcdPr814Spst => Some("c6e736d8-8078-44f5-98bb-d72ca91dc773"),
            MakeModel::Adafruit642 => Some("43564cd2-0e78-41a2-8b67-ad80c02161e8"),
            MakeModel::GridworksTsnap1 => Some("d0178dc3-74f1-4faf-84da-456959d434ca"),
            MakeModel::GridworksWaterTempHighPrecision => {
                Some("f8b497e8-add5-475b-b10f-7f4ed6d338c5")
            }
            MakeModel::UnknownMakeUnknownModel => None,
        }
    }

    /// Reverse lookup into the canonical cac-id table.
    pub fn by_canonical_cac_id(id: &str) -> Option<MakeModel> {
        static REVERSE: Lazy<HashMap<&'static str, MakeModel>> = Lazy::new(|| {
            MakeModel::iter()
                .filter_map(|mm| mm.canonical_cac_id().map(|id| (id, mm)))
                .collect()
        });
        REVERSE.get(id).copied()
    }
}

/// Selects which actor code governs a spaceheat node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(from = "String")]
pub enum ActorClass {
    /// The site controller itself.
    Scada,
    /// Local fallback supervisor when the AtomicTNode is unreachable.
    HomeAlone,
    /// Aggregate power meter driver.
    PowerMeter,
    /// Relay driver.
    Relay,
    /// Single-channel sensor driver.
    SimpleSensor,
    /// Multi-channel sensor driver.
    MultipurposeSensor,
    /// On/off actuator driver.
    BooleanActuator,
    /// Node with no governing actor (purely structural).
    NoActor,
}

impl From<String> for ActorClass {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(ActorClass::NoActor)
    }
}

/// Legacy-model role of a spaceheat node in the thermal/electrical plant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(from = "String")]
pub enum Role {
    /// The site controller node.
    Scada,
    /// Local fallback supervisor node.
    HomeAlone,
    /// Remote coordinator node.
    Atn,
    /// The single aggregate power meter.
    PowerMeter,
    /// Resistive heating element.
    BoostElement,
    /// On/off actuator.
    BooleanActuator,
    /// Single-channel sensor.
    SimpleSensor,
    /// Multi-channel sensor.
    MultipurposeSensor,
    /// Role not modeled by this build.
    Unknown,
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Role::Unknown)
    }
}

/// Physical quantity captured by a telemetry channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(from = "String")]
pub enum TelemetryName {
    /// Real power in watts.
    PowerW,
    /// Water temperature, millidegrees Celsius.
    WaterTempCTimes1000,
    /// Air temperature, millidegrees Celsius.
    AirTempCTimes1000,
    /// Relay energized/de-energized state.
    RelayState,
    /// RMS current in micro-amps.
    CurrentRmsMicroAmps,
    /// RMS voltage in millivolts.
    VoltageRmsMilliVolts,
    /// Telemetry name not modeled by this build.
    Unknown,
}

impl From<String> for TelemetryName {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(TelemetryName::Unknown)
    }
}

/// Measurement unit attached to channel configs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Unit {
    /// Dimensionless.
    Unitless,
    /// Watts.
    W,
    /// Degrees Celsius.
    Celcius,
    /// Degrees Fahrenheit.
    Fahrenheit,
    /// Amperes.
    Amps,
    /// Volts.
    Volts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_model_serde_uses_registry_spelling() {
        let json = serde_json::to_string(&MakeModel::Egauge4030).unwrap();
        assert_eq!(json, "\"EGAUGE__4030\"");
        let parsed: MakeModel = serde_json::from_str("\"NCD__PR814SPST\"").unwrap();
        assert_eq!(parsed, MakeModel::NcdPr814Spst);
    }

    #[test]
    fn unrecognized_make_model_decodes_to_unknown() {
        let parsed: MakeModel = serde_json::from_str("\"ACME__FLUXCAP\"").unwrap();
        assert!(parsed.is_unknown());
    }

    #[test]
    fn unrecognized_role_decodes_to_unknown() {
        let parsed: Role = serde_json::from_str("\"DedicatedThermalStore\"").unwrap();
        assert_eq!(parsed, Role::Unknown);
    }

    #[test]
    fn canonical_cac_ids_are_distinct() {
        let ids: Vec<_> = MakeModel::iter()
            .filter_map(MakeModel::canonical_cac_id)
            .collect();
        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn reverse_table_round_trips() {
        for mm in MakeModel::iter() {
            if let Some(id) = mm.canonical_cac_id() {
                assert_eq!(MakeModel::by_canonical_cac_id(id), Some(mm));
            }
        }
        assert_eq!(MakeModel::by_canonical_cac_id("not-an-id"), None);
    }
}
