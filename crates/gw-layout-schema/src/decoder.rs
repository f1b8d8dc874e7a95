//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Typed decode dispatch tables for catch-all record lists."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::cac::{
    Cac, CacAttrs, ELECTRIC_METER_CAC_GT, MULTIPURPOSE_SENSOR_CAC_GT, RELAY_CAC_GT,
    SIMPLE_TEMP_SENSOR_CAC_GT,
};
use crate::component::{
    Component, ComponentConfig, ELECTRIC_METER_COMPONENT_GT, MULTIPURPOSE_SENSOR_COMPONENT_GT,
    RELAY_COMPONENT_GT, SIMPLE_TEMP_SENSOR_COMPONENT_GT,
};
use crate::enums::MakeModel;
use crate::{SchemaError, SchemaResult};

/// Decode function registered for one cac TypeName.
pub type CacDecodeFn = fn(&Value) -> SchemaResult<Cac>;
/// Decode function registered for one component TypeName.
pub type ComponentDecodeFn = fn(&Value) -> SchemaResult<Component>;

fn decode_typed_cac(record: &Value) -> SchemaResult<Cac> {
    Ok(serde_json::from_value(record.clone())?)
}

fn decode_typed_component(record: &Value) -> SchemaResult<Component> {
    Ok(serde_json::from_value(record.clone())?)
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GenericCacFields {
    component_attribute_class_id: String,
    #[serde(default)]
    make_model: MakeModel,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    min_poll_period_ms: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GenericComponentFields {
    component_id: String,
    component_attribute_class_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    hw_uid: Option<String>,
}

/// Minimal decode for a cac record whose TypeName this build does not know:
/// keep only the fields the aggregate needs.
pub fn decode_unknown_cac(record: &Value) -> SchemaResult<Cac> {
    let fields: GenericCacFields = serde_json::from_value(record.clone())?;
    Ok(Cac {
        component_attribute_class_id: fields.component_attribute_class_id,
        make_model: fields.make_model,
        display_name: fields.display_name,
        min_poll_period_ms: fields.min_poll_period_ms,
        attrs: CacAttrs::Unknown,
    })
}

/// Minimal decode for a component record whose TypeName this build does
/// not know.
pub fn decode_unknown_component(record: &Value) -> SchemaResult<Component> {
    let fields: GenericComponentFields = serde_json::from_value(record.clone())?;
    Ok(Component {
        component_id: fields.component_id,
        component_attribute_class_id: fields.component_attribute_class_id,
        display_name: fields.display_name,
        hw_uid: fields.hw_uid,
        config: ComponentConfig::Unknown,
    })
}

fn type_name_of(record: &Value) -> SchemaResult<&str> {
    record
        .get("TypeName")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingKey("TypeName"))
}

/// Dispatch table routing catch-all cac records by TypeName.
///
/// Registered at startup; open for extension via [`CacDecoder::register`].
/// Unrecognized tags fall back to [`decode_unknown_cac`].
#[derive(Debug, Clone)]
pub struct CacDecoder {
    decoders: IndexMap<String, CacDecodeFn>,
}

impl Default for CacDecoder {
    fn default() -> Self {
        let mut decoder = Self {
            decoders: IndexMap::new(),
        };
        for tag in [
            ELECTRIC_METER_CAC_GT,
            RELAY_CAC_GT,
            MULTIPURPOSE_SENSOR_CAC_GT,
            SIMPLE_TEMP_SENSOR_CAC_GT,
        ] {
            decoder.register(tag, decode_typed_cac);
        }
        decoder
    }
}

impl CacDecoder {
    /// Register (or replace) the decode function for one TypeName.
    pub fn register(&mut self, type_name: &str, decode: CacDecodeFn) {
        self.decoders.insert(type_name.to_owned(), decode);
    }

    /// Decode one record, routing by its TypeName tag.
    pub fn decode(&self, record: &Value) -> SchemaResult<Cac> {
        let tag = type_name_of(record)?;
        match self.decoders.get(tag) {
            Some(decode) => decode(record),
            None => {
                debug!(type_name = tag, "no cac decoder registered; decoding generic record");
                decode_unknown_cac(record)
            }
        }
    }
}

/// Dispatch table routing catch-all component records by TypeName.
#[derive(Debug, Clone)]
pub struct ComponentDecoder {
    decoders: IndexMap<String, ComponentDecodeFn>,
}

impl Default for ComponentDecoder {
    fn default() -> Self {
        let mut decoder = Self {
            decoders: IndexMap::new(),
        };
        for tag in [
            ELECTRIC_METER_COMPONENT_GT,
            RELAY_COMPONENT_GT,
            MULTIPURPOSE_SENSOR_COMPONENT_GT,
            SIMPLE_TEMP_SENSOR_COMPONENT_GT,
        ] {
            decoder.register(tag, decode_typed_component);
        }
        decoder
    }
}

impl ComponentDecoder {
    /// Register (or replace) the decode function for one TypeName.
    pub fn register(&mut self, type_name: &str, decode: ComponentDecodeFn) {
        self.decoders.insert(type_name.to_owned(), decode);
    }

    /// Decode one record, routing by its TypeName tag.
    pub fn decode(&self, record: &Value) -> SchemaResult<Component> {
        let tag = type_name_of(record)?;
        match self.decoders.get(tag) {
            Some(decode) => decode(record),
            None => {
                debug!(
                    type_name = tag,
                    "no component decoder registered; decoding generic record"
                );
                decode_unknown_component(record)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registered_tag_decodes_to_specific_subtype() {
        let decoder = ComponentDecoder::default();
        let record = json!({
            "ComponentId": "0dc4c8b8-8a4f-4a28-92ad-b1a5d9f60f4e",
            "ComponentAttributeClassId": "c6e736d8-8078-44f5-98bb-d72ca91dc773",
            "Gpio": 4,
            "NormallyOpen": true,
            "TypeName": "relay.component.gt"
        });
        let component = decoder.decode(&record).unwrap();
        assert!(matches!(
            component.config,
            ComponentConfig::Relay {
                gpio: Some(4),
                normally_open: true
            }
        ));
    }

    #[test]
    fn unrecognized_tag_falls_back_to_generic_decode() {
        let decoder = CacDecoder::default();
        let record = json!({
            "ComponentAttributeClassId": "0b7aedcd-0d93-4110-9a5b-9e6c6d32e3c3",
            "MakeModel": "ACME__FLUXCAP",
            "DisplayName": "flux capacitor",
            "TypeName": "flux.capacitor.cac.gt"
        });
        let cac = decoder.decode(&record).unwrap();
        assert_eq!(cac.attrs, CacAttrs::Unknown);
        assert!(cac.make_model.is_unknown());
        assert_eq!(cac.display_name.as_deref(), Some("flux capacitor"));
    }

    #[test]
    fn missing_type_name_is_an_error() {
        let decoder = CacDecoder::default();
        let record = json!({"ComponentAttributeClassId": "x"});
        assert!(matches!(
            decoder.decode(&record),
            Err(SchemaError::MissingKey("TypeName"))
        ));
    }

    #[test]
    fn extension_decoder_takes_precedence() {
        fn always_unknown(record: &Value) -> SchemaResult<Cac> {
            decode_unknown_cac(record)
        }
        let mut decoder = CacDecoder::default();
        decoder.register(ELECTRIC_METER_CAC_GT, always_unknown);
        let record = json!({
            "ComponentAttributeClassId": "739a6e32-bb9c-43bc-a28d-fb61be665522",
            "MakeModel": "EGAUGE__4030",
            "TelemetryNameList": ["PowerW"],
            "TypeName": "electric.meter.cac.gt"
        });
        let cac = decoder.decode(&record).unwrap();
        assert_eq!(cac.attrs, CacAttrs::Unknown);
    }
}
