//! ---
//! ems_section: "08-testing-validation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Integration tests for layout loading and link resolution."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde_json::{json, Value};

use gw_layout_core::{
    parent_alias, ErrorPolicy, HardwareLayout, House0Layout, LayoutDocument, LayoutError,
    LoadOptions,
};

const CAC_A: &str = "739a6e32-bb9c-43bc-a28d-fb61be665522";
const COMPONENT_C: &str = "0dc4c8b8-8a4f-4a28-92ad-b1a5d9f60f4e";

/// A small but complete site: scada, power meter with an eGauge register
/// pair, a heat pump node counted in aggregate metering, and GNode blocks.
fn sample_document() -> LayoutDocument {
    let value = json!({
        "MyAtomicTNodeGNode": {
            "GNodeId": "b6a32d9b-08cb-4ab4-a52e-d4f769ad0a62",
            "Alias": "hw1.isone.me.versant.keene.holly",
            "GNodeStatusValue": "Active"
        },
        "MyScadaGNode": {
            "GNodeId": "1b8f6e4b-8a0e-4ad5-bc7e-3a33ee4c2e9e",
            "Alias": "hw1.isone.me.versant.keene.holly.scada"
        },
        "MyTerminalAssetGNode": {
            "GNodeId": "3d9e9c5f-6a7e-4d39-bdf1-56e5cf6b52a5",
            "Alias": "hw1.isone.me.versant.keene.holly.ta"
        },
        "ElectricMeterCacs": [
            {
                "ComponentAttributeClassId": CAC_A,
                "MakeModel": "EGAUGE__4030",
                "DisplayName": "eGauge 4030",
                "MinPollPeriodMs": 1000,
                "TelemetryNameList": ["PowerW"],
                "Interface": "ethernet",
                "TypeName": "electric.meter.cac.gt"
            }
        ],
        "OtherCacs": [
            {
                "ComponentAttributeClassId": "0b7aedcd-0d93-4110-9a5b-9e6c6d32e3c3",
                "MakeModel": "ACME__FLUXCAP",
                "DisplayName": "flux capacitor",
                "TypeName": "flux.capacitor.cac.gt"
            }
        ],
        "ElectricMeterComponents": [
            {
                "ComponentId": COMPONENT_C,
                "ComponentAttributeClassId": CAC_A,
                "DisplayName": "main meter",
                "ConfigList": [
                    {
                        "ChannelName": "hp-odu-pwr",
                        "AboutNodeName": "s.hp-odu",
                        "TelemetryName": "PowerW",
                        "PollPeriodMs": 1000,
                        "Exponent": 0
                    }
                ],
                "EgaugeIoList": [
                    {
                        "ChannelName": "hp-odu-pwr",
                        "InputConfig": {
                            "Address": 9000,
                            "Name": "register hp-odu",
                            "RegisterType": "f32",
                            "Denominator": 1,
                            "Unit": "W"
                        }
                    }
                ],
                "ModbusHost": "egauge.local",
                "ModbusPort": 502,
                "TypeName": "electric.meter.component.gt"
            }
        ],
        "ShNodes": [
            {
                "ShNodeId": "86236dd1-0482-4e4e-be5c-5a1e8e74d1de",
                "Name": "s",
                "ActorClass": "Scada",
                "Role": "Scada",
                "Strategy": "House0",
                "TotalStoreTanks": 3,
                "ZoneList": ["Living Room"],
                "TypeName": "spaceheat.node.gt"
            },
            {
                "ShNodeId": "7aa8d4f5-3f5c-4d6e-97c3-2c2ecbd9a922",
                "Name": "s.home-alone",
                "ActorClass": "HomeAlone",
                "Role": "HomeAlone",
                "TypeName": "spaceheat.node.gt"
            },
            {
                "ShNodeId": "ff8f3b43-9c8e-4f2e-b6a5-6d4cc2c94f59",
                "Name": "s.power-meter",
                "ActorClass": "PowerMeter",
                "Role": "PowerMeter",
                "ComponentId": COMPONENT_C,
                "TypeName": "spaceheat.node.gt"
            },
            {
                "ShNodeId": "2bb2e4f0-96b1-4d62-9a10-8c29cbd67f8c",
                "Name": "s.hp-odu",
                "ActorClass": "NoActor",
                "InPowerMetering": true,
                "TypeName": "spaceheat.node.gt"
            }
        ],
        "DataChannels": [
            {
                "Id": "19acb6c8-4e9e-4e16-8a64-5e5d0cb1b2d2",
                "Name": "hp-odu-pwr",
                "AboutNodeName": "s.hp-odu",
                "CapturedByNodeName": "s.power-meter",
                "TelemetryName": "PowerW",
                "InPowerMetering": true,
                "TypeName": "data.channel.gt"
            }
        ]
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[test]
fn load_dict_populates_every_registry() {
    let loaded = HardwareLayout::load_dict(&sample_document(), &LoadOptions::default()).unwrap();
    assert!(loaded.errors.is_empty());
    let layout = loaded.layout;
    assert_eq!(layout.cacs.len(), 2);
    assert_eq!(layout.components.len(), 1);
    assert_eq!(layout.nodes.len(), 4);
    assert_eq!(layout.channels.len(), 1);
    assert_eq!(
        layout.atn_g_node_alias(),
        Some("hw1.isone.me.versant.keene.holly")
    );
    assert_eq!(
        layout.scada_g_node_alias(),
        Some("hw1.isone.me.versant.keene.holly.scada")
    );
    assert_eq!(
        layout.terminal_asset_g_node_id(),
        Some("3d9e9c5f-6a7e-4d39-bdf1-56e5cf6b52a5")
    );
}

#[test]
fn point_lookups_chain_through_links() {
    let loaded = HardwareLayout::load_dict(&sample_document(), &LoadOptions::default()).unwrap();
    let layout = loaded.layout;
    let cac = layout.cac("s.power-meter").unwrap();
    assert_eq!(cac.component_attribute_class_id, CAC_A);
    let component = layout.component("s.power-meter").unwrap();
    assert_eq!(component.component_id, COMPONENT_C);
    // Nodes without a component answer None, not an error.
    assert!(layout.component("s.hp-odu").is_none());
    assert!(layout.cac("no-such-node").is_none());
}

#[test]
fn dangling_component_reference_raises_under_raise_policy() {
    let mut doc = sample_document();
    doc["ShNodes"][2]["ComponentId"] = json!("not-a-loaded-component");
    let err = HardwareLayout::load_dict(&doc, &LoadOptions::default()).unwrap_err();
    match err {
        LayoutError::MissingComponent { node, component_id } => {
            assert_eq!(node, "s.power-meter");
            assert_eq!(component_id, "not-a-loaded-component");
        }
        other => panic!("expected missing component, got {other}"),
    }
}

#[test]
fn dangling_component_reference_is_isolated_under_collect_policy() {
    let mut doc = sample_document();
    doc["ShNodes"][2]["ComponentId"] = json!("not-a-loaded-component");
    let loaded = HardwareLayout::load_dict(&doc, &LoadOptions::collecting()).unwrap();
    assert_eq!(loaded.errors.len(), 1);
    let error = &loaded.errors[0];
    assert_eq!(error.kind, "ShNode");
    assert_eq!(error.record["node"]["name"], "s.power-meter");
    // The broken link reads as None, everything else loaded.
    assert!(loaded.layout.component("s.power-meter").is_none());
    assert_eq!(loaded.layout.nodes.len(), 4);
}

#[test]
fn egauge_channel_mismatch_is_reported_per_node() {
    let mut doc = sample_document();
    doc["ElectricMeterComponents"][0]["EgaugeIoList"][0]["ChannelName"] = json!("wrong-channel");
    let loaded = HardwareLayout::load_dict(&doc, &LoadOptions::collecting()).unwrap();
    assert_eq!(loaded.errors.len(), 1);
    assert_eq!(loaded.errors[0].kind, "ShNode");
    assert_eq!(loaded.errors[0].record["node"]["name"], "s.power-meter");
}

#[test]
fn partial_load_restricts_to_allow_list() {
    let mut options = LoadOptions::default();
    options.included_node_names = Some(["s".to_owned(), "s.home-alone".to_owned()].into());
    let loaded = HardwareLayout::load_dict(&sample_document(), &options).unwrap();
    assert_eq!(loaded.layout.nodes.len(), 2);
    assert!(loaded.layout.node("s.power-meter").is_none());
}

#[test]
fn parent_traversal_follows_dotted_names() {
    let loaded = HardwareLayout::load_dict(&sample_document(), &LoadOptions::default()).unwrap();
    let layout = loaded.layout;
    assert_eq!(parent_alias("s.power-meter.amp-1"), "s.power-meter");
    assert_eq!(parent_alias("s"), "");
    assert!(layout.parent_node("s").unwrap().is_none());
    let parent = layout.parent_node("s.power-meter").unwrap().unwrap();
    assert_eq!(parent.name, "s");
}

#[test]
fn missing_parent_raises_at_point_of_use() {
    let mut doc = sample_document();
    // Drop the "s" node; "s.home-alone" then has no loaded parent.
    let nodes = doc["ShNodes"].as_array_mut().unwrap();
    nodes.remove(0);
    let loaded = HardwareLayout::load_dict(&doc, &LoadOptions::default()).unwrap();
    let err = loaded.layout.parent_node("s.home-alone").unwrap_err();
    match err {
        LayoutError::MissingParent { alias, parent } => {
            assert_eq!(alias, "s.home-alone");
            assert_eq!(parent, "s");
        }
        other => panic!("expected missing parent, got {other}"),
    }
}

#[test]
fn descendants_matches_literal_prefix() {
    let loaded = HardwareLayout::load_dict(&sample_document(), &LoadOptions::default()).unwrap();
    let layout = loaded.layout;
    assert_eq!(layout.descendants("s").len(), 4);
    assert_eq!(layout.descendants("s.power-meter").len(), 1);
    // Pinned looseness: the prefix test is not dot-boundary aware, so the
    // prefix "s.h" matches both "s.home-alone" and "s.hp-odu".
    let matched: Vec<_> = layout
        .descendants("s.h")
        .into_iter()
        .map(|node| node.name.as_str())
        .collect();
    assert_eq!(matched, vec!["s.home-alone", "s.hp-odu"]);
}

#[test]
fn house0_load_succeeds_on_well_formed_document() {
    let loaded = House0Layout::load_dict(&sample_document(), &LoadOptions::default()).unwrap();
    let house0 = loaded.layout;
    assert_eq!(house0.total_store_tanks(), 3);
    assert_eq!(house0.zone_list(), ["Living Room"]);
    let names = house0.required_names();
    assert_eq!(names.zones, vec!["s.zone1-living-room"]);
    // Deref passes aggregate queries through.
    assert_eq!(house0.power_meter_node().unwrap().name, "s.power-meter");
}

#[test]
fn house0_rejects_out_of_range_tank_counts() {
    for bad_tanks in [json!(7), json!(0)] {
        let mut doc = sample_document();
        doc["ShNodes"][0]["TotalStoreTanks"] = bad_tanks;
        let err = House0Layout::load_dict(&doc, &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::InvalidHouse0Field {
                field: "TotalStoreTanks",
                ..
            }
        ));
    }
}

#[test]
fn house0_rejects_non_list_zone_list() {
    let mut doc = sample_document();
    doc["ShNodes"][0]["ZoneList"] = json!("Living Room");
    let err = House0Layout::load_dict(&doc, &LoadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::InvalidHouse0Field {
            field: "ZoneList",
            ..
        }
    ));
}

#[test]
fn house0_rejects_wrong_strategy_even_when_collecting() {
    let mut doc = sample_document();
    doc["ShNodes"][0]["Strategy"] = json!("House1");
    let err = House0Layout::load_dict(&doc, &LoadOptions::collecting()).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::InvalidHouse0Field {
            field: "Strategy",
            ..
        }
    ));
}

#[test]
fn house0_requires_scada_node() {
    let mut doc = sample_document();
    doc["ShNodes"].as_array_mut().unwrap().remove(0);
    let err = House0Layout::load_dict(&doc, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LayoutError::MissingScadaNode));
}

#[test]
fn load_reads_document_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hardware-layout.json");
    std::fs::write(
        &path,
        serde_json::to_vec_pretty(&Value::Object(sample_document())).unwrap(),
    )
    .unwrap();
    let loaded = HardwareLayout::load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.layout.nodes.len(), 4);

    let err = HardwareLayout::load(dir.path().join("missing.json"), &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, LayoutError::Io { .. }));
}

#[test]
fn collect_policy_still_loads_remaining_records() {
    let mut doc = sample_document();
    doc["ShNodes"]
        .as_array_mut()
        .unwrap()
        .insert(0, json!({"Name": "s.broken"}));
    let loaded = HardwareLayout::load_dict(&doc, &LoadOptions::collecting()).unwrap();
    assert_eq!(loaded.errors.len(), 1);
    assert_eq!(loaded.errors[0].kind, "ShNodes");
    assert_eq!(loaded.layout.nodes.len(), 4);

    let err = HardwareLayout::load_dict(
        &doc,
        &LoadOptions {
            policy: ErrorPolicy::Raise,
            ..LoadOptions::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, LayoutError::Decode { .. }));
}
