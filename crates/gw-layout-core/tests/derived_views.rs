//! ---
//! ems_section: "08-testing-validation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Integration tests for derived, cached layout queries."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gw_layout_core::test_support::{meter_component, node, unknown_cac, unknown_component, TestLayout};
use gw_layout_core::{HardwareLayout, LayoutError};
use gw_layout_schema::{Role, TelemetryName};

fn metered_site() -> HardwareLayout {
    TestLayout::new()
        .with_cac(unknown_cac("cac-meter", "bench meter class"))
        .with_component(meter_component("comp-meter", "cac-meter", &["s.hp-odu", "s.oil-boiler"]))
        .with_node(node("s", Role::Scada, None))
        .with_node(node("s.home-alone", Role::HomeAlone, None))
        .with_node(node("s.power-meter", Role::PowerMeter, Some("comp-meter")))
        .with_node(node("s.hp-odu", Role::BoostElement, None))
        .with_node(node("s.oil-boiler", Role::BoostElement, None))
        .with_node(node("s.relay1", Role::BooleanActuator, None))
        .layout()
}

#[test]
fn role_enumerations_reflect_loaded_nodes() {
    let layout = metered_site();
    let heaters: Vec<_> = layout
        .all_resistive_heaters()
        .into_iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(heaters, vec!["s.hp-odu", "s.oil-boiler"]);
    assert_eq!(layout.all_boolean_actuators().len(), 1);
    assert!(layout.all_simple_sensors().is_empty());
    assert!(layout.all_multipurpose_sensors().is_empty());
}

#[test]
fn required_role_queries_resolve_or_error() {
    let layout = metered_site();
    assert_eq!(layout.power_meter_node().unwrap().name, "s.power-meter");
    assert_eq!(layout.home_alone_node().unwrap().name, "s.home-alone");

    let bare = TestLayout::new().with_node(node("s", Role::Scada, None)).layout();
    let err = bare.power_meter_node().unwrap_err();
    assert!(matches!(
        err,
        LayoutError::MissingRequiredRole {
            role: Role::PowerMeter
        }
    ));
}

#[test]
fn power_meter_tuples_follow_channel_configs() {
    let layout = metered_site();
    let tuples = layout.all_power_meter_telemetry_tuples().unwrap();
    assert_eq!(tuples.len(), 2);
    for tuple in &tuples {
        assert_eq!(tuple.sensor_node.name, "s.power-meter");
        assert_eq!(tuple.telemetry_name, TelemetryName::PowerW);
    }
    let abouts: Vec<_> = tuples.iter().map(|t| t.about_node.name.as_str()).collect();
    assert_eq!(abouts, vec!["s.hp-odu", "s.oil-boiler"]);

    // all_telemetry_tuples is the concatenation; no other sensors here.
    assert_eq!(layout.all_telemetry_tuples().unwrap(), tuples);
}

#[test]
fn tuples_skip_channels_about_unloaded_nodes() {
    let layout = TestLayout::new()
        .with_cac(unknown_cac("cac-meter", "bench meter class"))
        .with_component(meter_component("comp-meter", "cac-meter", &["s.hp-odu", "s.ghost"]))
        .with_node(node("s.power-meter", Role::PowerMeter, Some("comp-meter")))
        .with_node(node("s.hp-odu", Role::BoostElement, None))
        .layout();
    let tuples = layout.all_power_meter_telemetry_tuples().unwrap();
    assert_eq!(tuples.len(), 1);
    assert_eq!(tuples[0].about_node.name, "s.hp-odu");
}

#[test]
fn derived_views_are_stable_until_cache_cleared() {
    let mut layout = metered_site();
    assert_eq!(layout.all_resistive_heaters().len(), 2);

    layout
        .nodes
        .insert("s.elt1".to_owned(), node("s.elt1", Role::BoostElement, None));
    // The memoized view still answers from the cached name list.
    assert_eq!(layout.all_resistive_heaters().len(), 2);

    layout.clear_property_cache();
    assert_eq!(layout.all_resistive_heaters().len(), 3);
}

#[test]
fn cache_clear_covers_required_role_cells() {
    let mut layout = metered_site();
    assert_eq!(layout.power_meter_node().unwrap().name, "s.power-meter");

    let mut replacement = node("s.meter2", Role::PowerMeter, None);
    replacement.display_name = Some("replacement meter".to_owned());
    layout.nodes.shift_remove("s.power-meter");
    layout.nodes.insert("s.meter2".to_owned(), replacement);

    layout.clear_property_cache();
    assert_eq!(layout.power_meter_node().unwrap().name, "s.meter2");
}

#[test]
fn node_or_answers_default_for_unloaded_names() {
    let layout = metered_site();
    let fallback = node("s.fallback", Role::Unknown, None);
    assert_eq!(layout.node_or("s.power-meter", &fallback).name, "s.power-meter");
    assert_eq!(layout.node_or("s.no-such-node", &fallback).name, "s.fallback");
}

#[test]
fn lookups_chain_cac_component_node() {
    let layout = TestLayout::new()
        .with_cac(unknown_cac("A", "class a"))
        .with_component(unknown_component("C", "A", "component c"))
        .with_node(node("n", Role::SimpleSensor, Some("C")))
        .layout();
    assert_eq!(layout.cac("n").unwrap().component_attribute_class_id, "A");
    assert_eq!(layout.component("n").unwrap().component_id, "C");

    // A dangling component id degrades reads to None rather than failing.
    let broken = TestLayout::new()
        .with_cac(unknown_cac("A", "class a"))
        .with_node(node("n", Role::SimpleSensor, Some("Z")))
        .layout();
    assert!(broken.component("n").is_none());
    assert!(broken.cac("n").is_none());
}
