//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "House0 site scaffolding on top of the layout db."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::ops::{Deref, DerefMut};

use gw_layout_core::house0::{
    House0RequiredNames, HOUSE0_STRATEGY, STORE_TANK_BOUNDS, ZONE_BOUNDS,
};
use gw_layout_schema::node::SPACEHEAT_NODE_GT;
use gw_layout_schema::{
    ActorClass, Cac, CacAttrs, ChannelConfig, Component, ComponentConfig, DataChannel, MakeModel,
    Role, ShNode, TelemetryName,
};

use crate::db::LayoutDb;
use crate::id_map::LayoutIDMap;
use crate::{DbError, Result};

/// Short names of the metered loads every scaffolded House0 site starts
/// with: heat pump outdoor and indoor units, and the store pump.
pub const POWER_METERED_SHORT_NAMES: &[&str] = &["hp-odu", "hp-idu", "store-pump"];

const METER_DISPLAY_NAME: &str = "eGauge power meter";

/// A [`LayoutDb`] pre-seeded with the standard House0 node set.
///
/// Scaffolding gives a new site a document the loader accepts end to end:
/// the `"s"` strategy carrier, the required power-meter and home-alone
/// nodes, the meter cac/component pair, stub nodes for every tank, zone,
/// and metered load, and one power channel per metered load.
#[derive(Debug, Clone)]
pub struct House0LayoutDb {
    db: LayoutDb,
    names: House0RequiredNames,
}

impl Deref for House0LayoutDb {
    type Target = LayoutDb;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

impl DerefMut for House0LayoutDb {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.db
    }
}

fn check_site_parameters(total_store_tanks: u32, zone_list: &[String]) -> Result<()> {
    let (tank_lo, tank_hi) = STORE_TANK_BOUNDS;
    if !(tank_lo..=tank_hi).contains(&total_store_tanks) {
        return Err(DbError::InvalidSiteParameter {
            field: "TotalStoreTanks",
            reason: format!("{total_store_tanks} is outside [{tank_lo}, {tank_hi}]"),
        });
    }
    let (zone_lo, zone_hi) = ZONE_BOUNDS;
    if !(zone_lo..=zone_hi).contains(&zone_list.len()) {
        return Err(DbError::InvalidSiteParameter {
            field: "ZoneList",
            reason: format!("length {} is outside [{zone_lo}, {zone_hi}]", zone_list.len()),
        });
    }
    Ok(())
}

impl House0LayoutDb {
    /// A db for a House0 site with the given tank count and zones, reusing
    /// the id assignments in `loaded`. With `add_stubs` the standard node
    /// set is seeded immediately.
    pub fn new(
        loaded: LayoutIDMap,
        total_store_tanks: u32,
        zone_list: Vec<String>,
        add_stubs: bool,
    ) -> Result<Self> {
        check_site_parameters(total_store_tanks, &zone_list)?;
        let mut house0 = Self {
            db: LayoutDb::with_loaded(loaded),
            names: House0RequiredNames::new(total_store_tanks, &zone_list),
        };
        if add_stubs {
            house0.add_stubs(total_store_tanks, &zone_list);
        }
        Ok(house0)
    }

    /// Canonical node names of this site.
    pub fn required_names(&self) -> &House0RequiredNames {
        &self.names
    }

    fn stub_node(&self, name: &str, actor_class: ActorClass, role: Option<Role>) -> ShNode {
        ShNode {
            sh_node_id: self.db.make_node_id(name),
            name: name.to_owned(),
            actor_class,
            role,
            handle: None,
            component_id: None,
            display_name: None,
            in_power_metering: None,
            strategy: None,
            total_store_tanks: None,
            zone_list: None,
            type_name: SPACEHEAT_NODE_GT.to_owned(),
        }
    }

    fn add_stubs(&mut self, total_store_tanks: u32, zone_list: &[String]) {
        let names = self.names.clone();

        let mut scada = self.stub_node(&names.scada, ActorClass::Scada, Some(Role::Scada));
        scada.strategy = Some(HOUSE0_STRATEGY.to_owned());
        scada.total_store_tanks = Some(total_store_tanks);
        scada.zone_list = Some(zone_list.to_vec());
        self.db.add_node(scada);

        self.db.add_node(self.stub_node(
            &names.home_alone,
            ActorClass::HomeAlone,
            Some(Role::HomeAlone),
        ));

        let cac_id = self.db.make_cac_id(MakeModel::Egauge4030, None);
        self.db.add_cac(Cac {
            component_attribute_class_id: cac_id.clone(),
            make_model: MakeModel::Egauge4030,
            display_name: Some("eGauge 4030".to_owned()),
            min_poll_period_ms: Some(1000),
            attrs: CacAttrs::ElectricMeter {
                telemetry_name_list: vec![TelemetryName::PowerW],
                interface: None,
            },
        });

        // Metered-load stubs, plus the meter's reporting config for each.
        // Register bindings are left empty until the site's registers are
        // known; resolution accepts an unbound meter.
        let mut config_list = Vec::new();
        for short_name in POWER_METERED_SHORT_NAMES {
            let node_name = format!("{}.{short_name}", names.scada);
            let channel_name = format!("{short_name}-pwr");
            let mut load = self.stub_node(&node_name, ActorClass::NoActor, None);
            load.in_power_metering = Some(true);
            self.db.add_node(load);
            config_list.push(ChannelConfig {
                channel_name: channel_name.clone(),
                about_node_name: node_name.clone(),
                telemetry_name: TelemetryName::PowerW,
                poll_period_ms: Some(1000),
                exponent: 0,
                async_capture: false,
            });
            self.db.add_channel(DataChannel {
                id: self.db.make_channel_id(&channel_name),
                name: channel_name,
                display_name: None,
                about_node_name: node_name,
                captured_by_node_name: names.power_meter.clone(),
                telemetry_name: TelemetryName::PowerW,
                in_power_metering: Some(true),
                type_name: gw_layout_schema::channel::DATA_CHANNEL_GT.to_owned(),
            });
        }

        let component_id = self.db.make_component_id(METER_DISPLAY_NAME);
        self.db.add_component(Component {
            component_id: component_id.clone(),
            component_attribute_class_id: cac_id,
            display_name: Some(METER_DISPLAY_NAME.to_owned()),
            hw_uid: None,
            config: ComponentConfig::ElectricMeter {
                config_list,
                egauge_io_list: Vec::new(),
                modbus_host: None,
                modbus_port: None,
            },
        });

        let mut power_meter = self.stub_node(
            &names.power_meter,
            ActorClass::PowerMeter,
            Some(Role::PowerMeter),
        );
        power_meter.component_id = Some(component_id);
        self.db.add_node(power_meter);

        for tank_name in &names.store_tanks {
            self.db
                .add_node(self.stub_node(tank_name, ActorClass::NoActor, None));
        }
        for zone_name in &names.zones {
            self.db
                .add_node(self.stub_node(zone_name, ActorClass::NoActor, None));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_site_parameters() {
        let err = House0LayoutDb::new(LayoutIDMap::default(), 7, vec!["up".to_owned()], false)
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidSiteParameter {
                field: "TotalStoreTanks",
                ..
            }
        ));
        let err = House0LayoutDb::new(LayoutIDMap::default(), 2, Vec::new(), false).unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidSiteParameter { field: "ZoneList", .. }
        ));
    }

    #[test]
    fn stubs_cover_the_required_node_set() {
        let zones = vec!["Living Room".to_owned(), "Upstairs".to_owned()];
        let db = House0LayoutDb::new(LayoutIDMap::default(), 3, zones, true).unwrap();
        for name in db.required_names().all() {
            assert!(db.nodes().contains_key(&name), "missing stub node {name}");
        }
        for short_name in POWER_METERED_SHORT_NAMES {
            assert!(db.nodes().contains_key(&format!("s.{short_name}")));
            assert!(db.channels().contains_key(&format!("{short_name}-pwr")));
        }
        // One eGauge class/instance pair, linked from the meter node.
        assert_eq!(db.cacs().len(), 1);
        assert_eq!(db.components().len(), 1);
        let meter = &db.nodes()["s.power-meter"];
        assert_eq!(
            meter.component_id.as_deref(),
            db.components().keys().next().map(String::as_str)
        );
    }

    #[test]
    fn scaffold_uses_canonical_meter_cac_id() {
        let db = House0LayoutDb::new(
            LayoutIDMap::default(),
            1,
            vec!["main".to_owned()],
            true,
        )
        .unwrap();
        assert!(db
            .cacs()
            .contains_key(MakeModel::Egauge4030.canonical_cac_id().unwrap()));
    }
}
