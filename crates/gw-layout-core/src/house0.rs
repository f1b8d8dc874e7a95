//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "House0 strategy specialization of the layout aggregate."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::ops::Deref;
use std::path::Path;

use serde_json::Value;

use crate::layout::{HardwareLayout, Loaded};
use crate::load::{LayoutDocument, LoadOptions, NODE_LIST};
use crate::{LayoutError, Result};

/// Strategy literal required on the `"s"` node of a House0 layout.
pub const HOUSE0_STRATEGY: &str = "House0";
/// Inclusive bounds on the store tank count.
pub const STORE_TANK_BOUNDS: (u32, u32) = (1, 6);
/// Inclusive bounds on the zone count.
pub const ZONE_BOUNDS: (usize, usize) = (1, 6);

/// Canonical node names a House0 site is expected to carry, derived from
/// the tank count and zone list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct House0RequiredNames {
    /// The site controller node.
    pub scada: String,
    /// The local fallback supervisor node.
    pub home_alone: String,
    /// The aggregate power meter node.
    pub power_meter: String,
    /// One node per thermal store tank.
    pub store_tanks: Vec<String>,
    /// One node per heating zone.
    pub zones: Vec<String>,
}

impl House0RequiredNames {
    /// Derive the canonical names for a site with the given tank count and
    /// zone names.
    pub fn new(total_store_tanks: u32, zone_list: &[String]) -> Self {
        Self {
            scada: "s".to_owned(),
            home_alone: "s.home-alone".to_owned(),
            power_meter: "s.power-meter".to_owned(),
            store_tanks: (1..=total_store_tanks)
                .map(|i| format!("s.store-tank{i}"))
                .collect(),
            zones: zone_list
                .iter()
                .enumerate()
                .map(|(i, zone)| format!("s.zone{}-{}", i + 1, slugify(zone)))
                .collect(),
        }
    }

    /// Every required name, scada first.
    pub fn all(&self) -> Vec<String> {
        let mut names = vec![
            self.scada.clone(),
            self.home_alone.clone(),
            self.power_meter.clone(),
        ];
        names.extend(self.store_tanks.iter().cloned());
        names.extend(self.zones.iter().cloned());
        names
    }
}

/// Produce a node-name-safe slug from a human-friendly zone name.
fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut previous_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            previous_dash = false;
        } else if matches!(ch, ' ' | '-' | '_' | '.' | '/') && !previous_dash && !slug.is_empty() {
            slug.push('-');
            previous_dash = true;
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// A [`HardwareLayout`] validated against the House0 strategy invariants.
///
/// Validation is a hard precondition of the specialization: it reads the
/// raw `"s"` record out of the document and fails construction on any
/// violation, regardless of the per-record error policy.
#[derive(Debug, Clone)]
pub struct House0Layout {
    layout: HardwareLayout,
    total_store_tanks: u32,
    zone_list: Vec<String>,
}

impl Deref for House0Layout {
    type Target = HardwareLayout;

    fn deref(&self) -> &Self::Target {
        &self.layout
    }
}

fn house0_scalars(doc: &LayoutDocument) -> Result<(u32, Vec<String>)> {
    let scada_record = doc
        .get(NODE_LIST)
        .and_then(Value::as_array)
        .and_then(|records| {
            records
                .iter()
                .find(|record| record.get("Name").and_then(Value::as_str) == Some("s"))
        })
        .ok_or(LayoutError::MissingScadaNode)?;

    let strategy = scada_record
        .get("Strategy")
        .and_then(Value::as_str)
        .ok_or_else(|| LayoutError::InvalidHouse0Field {
            field: "Strategy",
            reason: "missing or not a string".to_owned(),
        })?;
    if strategy != HOUSE0_STRATEGY {
        return Err(LayoutError::InvalidHouse0Field {
            field: "Strategy",
            reason: format!("expected \"{HOUSE0_STRATEGY}\", found \"{strategy}\""),
        });
    }

    let total_store_tanks = scada_record
        .get("TotalStoreTanks")
        .and_then(Value::as_u64)
        .ok_or_else(|| LayoutError::InvalidHouse0Field {
            field: "TotalStoreTanks",
            reason: "missing or not an integer".to_owned(),
        })?;
    let (tank_lo, tank_hi) = STORE_TANK_BOUNDS;
    if !(u64::from(tank_lo)..=u64::from(tank_hi)).contains(&total_store_tanks) {
        return Err(LayoutError::InvalidHouse0Field {
            field: "TotalStoreTanks",
            reason: format!("{total_store_tanks} is outside [{tank_lo}, {tank_hi}]"),
        });
    }

    let zone_values = scada_record
        .get("ZoneList")
        .and_then(Value::as_array)
        .ok_or_else(|| LayoutError::InvalidHouse0Field {
            field: "ZoneList",
            reason: "missing or not a list".to_owned(),
        })?;
    let (zone_lo, zone_hi) = ZONE_BOUNDS;
    if !(zone_lo..=zone_hi).contains(&zone_values.len()) {
        return Err(LayoutError::InvalidHouse0Field {
            field: "ZoneList",
            reason: format!("length {} is outside [{zone_lo}, {zone_hi}]", zone_values.len()),
        });
    }
    let zone_list = zone_values
        .iter()
        .map(|zone| {
            zone.as_str()
                .map(str::to_owned)
                .ok_or_else(|| LayoutError::InvalidHouse0Field {
                    field: "ZoneList",
                    reason: format!("zone entry {zone} is not a string"),
                })
        })
        .collect::<Result<Vec<String>>>()?;

    Ok((total_store_tanks as u32, zone_list))
}

impl House0Layout {
    /// Read, validate, and load a House0 layout document from disk.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Loaded<Self>> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        let doc = match value {
            Value::Object(map) => map,
            _ => return Err(LayoutError::NotAnObject),
        };
        Self::load_dict(&doc, options)
    }

    /// Validate the House0 preconditions, then load the aggregate.
    pub fn load_dict(doc: &LayoutDocument, options: &LoadOptions) -> Result<Loaded<Self>> {
        let (total_store_tanks, zone_list) = house0_scalars(doc)?;
        let Loaded { layout, errors } = HardwareLayout::load_dict(doc, options)?;
        Ok(Loaded {
            layout: Self {
                layout,
                total_store_tanks,
                zone_list,
            },
            errors,
        })
    }

    /// Number of thermal store tanks at the site.
    pub fn total_store_tanks(&self) -> u32 {
        self.total_store_tanks
    }

    /// Heating zone names at the site.
    pub fn zone_list(&self) -> &[String] {
        &self.zone_list
    }

    /// Canonical node names this site is expected to carry.
    pub fn required_names(&self) -> House0RequiredNames {
        House0RequiredNames::new(self.total_store_tanks, &self.zone_list)
    }

    /// Mutable access to the wrapped aggregate (generation tooling).
    pub fn layout_mut(&mut self) -> &mut HardwareLayout {
        &mut self.layout
    }
}
