use super::inventory::Inventory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const DEFAULT_HOTSPOT_SIZE: f64 = 72.0;

fn default_hotspot_size() -> f64 {
    DEFAULT_HOTSPOT_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    Inspect,
    Pickup,
    Door,
}

impl HotspotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HotspotKind::Inspect => "inspect",
            HotspotKind::Pickup => "pickup",
            HotspotKind::Door => "door",
        }
    }
}

/// Something the player can walk up to. `x` is the horizontal center and
/// `y` the bottom edge, both in world units
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_hotspot_size")]
    pub w: f64,
    #[serde(default = "default_hotspot_size")]
    pub h: f64,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: HotspotKind,
    /// item granted by a pickup
    #[serde(default)]
    pub item: Option<String>,
    /// item a door needs
    #[serde(default)]
    pub requires: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub success_text: Option<String>,
    #[serde(default)]
    pub fail_text: Option<String>,
}

impl Hotspot {
    pub fn center(&self) -> (f64, f64) {
        (self.x, self.y - self.h / 2.0)
    }

    /// Derived every time, never stored
    pub fn is_locked(&self, inventory: &Inventory) -> bool {
        self.requires
            .as_deref()
            .map_or(false, |item| !inventory.contains(item))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub width: f64,
    /// CSS background of the parallax layer
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl Area {
    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|hotspot| hotspot.id == id)
    }
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("adventure content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("adventure content has no areas")]
    NoAreas,
    #[error("area id '{0}' is used more than once")]
    DuplicateArea(String),
    #[error("area '{area}' is {width} wide, it must be wider than {min}")]
    AreaTooNarrow { area: String, width: f64, min: f64 },
    #[error("hotspot id '{hotspot}' is used more than once in area '{area}'")]
    DuplicateHotspot { area: String, hotspot: String },
    #[error("hotspot '{hotspot}' in area '{area}' has no usable size")]
    InvalidHotspotSize { area: String, hotspot: String },
    #[error("pickup '{hotspot}' in area '{area}' names no item")]
    PickupWithoutItem { area: String, hotspot: String },
    #[error("tuning value '{0}' is out of range")]
    InvalidTuning(&'static str),
}

/// Ordered, validated list of areas. Never empty
#[derive(Debug, Clone)]
pub struct AreaCatalog {
    areas: Vec<Area>,
}

impl AreaCatalog {
    /// Rejects content the game loop could not run with; `margin` is the
    /// distance the player is kept from either world edge
    pub fn new(areas: Vec<Area>, margin: f64) -> Result<Self, ContentError> {
        if areas.is_empty() {
            return Err(ContentError::NoAreas);
        }
        let mut area_ids = HashSet::new();
        for area in &areas {
            if !area_ids.insert(area.id.as_str()) {
                return Err(ContentError::DuplicateArea(area.id.clone()));
            }
            let min = margin * 2.0;
            if !(area.width > min) {
                return Err(ContentError::AreaTooNarrow {
                    area: area.id.clone(),
                    width: area.width,
                    min,
                });
            }
            validate_hotspots(area)?;
        }
        Ok(AreaCatalog { areas })
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn get(&self, index: usize) -> Option<&Area> {
        self.areas.get(index)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

fn validate_hotspots(area: &Area) -> Result<(), ContentError> {
    let mut ids = HashSet::new();
    for hotspot in &area.hotspots {
        if !ids.insert(hotspot.id.as_str()) {
            return Err(ContentError::DuplicateHotspot {
                area: area.id.clone(),
                hotspot: hotspot.id.clone(),
            });
        }
        if !(hotspot.w > 0.0 && hotspot.h > 0.0) {
            return Err(ContentError::InvalidHotspotSize {
                area: area.id.clone(),
                hotspot: hotspot.id.clone(),
            });
        }
        let names_item = hotspot
            .item
            .as_deref()
            .map_or(false, |item| !item.trim().is_empty());
        if hotspot.kind == HotspotKind::Pickup && !names_item {
            return Err(ContentError::PickupWithoutItem {
                area: area.id.clone(),
                hotspot: hotspot.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(id: &str, kind: HotspotKind) -> Hotspot {
        Hotspot {
            id: id.into(),
            x: 100.0,
            y: 300.0,
            w: DEFAULT_HOTSPOT_SIZE,
            h: DEFAULT_HOTSPOT_SIZE,
            label: id.into(),
            kind,
            item: None,
            requires: None,
            text: None,
            success_text: None,
            fail_text: None,
        }
    }

    fn area(id: &str, hotspots: Vec<Hotspot>) -> Area {
        Area {
            id: id.into(),
            name: id.into(),
            width: 1000.0,
            background: String::new(),
            hotspots,
        }
    }

    #[test]
    fn hotspot_size_defaults_when_missing() {
        let hotspot: Hotspot = serde_json::from_str(
            r#"{"id":"sign","x":10,"y":20,"label":"Sign","type":"inspect"}"#,
        )
        .unwrap();
        assert_eq!(hotspot.w, DEFAULT_HOTSPOT_SIZE);
        assert_eq!(hotspot.h, DEFAULT_HOTSPOT_SIZE);
        assert_eq!(hotspot.center(), (10.0, 20.0 - 36.0));
    }

    #[test]
    fn door_is_locked_until_item_is_held() {
        let mut door = hotspot("door", HotspotKind::Door);
        door.requires = Some("Keycard".into());
        let mut inventory = Inventory::default();
        assert!(door.is_locked(&inventory));
        inventory.add("Keycard");
        assert!(!door.is_locked(&inventory));
        assert!(!hotspot("poster", HotspotKind::Inspect).is_locked(&Inventory::default()));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(
            AreaCatalog::new(Vec::new(), 24.0),
            Err(ContentError::NoAreas)
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = AreaCatalog::new(vec![area("a", vec![]), area("a", vec![])], 24.0);
        assert!(matches!(result, Err(ContentError::DuplicateArea(id)) if id == "a"));

        let result = AreaCatalog::new(
            vec![area(
                "a",
                vec![
                    hotspot("x", HotspotKind::Inspect),
                    hotspot("x", HotspotKind::Inspect),
                ],
            )],
            24.0,
        );
        assert!(matches!(result, Err(ContentError::DuplicateHotspot { .. })));
    }

    #[test]
    fn narrow_area_and_bad_pickup_are_rejected() {
        let mut narrow = area("narrow", vec![]);
        narrow.width = 40.0;
        assert!(matches!(
            AreaCatalog::new(vec![narrow], 24.0),
            Err(ContentError::AreaTooNarrow { .. })
        ));

        let result = AreaCatalog::new(
            vec![area("a", vec![hotspot("coin", HotspotKind::Pickup)])],
            24.0,
        );
        assert!(matches!(result, Err(ContentError::PickupWithoutItem { .. })));

        let mut flat = hotspot("flat", HotspotKind::Inspect);
        flat.h = 0.0;
        let result = AreaCatalog::new(vec![area("a", vec![flat])], 24.0);
        assert!(matches!(result, Err(ContentError::InvalidHotspotSize { .. })));
    }
}
