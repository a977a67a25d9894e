use super::area::{Area, AreaCatalog, ContentError};
use serde::{Deserialize, Serialize};

const BUILTIN_CONTENT: &str = include_str!("areas.json");

/// Movement and navigation constants, any subset can be overridden by the
/// `tuning` object of a content document
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdventureTuning {
    /// units per second
    pub speed: f64,
    /// units per second squared
    pub acceleration: f64,
    /// the player never gets closer than this to a world edge
    pub world_margin: f64,
    /// horizontal distance under which pointer-follow stops steering
    pub follow_deadzone: f64,
    pub near_radius: f64,
    /// fraction of the remaining distance the camera covers each frame
    pub camera_lerp: f64,
    /// distance between the viewport bottom and the player's feet
    pub floor_offset: f64,
    pub player_width: f64,
    pub player_height: f64,
    /// where the player starts and where "next area" drops them
    pub entry_x: f64,
    /// where walking through a door drops the player
    pub door_entry_x: f64,
    /// "previous area" drops the player this far from the right edge
    pub back_entry_inset: f64,
    /// longest step integrated at once, in seconds
    pub max_dt: f64,
}

impl Default for AdventureTuning {
    fn default() -> Self {
        Self {
            speed: 300.0,
            acceleration: 2000.0,
            world_margin: 24.0,
            follow_deadzone: 12.0,
            near_radius: 120.0,
            camera_lerp: 0.15,
            floor_offset: 24.0,
            player_width: 44.0,
            player_height: 72.0,
            entry_x: 120.0,
            door_entry_x: 100.0,
            back_entry_inset: 200.0,
            max_dt: 0.05,
        }
    }
}

impl AdventureTuning {
    fn validate(&self) -> Result<(), ContentError> {
        let checks = [
            ("speed", self.speed > 0.0),
            ("acceleration", self.acceleration > 0.0),
            ("worldMargin", self.world_margin >= 0.0),
            ("followDeadzone", self.follow_deadzone >= 0.0),
            ("nearRadius", self.near_radius >= 0.0),
            ("cameraLerp", self.camera_lerp > 0.0 && self.camera_lerp <= 1.0),
            ("playerWidth", self.player_width > 0.0),
            ("playerHeight", self.player_height > 0.0),
            ("maxDt", self.max_dt > 0.0),
        ];
        match checks.iter().find(|(_, ok)| !*ok) {
            Some((field, _)) => Err(ContentError::InvalidTuning(*field)),
            None => Ok(()),
        }
    }
}

/// Shape of a content document, embedded or fetched
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentDocument {
    #[serde(default)]
    pub tuning: AdventureTuning,
    pub areas: Vec<Area>,
}

/// Validated content the world is built from
#[derive(Debug, Clone)]
pub struct Content {
    pub catalog: AreaCatalog,
    pub tuning: AdventureTuning,
}

impl Content {
    pub fn from_document(document: ContentDocument) -> Result<Self, ContentError> {
        document.tuning.validate()?;
        Ok(Content {
            catalog: AreaCatalog::new(document.areas, document.tuning.world_margin)?,
            tuning: document.tuning,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ContentError> {
        Self::from_document(serde_json::from_str(text)?)
    }

    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(BUILTIN_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adventure::area::HotspotKind;

    #[test]
    fn builtin_content_is_valid() {
        let content = Content::builtin().unwrap();
        assert_eq!(content.catalog.len(), 2);
        let alley = content.catalog.get(0).unwrap();
        assert_eq!(alley.id, "alley");
        assert_eq!(alley.width, 2400.0);
        let door = alley.hotspot("door").unwrap();
        assert_eq!(door.kind, HotspotKind::Door);
        assert_eq!(door.requires.as_deref(), Some("Keycard"));
        assert_eq!(content.catalog.get(1).unwrap().id, "server");
        assert_eq!(content.tuning, AdventureTuning::default());
    }

    #[test]
    fn partial_tuning_keeps_defaults() {
        let content = Content::from_json(
            r#"{"tuning":{"speed":150},"areas":[{"id":"a","name":"A","width":800}]}"#,
        )
        .unwrap();
        assert_eq!(content.tuning.speed, 150.0);
        assert_eq!(content.tuning.acceleration, 2000.0);
    }

    #[test]
    fn bad_documents_surface_errors() {
        assert!(matches!(
            Content::from_json("{\"areas\": 3}"),
            Err(ContentError::Json(_))
        ));
        assert!(matches!(
            Content::from_json(r#"{"tuning":{"cameraLerp":0},"areas":[{"id":"a","name":"A","width":800}]}"#),
            Err(ContentError::InvalidTuning("cameraLerp"))
        ));
        assert!(matches!(
            Content::from_json(r#"{"tuning":{"maxDt":0},"areas":[{"id":"a","name":"A","width":800}]}"#),
            Err(ContentError::InvalidTuning("maxDt"))
        ));
    }
}
