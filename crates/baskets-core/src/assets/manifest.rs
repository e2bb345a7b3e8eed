use serde::{Deserialize, Serialize};

use crate::api::types::EntityKind;

/// Optional 3D model paths for the gameplay entities.
/// Loaded from a JSON file at runtime; anything left out renders as a
/// primitive placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelManifest {
    pub ball: Option<String>,
    pub hoop: Option<String>,
}

impl ModelManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn model_for(&self, kind: EntityKind) -> Option<&str> {
        match kind {
            EntityKind::Ball => self.ball.as_deref(),
            EntityKind::Hoop => self.hoop.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_manifest() {
        let json = r#"{ "hoop": "models/hoop.glb" }"#;
        let manifest = ModelManifest::from_json(json).unwrap();
        assert_eq!(manifest.model_for(EntityKind::Hoop), Some("models/hoop.glb"));
        assert_eq!(manifest.model_for(EntityKind::Ball), None);
    }

    #[test]
    fn entries_for_other_visuals_are_ignored() {
        let json = r#"{ "ball": "models/ball.glb", "hand_left": "models/left.glb" }"#;
        let manifest = ModelManifest::from_json(json).unwrap();
        assert_eq!(
            manifest,
            ModelManifest {
                ball: Some("models/ball.glb".into()),
                hoop: None,
            }
        );
    }

    #[test]
    fn empty_object_is_all_placeholders() {
        let manifest = ModelManifest::from_json("{}").unwrap();
        assert_eq!(manifest, ModelManifest::default());
    }
}
