use std::collections::HashMap;

use crate::api::types::EntityKind;
use crate::assets::manifest::ModelManifest;

/// What the renderer should draw for an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualSource {
    /// A model is configured but has not finished loading.
    Pending(String),
    Model(String),
    /// Primitive stand-in (sphere for the ball, torus for the hoop).
    Placeholder,
}

impl VisualSource {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, VisualSource::Pending(_))
    }
}

/// Tracks the load state of each entity's visual. Physics bodies for an
/// entity are only created once its visual has resolved.
#[derive(Debug, Clone)]
pub struct VisualRegistry {
    visuals: HashMap<EntityKind, VisualSource>,
}

impl VisualRegistry {
    /// Everything is a placeholder and ready immediately.
    pub fn new() -> Self {
        Self::from_manifest(&ModelManifest::default())
    }

    pub fn from_manifest(manifest: &ModelManifest) -> Self {
        let visuals = [EntityKind::Ball, EntityKind::Hoop]
            .into_iter()
            .map(|kind| {
                let source = match manifest.model_for(kind) {
                    Some(path) => VisualSource::Pending(path.to_string()),
                    None => VisualSource::Placeholder,
                };
                (kind, source)
            })
            .collect();
        Self { visuals }
    }

    /// Report a finished load. Failures fall back to the placeholder.
    /// Returns true if this resolved a pending visual.
    pub fn resolve(&mut self, kind: EntityKind, ok: bool) -> bool {
        let Some(source) = self.visuals.get_mut(&kind) else {
            return false;
        };
        let VisualSource::Pending(path) = source else {
            return false;
        };
        if ok {
            *source = VisualSource::Model(std::mem::take(path));
        } else {
            log::warn!("Failed to load {} model '{}', using placeholder", kind.name(), path);
            *source = VisualSource::Placeholder;
        }
        true
    }

    pub fn get(&self, kind: EntityKind) -> &VisualSource {
        self.visuals
            .get(&kind)
            .unwrap_or(&VisualSource::Placeholder)
    }

    pub fn is_ready(&self, kind: EntityKind) -> bool {
        self.get(kind).is_resolved()
    }
}

impl Default for VisualRegistry {
    fn default() -> Self {
        Self::new()
    }
}
