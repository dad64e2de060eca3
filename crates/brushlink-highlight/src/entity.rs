//! Scene entities and their highlight binding.

use brushlink_core::{HighlightTechnique, SceneError};
use tracing::debug;

use crate::factory::HighlighterFactory;
use crate::highlighters::Highlighter;
use crate::visual::EntityVisual;

/// Unique id of one entity instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Derives the logical name from a raw scene name.
///
/// Keeps the first whitespace-separated token, which drops duplicate
/// suffixes such as `"Milk (1)"`, then strips a trailing `_pack` segment.
/// Returns `None` when nothing is left.
pub fn normalize_entity_name(raw: &str) -> Option<String> {
    let token = raw.split_whitespace().next()?;
    let name = match token.rsplit_once('_') {
        Some((head, tail)) if tail.eq_ignore_ascii_case("pack") => head,
        _ => token,
    };
    (!name.is_empty()).then(|| name.to_string())
}

/// One world instance of a named item.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    raw_name: String,
    visual: EntityVisual,
    technique: HighlightTechnique,
    highlighter: Option<Box<dyn Highlighter>>,
    highlighted: bool,
    active: bool,
}

impl Entity {
    /// Creates an active, unhighlighted entity with no strategy attached.
    pub fn new(id: u32, raw_name: &str, visual: EntityVisual) -> Result<Self, SceneError> {
        let name = normalize_entity_name(raw_name).ok_or_else(|| SceneError::EmptyEntityName {
            raw: raw_name.to_string(),
        })?;
        Ok(Self {
            id: EntityId(id),
            name,
            raw_name: raw_name.to_string(),
            visual,
            technique: HighlightTechnique::None,
            highlighter: None,
            highlighted: false,
            active: true,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Normalised logical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn visual(&self) -> &EntityVisual {
        &self.visual
    }

    pub fn technique(&self) -> HighlightTechnique {
        self.technique
    }

    /// Technique of the bound strategy, if any.
    pub fn bound_technique(&self) -> Option<HighlightTechnique> {
        self.highlighter.as_ref().map(|h| h.technique())
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Replaces the highlight strategy.
    ///
    /// The old strategy is detached before the new one is created. A
    /// highlighted entity stays highlighted under the new strategy.
    pub fn set_technique(&mut self, technique: HighlightTechnique, factory: &HighlighterFactory) {
        if self.technique == technique {
            return;
        }

        if let Some(mut old) = self.highlighter.take() {
            old.detach(&mut self.visual);
        }

        self.highlighter = factory.create(technique, self.id, &self.name, &mut self.visual);
        self.technique = technique;

        if self.highlighted {
            if let Some(highlighter) = self.highlighter.as_mut() {
                highlighter.highlight(&mut self.visual);
            }
        }
        debug!("{} ({}) now uses {}", self.id, self.name, technique);
    }

    /// Applies the highlight state. Returns true if the state changed.
    pub fn set_highlight_state(&mut self, value: bool) -> bool {
        if self.highlighted == value {
            return false;
        }
        if let Some(highlighter) = self.highlighter.as_mut() {
            if value {
                highlighter.highlight(&mut self.visual);
            } else {
                highlighter.unhighlight(&mut self.visual);
            }
        }
        self.highlighted = value;
        true
    }

    pub fn toggle_highlight(&mut self) -> bool {
        self.set_highlight_state(!self.highlighted)
    }

    /// Shows or hides the entity. Hiding removes the highlight.
    pub fn set_active(&mut self, active: bool) {
        if !active {
            self.set_highlight_state(false);
        }
        self.active = active;
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        if let Some(mut highlighter) = self.highlighter.take() {
            highlighter.detach(&mut self.visual);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_entity_name() {
        assert_eq!(normalize_entity_name("Milk").as_deref(), Some("Milk"));
        assert_eq!(normalize_entity_name("Milk (1)").as_deref(), Some("Milk"));
        assert_eq!(normalize_entity_name("Juice_Pack").as_deref(), Some("Juice"));
        assert_eq!(normalize_entity_name("Juice_PACK (2)").as_deref(), Some("Juice"));
        assert_eq!(normalize_entity_name("Oat_Milk").as_deref(), Some("Oat_Milk"));
        assert_eq!(normalize_entity_name("Backpack").as_deref(), Some("Backpack"));
        assert_eq!(normalize_entity_name("   "), None);
        assert_eq!(normalize_entity_name("_pack"), None);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = Entity::new(1, "", EntityVisual::default()).unwrap_err();
        assert_eq!(err, SceneError::EmptyEntityName { raw: String::new() });
    }

    #[test]
    fn test_state_changes_are_reported() {
        let mut entity = Entity::new(1, "Milk", EntityVisual::default()).unwrap();
        assert!(entity.set_highlight_state(true));
        assert!(!entity.set_highlight_state(true));
        assert!(entity.toggle_highlight());
        assert!(!entity.is_highlighted());
    }
}
