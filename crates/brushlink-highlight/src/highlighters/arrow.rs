use brushlink_core::{HighlightTechnique, Shared};
use tracing::debug;

use super::Highlighter;
use crate::entity::EntityId;
use crate::visual::EntityVisual;

/// Entities the off-screen indicator renderer points at.
///
/// One list is shared by every arrow strategy. Membership is deduplicated.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArrowTargets {
    targets: Vec<EntityId>,
}

impl ArrowTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entity` unless already present. Returns true if it was added.
    pub fn insert(&mut self, entity: EntityId) -> bool {
        if self.targets.contains(&entity) {
            return false;
        }
        self.targets.push(entity);
        true
    }

    /// Returns true if `entity` was present.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| *t != entity);
        before != self.targets.len()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.targets.contains(&entity)
    }

    /// Drops every target; used when the mark set is rebuilt.
    pub fn clear(&mut self) {
        if !self.targets.is_empty() {
            debug!("Clearing {} arrow targets", self.targets.len());
        }
        self.targets.clear();
    }

    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Adds the entity to the shared off-screen target list.
#[derive(Debug)]
pub struct ArrowHighlighter {
    entity: EntityId,
    targets: Shared<ArrowTargets>,
}

impl ArrowHighlighter {
    pub fn new(entity: EntityId, targets: Shared<ArrowTargets>) -> Self {
        Self { entity, targets }
    }
}

impl Highlighter for ArrowHighlighter {
    fn technique(&self) -> HighlightTechnique {
        HighlightTechnique::Arrow
    }

    fn highlight(&mut self, _visual: &mut EntityVisual) {
        self.targets.borrow_mut().insert(self.entity);
    }

    fn unhighlight(&mut self, _visual: &mut EntityVisual) {
        self.targets.borrow_mut().remove(self.entity);
    }

    /// Membership in the shared list; a wholesale clear unhighlights.
    fn is_highlighted(&self) -> bool {
        self.targets.borrow().contains(self.entity)
    }
}
