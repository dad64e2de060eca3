//! Entity directory: logical names, their instances and highlight flags.
//!
//! Every indexed name maps to a non-empty list of active entities and one
//! name-scoped flag. All instances sharing a name highlight together.

use std::collections::{BTreeMap, BTreeSet};

use brushlink_core::{HighlightTechnique, MarkRegistry, SceneError};
use tracing::{debug, info, warn};

use crate::entity::{Entity, EntityId};
use crate::factory::HighlighterFactory;
use crate::visual::EntityVisual;

/// Number of per-instance highlight and unhighlight applications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightStats {
    pub highlight_calls: u64,
    pub unhighlight_calls: u64,
}

impl HighlightStats {
    pub fn total(&self) -> u64 {
        self.highlight_calls + self.unhighlight_calls
    }
}

/// Maps names to entity instances and highlight flags.
#[derive(Debug)]
pub struct EntityDirectory {
    entities: Vec<Entity>,
    by_name: BTreeMap<String, Vec<usize>>,
    flags: BTreeMap<String, bool>,
    factory: HighlighterFactory,
    technique: HighlightTechnique,
    stats: HighlightStats,
}

fn apply(
    entities: &mut [Entity],
    indices: &[usize],
    value: bool,
    stats: &mut HighlightStats,
) {
    for &index in indices {
        if entities[index].set_highlight_state(value) {
            if value {
                stats.highlight_calls += 1;
            } else {
                stats.unhighlight_calls += 1;
            }
        }
    }
}

impl EntityDirectory {
    /// Creates an empty directory. Entities start with `technique`.
    pub fn new(factory: HighlighterFactory, technique: HighlightTechnique) -> Self {
        Self {
            entities: Vec::new(),
            by_name: BTreeMap::new(),
            flags: BTreeMap::new(),
            factory,
            technique,
            stats: HighlightStats::default(),
        }
    }

    /// Adds an entity to the scene. It is not indexed until [`rebuild`].
    ///
    /// [`rebuild`]: EntityDirectory::rebuild
    pub fn add_entity(&mut self, raw_name: &str, visual: EntityVisual) -> Result<EntityId, SceneError> {
        let id = self.entities.len() as u32;
        let mut entity = Entity::new(id, raw_name, visual)?;
        entity.set_technique(self.technique, &self.factory);
        self.entities.push(entity);
        Ok(EntityId(id))
    }

    /// Rescans active entities and resets every flag to false.
    ///
    /// Instances still highlighted are unhighlighted first. Returns the
    /// number of indexed names.
    pub fn rebuild(&mut self) -> usize {
        for entity in self.entities.iter_mut() {
            if entity.set_highlight_state(false) {
                self.stats.unhighlight_calls += 1;
            }
        }

        self.by_name.clear();
        self.flags.clear();
        for (index, entity) in self.entities.iter().enumerate() {
            if entity.is_active() {
                self.by_name
                    .entry(entity.name().to_string())
                    .or_default()
                    .push(index);
            }
        }
        self.flags = self.by_name.keys().map(|name| (name.clone(), false)).collect();

        info!(
            "Entity directory rebuilt: {} names, {} instances",
            self.by_name.len(),
            self.by_name.values().map(Vec::len).sum::<usize>()
        );
        self.by_name.len()
    }

    /// Highlights every instance of `name`.
    ///
    /// With `unhighlight_rest`, every other name is cleared. Unknown names
    /// are logged and ignored. Returns false for an unknown name.
    pub fn highlight(&mut self, name: &str, unhighlight_rest: bool) -> bool {
        let Some(indices) = self.by_name.get(name) else {
            warn!("Cannot highlight '{}': no such entity", name);
            return false;
        };
        apply(&mut self.entities, indices, true, &mut self.stats);
        self.flags.insert(name.to_string(), true);

        if unhighlight_rest {
            for (other, indices) in self.by_name.iter().filter(|(n, _)| n.as_str() != name) {
                apply(&mut self.entities, indices, false, &mut self.stats);
                self.flags.insert(other.clone(), false);
            }
        }
        true
    }

    /// Clears one name. Unknown names are a no-op.
    pub fn unhighlight(&mut self, name: &str) -> bool {
        let Some(indices) = self.by_name.get(name) else {
            debug!("Cannot unhighlight '{}': no such entity", name);
            return false;
        };
        apply(&mut self.entities, indices, false, &mut self.stats);
        self.flags.insert(name.to_string(), false);
        true
    }

    /// Clears every flag and every instance.
    pub fn unhighlight_all(&mut self) {
        for entity in self.entities.iter_mut() {
            if entity.set_highlight_state(false) {
                self.stats.unhighlight_calls += 1;
            }
        }
        for flag in self.flags.values_mut() {
            *flag = false;
        }
    }

    /// Makes the highlighted names exactly `names`.
    ///
    /// Names currently highlighted but absent are unhighlighted, then every
    /// present name is highlighted without clearing the rest. Calling twice
    /// with the same set applies nothing the second time.
    pub fn sync_to_set(&mut self, names: &BTreeSet<String>) {
        let stale: Vec<String> = self
            .flags
            .iter()
            .filter(|(name, on)| **on && !names.contains(*name))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &stale {
            self.unhighlight(name);
        }

        for name in names {
            if self.by_name.contains_key(name) {
                self.highlight(name, false);
            } else {
                debug!("Skipping unknown name '{}'", name);
            }
        }
    }

    /// Switches every entity to `technique`.
    pub fn set_technique_all(&mut self, technique: HighlightTechnique) {
        self.technique = technique;
        for entity in self.entities.iter_mut() {
            entity.set_technique(technique, &self.factory);
        }
        info!("Highlight technique set to {}", technique);
    }

    /// Shows or hides one entity. The index changes only on [`rebuild`].
    ///
    /// [`rebuild`]: EntityDirectory::rebuild
    pub fn set_entity_active(&mut self, id: EntityId, active: bool) -> bool {
        match self.entities.get_mut(id.0 as usize) {
            Some(entity) => {
                let was_highlighted = entity.is_highlighted();
                entity.set_active(active);
                if was_highlighted && !entity.is_highlighted() {
                    self.stats.unhighlight_calls += 1;
                }
                true
            }
            None => {
                warn!("Unknown entity {}", id);
                false
            }
        }
    }

    /// Toggles a single instance, leaving its name's flag alone.
    pub fn toggle_highlight(&mut self, id: EntityId) -> Option<bool> {
        let entity = self.entities.get_mut(id.0 as usize)?;
        entity.toggle_highlight();
        let now = entity.is_highlighted();
        if now {
            self.stats.highlight_calls += 1;
        } else {
            self.stats.unhighlight_calls += 1;
        }
        Some(now)
    }

    /// Resets the shared strategy adapters after the marks were rebuilt.
    pub fn marks_changed(&mut self, registry: &dyn MarkRegistry) {
        self.factory.marks_changed(registry);
    }

    pub fn is_highlighted(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    pub fn highlighted_names(&self) -> BTreeSet<String> {
        self.flags
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Indexed names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Indexed instances of `name`.
    pub fn instances<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&index| &self.entities[index])
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)
    }

    /// All entities, active or not.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn technique(&self) -> HighlightTechnique {
        self.technique
    }

    pub fn factory(&self) -> &HighlighterFactory {
        &self.factory
    }

    pub fn stats(&self) -> HighlightStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = HighlightStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlighters::HeadlessBundler;
    use brushlink_settings::HighlightSettings;

    fn directory(names: &[&str]) -> EntityDirectory {
        let factory =
            HighlighterFactory::new(HighlightSettings::default(), Box::new(HeadlessBundler::new()));
        let mut directory = EntityDirectory::new(factory, HighlightTechnique::Size);
        for name in names {
            directory.add_entity(name, EntityVisual::default()).unwrap();
        }
        directory.rebuild();
        directory
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_duplicates_share_a_flag() {
        let mut dir = directory(&["Milk", "Milk (1)", "Bread"]);
        assert_eq!(dir.names().collect::<Vec<_>>(), vec!["Bread", "Milk"]);

        assert!(dir.highlight("Milk", true));
        assert!(dir.instances("Milk").all(|e| e.is_highlighted()));
        assert_eq!(dir.is_highlighted("Milk"), Some(true));
        assert_eq!(dir.stats().highlight_calls, 2);
    }

    #[test]
    fn test_highlight_exclusive_keeps_own_flag() {
        let mut dir = directory(&["Milk", "Bread", "Eggs"]);
        dir.highlight("Bread", false);
        dir.highlight("Eggs", false);

        dir.highlight("Milk", true);
        assert_eq!(dir.highlighted_names(), set(&["Milk"]));
        assert!(dir.instances("Milk").all(|e| e.is_highlighted()));
        assert!(dir.instances("Eggs").all(|e| !e.is_highlighted()));
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let mut dir = directory(&["Milk"]);
        assert!(!dir.highlight("Tea", true));
        assert!(!dir.unhighlight("Tea"));
        assert_eq!(dir.stats().total(), 0);
        assert_eq!(dir.is_highlighted("Tea"), None);
    }

    #[test]
    fn test_sync_to_set_diffs_and_is_idempotent() {
        let mut dir = directory(&["Milk", "Bread", "Eggs"]);
        dir.sync_to_set(&set(&["Milk", "Bread"]));
        assert_eq!(dir.highlighted_names(), set(&["Bread", "Milk"]));

        dir.sync_to_set(&set(&["Bread", "Eggs", "Tea"]));
        assert_eq!(dir.highlighted_names(), set(&["Bread", "Eggs"]));
        let after = dir.stats();
        assert_eq!(after.highlight_calls, 3);
        assert_eq!(after.unhighlight_calls, 1);

        dir.sync_to_set(&set(&["Bread", "Eggs", "Tea"]));
        assert_eq!(dir.stats(), after);
    }

    #[test]
    fn test_rebuild_unhighlights_and_respects_activity() {
        let mut dir = directory(&["Milk", "Bread"]);
        dir.highlight("Milk", false);
        let bread = dir.instances("Bread").next().unwrap().id();

        dir.set_entity_active(bread, false);
        assert_eq!(dir.rebuild(), 1);

        assert!(!dir.contains("Bread"));
        assert_eq!(dir.highlighted_names(), BTreeSet::new());
        assert!(dir.entities().iter().all(|e| !e.is_highlighted()));
        assert!(dir.entities().iter().all(|e| e.visual().is_unit_scale()));
    }

    #[test]
    fn test_toggle_single_instance() {
        let mut dir = directory(&["Milk", "Milk (1)"]);
        let first = dir.instances("Milk").next().unwrap().id();
        assert_eq!(dir.toggle_highlight(first), Some(true));
        assert_eq!(dir.toggle_highlight(first), Some(false));
        assert_eq!(dir.toggle_highlight(EntityId(99)), None);
    }
}
