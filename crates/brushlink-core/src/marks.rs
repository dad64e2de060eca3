//! Mark registry: the renderable data points the engines query.
//!
//! The visualization layer owns the marks. The brushing and filter engines
//! only read positions, toggle `eligible`, and toggle the `brushed` marker,
//! all through the [`MarkRegistry`] trait. [`MarkStore`] is the in-memory
//! implementation used by headless sessions and tests.

use std::collections::{BTreeMap, HashSet};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SceneError;
use crate::geometry::{QueryVolume, VisFrame};

/// Stable identifier of a mark within one registry generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkId(pub u32);

impl std::fmt::Display for MarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mark#{}", self.0)
    }
}

/// One rendered data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub id: MarkId,
    /// Name of the entity this mark represents. Not unique.
    pub entity_name: String,
    /// World-space position.
    pub position: Point3<f32>,
    /// False while filtered out.
    pub eligible: bool,
    /// Only data marks take part in brushing and filtering.
    pub data_mark: bool,
    /// Set while the mark is part of the brushed selection.
    pub brushed: bool,
}

impl Mark {
    /// Creates an eligible, unbrushed data mark.
    pub fn new(id: u32, entity_name: impl Into<String>, position: Point3<f32>) -> Self {
        Self {
            id: MarkId(id),
            entity_name: entity_name.into(),
            position,
            eligible: true,
            data_mark: true,
            brushed: false,
        }
    }

    /// Marks this as a non-data mark (axis tick, legend glyph, ...).
    pub fn decoration(mut self) -> Self {
        self.data_mark = false;
        self
    }
}

/// Measurement type of an encoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Quantitative,
    Categorical,
}

/// Descriptor of the data field encoded on one visual axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDomain {
    /// Field name, e.g. "Price".
    pub field: String,
    pub kind: AxisKind,
    /// Data value at the start of the axis.
    pub domain_min: f32,
    /// Data value at the end of the axis.
    pub domain_max: f32,
    /// Tick labels, used for categorical emphasis.
    #[serde(default)]
    pub tick_labels: Vec<String>,
}

impl AxisDomain {
    pub fn quantitative(field: impl Into<String>, domain_min: f32, domain_max: f32) -> Self {
        Self {
            field: field.into(),
            kind: AxisKind::Quantitative,
            domain_min,
            domain_max,
            tick_labels: Vec::new(),
        }
    }

    pub fn categorical(field: impl Into<String>, labels: Vec<String>) -> Self {
        let count = labels.len().max(1) as f32;
        Self {
            field: field.into(),
            kind: AxisKind::Categorical,
            domain_min: 0.0,
            domain_max: count,
            tick_labels: labels,
        }
    }

    pub fn is_quantitative(&self) -> bool {
        self.kind == AxisKind::Quantitative
    }

    /// Checks the domain is non-empty and ordered.
    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.domain_min < self.domain_max) {
            return Err(SceneError::InvalidDomain {
                axis: self.field.clone(),
                min: self.domain_min,
                max: self.domain_max,
            });
        }
        Ok(())
    }
}

/// Read/write access to the live mark set.
///
/// Position and membership are owned by the visualization; only
/// eligibility and the brushed marker are written through this interface.
pub trait MarkRegistry {
    /// All marks, in registry order.
    fn list_marks(&self) -> Vec<&Mark>;

    fn mark(&self, id: MarkId) -> Option<&Mark>;

    fn mark_position(&self, id: MarkId) -> Option<Point3<f32>> {
        self.mark(id).map(|m| m.position)
    }

    fn mark_is_eligible(&self, id: MarkId) -> bool {
        self.mark(id).is_some_and(|m| m.eligible)
    }

    /// Returns the previous value, or `None` if the id is unknown.
    fn set_eligible(&mut self, id: MarkId, eligible: bool) -> Option<bool>;

    /// Returns the previous value, or `None` if the id is unknown.
    fn set_brushed(&mut self, id: MarkId, brushed: bool) -> Option<bool>;

    /// Frame placing the visualization in the world.
    fn frame(&self) -> VisFrame;

    fn x_domain(&self) -> &AxisDomain;

    fn y_domain(&self) -> &AxisDomain;

    /// Incremented every time the mark set is rebuilt.
    fn generation(&self) -> u64;

    /// Data marks inside `volume`, optionally restricted to eligible ones.
    fn overlap(&self, volume: &QueryVolume, eligible_only: bool) -> Vec<MarkId> {
        self.list_marks()
            .into_iter()
            .filter(|m| m.data_mark && (!eligible_only || m.eligible))
            .filter(|m| volume.contains(&m.position))
            .map(|m| m.id)
            .collect()
    }
}

/// In-memory mark registry.
#[derive(Debug, Clone)]
pub struct MarkStore {
    marks: BTreeMap<MarkId, Mark>,
    frame: VisFrame,
    x_domain: AxisDomain,
    y_domain: AxisDomain,
    generation: u64,
}

impl MarkStore {
    /// Creates a store, validating the axis descriptors and mark ids.
    pub fn new(
        frame: VisFrame,
        x_domain: AxisDomain,
        y_domain: AxisDomain,
        marks: Vec<Mark>,
    ) -> Result<Self, SceneError> {
        let mut store = Self {
            marks: BTreeMap::new(),
            frame,
            x_domain: x_domain.clone(),
            y_domain: y_domain.clone(),
            generation: 0,
        };
        store.rebuild(x_domain, y_domain, marks)?;
        store.generation = 0;
        Ok(store)
    }

    /// Replaces the whole mark set (layout switch or data re-query).
    ///
    /// On error the store is left untouched.
    pub fn rebuild(
        &mut self,
        x_domain: AxisDomain,
        y_domain: AxisDomain,
        marks: Vec<Mark>,
    ) -> Result<u64, SceneError> {
        x_domain.validate()?;
        y_domain.validate()?;

        let mut seen = HashSet::with_capacity(marks.len());
        for mark in &marks {
            if !seen.insert(mark.id) {
                return Err(SceneError::DuplicateMark { id: mark.id.0 });
            }
        }

        self.marks = marks.into_iter().map(|m| (m.id, m)).collect();
        self.x_domain = x_domain;
        self.y_domain = y_domain;
        self.generation += 1;
        debug!(
            "Mark store rebuilt: {} marks, generation {}",
            self.marks.len(),
            self.generation
        );
        Ok(self.generation)
    }

    pub fn set_frame(&mut self, frame: VisFrame) {
        self.frame = frame;
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Ids of marks currently carrying the brushed marker.
    pub fn brushed_ids(&self) -> Vec<MarkId> {
        self.marks
            .values()
            .filter(|m| m.brushed)
            .map(|m| m.id)
            .collect()
    }

    /// Ids of marks currently filtered out.
    pub fn ineligible_ids(&self) -> Vec<MarkId> {
        self.marks
            .values()
            .filter(|m| !m.eligible)
            .map(|m| m.id)
            .collect()
    }
}

impl MarkRegistry for MarkStore {
    fn list_marks(&self) -> Vec<&Mark> {
        self.marks.values().collect()
    }

    fn mark(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(&id)
    }

    fn set_eligible(&mut self, id: MarkId, eligible: bool) -> Option<bool> {
        self.marks
            .get_mut(&id)
            .map(|m| std::mem::replace(&mut m.eligible, eligible))
    }

    fn set_brushed(&mut self, id: MarkId, brushed: bool) -> Option<bool> {
        self.marks
            .get_mut(&id)
            .map(|m| std::mem::replace(&mut m.brushed, brushed))
    }

    fn frame(&self) -> VisFrame {
        self.frame
    }

    fn x_domain(&self) -> &AxisDomain {
        &self.x_domain
    }

    fn y_domain(&self) -> &AxisDomain {
        &self.y_domain
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Sphere;

    fn store() -> MarkStore {
        MarkStore::new(
            VisFrame::identity(),
            AxisDomain::quantitative("Price", 0.0, 10.0),
            AxisDomain::quantitative("Rating", 1.0, 5.0),
            vec![
                Mark::new(1, "Milk", Point3::new(0.0, 0.0, 0.0)),
                Mark::new(2, "Bread", Point3::new(0.01, 0.0, 0.0)),
                Mark::new(3, "Tick", Point3::new(0.0, 0.01, 0.0)).decoration(),
                Mark::new(4, "Eggs", Point3::new(0.5, 0.5, 0.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_overlap_skips_decorations_and_ineligible() {
        let mut store = store();
        let volume = QueryVolume::Sphere(Sphere::new(Point3::origin(), 0.02));

        assert_eq!(store.overlap(&volume, true), vec![MarkId(1), MarkId(2)]);

        store.set_eligible(MarkId(2), false);
        assert_eq!(store.overlap(&volume, true), vec![MarkId(1)]);
        assert_eq!(store.overlap(&volume, false), vec![MarkId(1), MarkId(2)]);
    }

    #[test]
    fn test_setters_report_previous_value() {
        let mut store = store();
        assert_eq!(store.set_brushed(MarkId(1), true), Some(false));
        assert_eq!(store.set_brushed(MarkId(1), true), Some(true));
        assert_eq!(store.set_brushed(MarkId(99), true), None);
        assert_eq!(store.brushed_ids(), vec![MarkId(1)]);
    }

    #[test]
    fn test_rebuild_bumps_generation_and_rejects_duplicates() {
        let mut store = store();
        assert_eq!(store.generation(), 0);

        let gen = store
            .rebuild(
                AxisDomain::quantitative("Price", 0.0, 10.0),
                AxisDomain::quantitative("Rating", 1.0, 5.0),
                vec![Mark::new(9, "Tea", Point3::origin())],
            )
            .unwrap();
        assert_eq!(gen, 1);
        assert_eq!(store.len(), 1);

        let err = store
            .rebuild(
                AxisDomain::quantitative("Price", 0.0, 10.0),
                AxisDomain::quantitative("Rating", 1.0, 5.0),
                vec![
                    Mark::new(9, "Tea", Point3::origin()),
                    Mark::new(9, "Coffee", Point3::origin()),
                ],
            )
            .unwrap_err();
        assert_eq!(err, SceneError::DuplicateMark { id: 9 });
        assert_eq!(store.generation(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalid_domain_rejected() {
        let err = MarkStore::new(
            VisFrame::identity(),
            AxisDomain::quantitative("Price", 3.0, 3.0),
            AxisDomain::quantitative("Rating", 1.0, 5.0),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::InvalidDomain { .. }));
    }

    #[test]
    fn test_categorical_domain_spans_labels() {
        let domain = AxisDomain::categorical(
            "Aisle",
            vec!["Dairy".to_string(), "Bakery".to_string(), "Produce".to_string()],
        );
        assert!(!domain.is_quantitative());
        assert_eq!(domain.domain_max, 3.0);
        assert!(domain.validate().is_ok());
    }
}
