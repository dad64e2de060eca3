//! Brushing engine.
//!
//! A rate-limited Idle → Brushing → Idle state machine. Each admitted tick
//! repositions the brush, queries the eligible data marks it overlaps,
//! reconciles them into the [`BrushedSet`] under the active
//! [`SelectionMode`] and pushes the resulting names to the entity directory.
//!
//! Box brushes only reposition while brushing; their selection is
//! committed once, on stop.

use std::collections::BTreeSet;
use std::time::Duration;

use brushlink_core::{
    LocalBox, MarkId, MarkRegistry, OrientedBox, QueryVolume, RateLimiter, Rgba, Sphere,
};
use brushlink_highlight::EntityDirectory;
use brushlink_settings::BrushingSettings;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Marks currently brushed. Ordered for stable logging.
pub type BrushedSet = BTreeSet<MarkId>;

/// Shape of the brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    /// Sphere around the brush point.
    #[default]
    Sphere,
    /// Box from the start point to the current point.
    Box,
}

impl std::fmt::Display for BrushMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrushMode::Sphere => write!(f, "Sphere"),
            BrushMode::Box => write!(f, "Box"),
        }
    }
}

/// How a query result combines with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Newly brushed marks join the selection.
    Add,
    /// Newly brushed marks leave the selection.
    Subtract,
    /// The selection is exactly what the brush overlaps.
    #[default]
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushState {
    Idle,
    Brushing,
}

/// Reconciles a query result against the previous selection.
///
/// - `Add`: `old ∪ new`
/// - `Subtract`: `old \ new`
/// - `Free`: `new`
pub fn reconcile(mode: SelectionMode, old: &BrushedSet, new: &BrushedSet) -> BrushedSet {
    let result: BrushedSet = match mode {
        SelectionMode::Add => old.union(new).copied().collect(),
        SelectionMode::Subtract => old.difference(new).copied().collect(),
        SelectionMode::Free => new.clone(),
    };

    match mode {
        SelectionMode::Add => assert!(
            result.is_superset(old) && result.is_superset(new),
            "additive reconcile dropped marks"
        ),
        SelectionMode::Subtract => assert!(
            result.is_subset(old) && result.is_disjoint(new),
            "subtractive reconcile kept brushed marks"
        ),
        SelectionMode::Free => {}
    }
    result
}

/// Where the brush is drawn this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushShape {
    Sphere(Sphere),
    Box(OrientedBox),
}

/// Brush guide shown to the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushVisual {
    pub shape: BrushShape,
    pub color: Rgba,
    pub visible: bool,
}

/// Result of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushTick {
    /// Not brushing.
    Idle,
    /// Brushing, but the rate limiter rejected the tick.
    Throttled,
    /// The brush moved; nothing was committed.
    Repositioned,
    /// The brush moved and the selection was reconciled.
    Reconciled { added: usize, removed: usize },
}

/// The brushing state machine.
#[derive(Debug)]
pub struct BrushingEngine {
    settings: BrushingSettings,
    state: BrushState,
    brush_mode: BrushMode,
    active_mode: BrushMode,
    selection_mode: SelectionMode,
    brush_point: Point3<f32>,
    local_start: Point3<f32>,
    brushed: BrushedSet,
    limiter: RateLimiter,
    visual: Option<BrushVisual>,
}

impl BrushingEngine {
    pub fn new(settings: BrushingSettings) -> Self {
        let limiter = RateLimiter::from_rate(settings.update_rate_hz);
        Self {
            settings,
            state: BrushState::Idle,
            brush_mode: BrushMode::default(),
            active_mode: BrushMode::default(),
            selection_mode: SelectionMode::default(),
            brush_point: Point3::origin(),
            local_start: Point3::origin(),
            brushed: BrushedSet::new(),
            limiter,
            visual: None,
        }
    }

    pub fn state(&self) -> BrushState {
        self.state
    }

    pub fn is_brushing(&self) -> bool {
        self.state == BrushState::Brushing
    }

    pub fn brushed(&self) -> &BrushedSet {
        &self.brushed
    }

    /// Distinct entity names of the brushed marks.
    pub fn brushed_names(&self, registry: &dyn MarkRegistry) -> BTreeSet<String> {
        self.brushed
            .iter()
            .filter_map(|id| registry.mark(*id))
            .map(|mark| mark.entity_name.clone())
            .collect()
    }

    pub fn brush_mode(&self) -> BrushMode {
        self.brush_mode
    }

    /// Shape used by the next brushing session.
    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.brush_mode = mode;
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection_mode = mode;
    }

    pub fn brush_point(&self) -> Point3<f32> {
        self.brush_point
    }

    /// Moves the brush point (world space). Takes effect on the next
    /// admitted tick.
    pub fn set_brush_point(&mut self, point: Point3<f32>) {
        self.brush_point = point;
    }

    pub fn visual(&self) -> Option<&BrushVisual> {
        self.visual.as_ref()
    }

    /// Idle → Brushing. Returns false if already brushing.
    ///
    /// The first tick after starting is always admitted.
    pub fn start(&mut self, registry: &dyn MarkRegistry) -> bool {
        if self.is_brushing() {
            return false;
        }
        self.state = BrushState::Brushing;
        self.active_mode = self.brush_mode;
        if self.active_mode == BrushMode::Box {
            self.local_start = registry.frame().to_local(&self.brush_point);
        }

        let color = match self.selection_mode {
            SelectionMode::Add => self.settings.additive_color,
            SelectionMode::Subtract => self.settings.subtractive_color,
            SelectionMode::Free => self
                .visual
                .map(|v| v.color)
                .unwrap_or(self.settings.additive_color),
        };
        self.visual = Some(BrushVisual {
            shape: self.shape(registry),
            color,
            visible: true,
        });

        self.limiter.reset();
        self.limiter.prime();
        info!(
            "Brushing started ({} brush, {:?} selection)",
            self.active_mode, self.selection_mode
        );
        true
    }

    /// Advances the engine by `dt` of simulated time.
    pub fn tick(
        &mut self,
        dt: Duration,
        registry: &mut dyn MarkRegistry,
        directory: &mut EntityDirectory,
    ) -> BrushTick {
        if !self.is_brushing() {
            return BrushTick::Idle;
        }
        if !self.limiter.tick(dt) {
            return BrushTick::Throttled;
        }

        self.reposition(registry);
        match self.active_mode {
            BrushMode::Sphere => self.commit(registry, directory),
            BrushMode::Box => BrushTick::Repositioned,
        }
    }

    /// Brushing → Idle. Box brushes commit their selection here.
    ///
    /// Returns `None` if not brushing.
    pub fn stop(
        &mut self,
        registry: &mut dyn MarkRegistry,
        directory: &mut EntityDirectory,
    ) -> Option<BrushTick> {
        if !self.is_brushing() {
            return None;
        }

        let outcome = match self.active_mode {
            BrushMode::Box => {
                self.reposition(registry);
                self.commit(registry, directory)
            }
            BrushMode::Sphere => BrushTick::Idle,
        };

        if let Some(visual) = self.visual.as_mut() {
            visual.visible = false;
        }
        self.state = BrushState::Idle;
        info!("Brushing stopped, {} marks brushed", self.brushed.len());
        Some(outcome)
    }

    /// Removes filtered-out marks from the selection.
    ///
    /// Names no longer backed by a brushed mark are unhighlighted. Returns
    /// the number of marks removed.
    pub fn evict(
        &mut self,
        ids: &[MarkId],
        registry: &mut dyn MarkRegistry,
        directory: &mut EntityDirectory,
    ) -> usize {
        let mut removed = 0;
        for id in ids {
            if self.brushed.remove(id) {
                registry.set_brushed(*id, false);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!("Evicted {} filtered marks from the selection", removed);
            directory.sync_to_set(&self.brushed_names(registry));
        }
        removed
    }

    /// Clears the selection and every highlight.
    pub fn remove_all_brushing(
        &mut self,
        registry: &mut dyn MarkRegistry,
        directory: &mut EntityDirectory,
    ) {
        for id in std::mem::take(&mut self.brushed) {
            registry.set_brushed(id, false);
        }
        directory.unhighlight_all();
        debug!("All brushing removed");
    }

    /// Drops selection state that referred to the previous mark set.
    pub fn on_marks_rebuilt(&mut self, registry: &dyn MarkRegistry) {
        if !self.brushed.is_empty() {
            debug!(
                "Discarding {} brushed marks from an older generation",
                self.brushed.len()
            );
        }
        self.brushed.clear();
        if self.is_brushing() {
            self.local_start = registry.frame().to_local(&self.brush_point);
        }
    }

    fn shape(&self, registry: &dyn MarkRegistry) -> BrushShape {
        match self.active_mode {
            BrushMode::Sphere => {
                BrushShape::Sphere(Sphere::new(self.brush_point, self.settings.brush_radius))
            }
            BrushMode::Box => BrushShape::Box(OrientedBox::new(
                registry.frame(),
                self.local_box(registry, self.settings.box_depth / 2.0),
            )),
        }
    }

    fn local_box(&self, registry: &dyn MarkRegistry, half_depth: f32) -> LocalBox {
        let local_now = registry.frame().to_local(&self.brush_point);
        LocalBox::from_corners(&self.local_start, &local_now, half_depth)
    }

    fn reposition(&mut self, registry: &dyn MarkRegistry) {
        let shape = self.shape(registry);
        if let Some(visual) = self.visual.as_mut() {
            visual.shape = shape;
        }
    }

    fn query(&self, registry: &dyn MarkRegistry) -> BrushedSet {
        let volume = match self.active_mode {
            BrushMode::Sphere => {
                QueryVolume::Sphere(Sphere::new(self.brush_point, self.settings.brush_radius))
            }
            BrushMode::Box => QueryVolume::Box(OrientedBox::new(
                registry.frame(),
                self.local_box(registry, self.settings.query_half_depth),
            )),
        };
        registry.overlap(&volume, true).into_iter().collect()
    }

    fn commit(
        &mut self,
        registry: &mut dyn MarkRegistry,
        directory: &mut EntityDirectory,
    ) -> BrushTick {
        let found = self.query(registry);
        let next = reconcile(self.selection_mode, &self.brushed, &found);

        let removed: Vec<MarkId> = self.brushed.difference(&next).copied().collect();
        let added: Vec<MarkId> = next.difference(&self.brushed).copied().collect();
        for id in &removed {
            registry.set_brushed(*id, false);
        }
        for id in &added {
            registry.set_brushed(*id, true);
        }
        self.brushed = next;

        directory.sync_to_set(&self.brushed_names(registry));
        BrushTick::Reconciled {
            added: added.len(),
            removed: removed.len(),
        }
    }
}
