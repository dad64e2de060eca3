//! Range filter engine.
//!
//! Two handles per axis bound a rectangle in the visualization's local
//! frame. Data marks inside it are eligible for brushing; marks outside are
//! filtered out. Handles are dragged with the controller ray while grabbed;
//! the eligibility recompute runs behind its own rate limiter.

pub mod guides;
pub mod range;

use std::collections::BTreeSet;
use std::time::Duration;

use brushlink_core::{
    AxisDomain, FilterError, LocalBox, MarkId, MarkRegistry, OrientedBox, QueryVolume,
    RateLimiter, Ray, Raycaster, SceneError,
};
use brushlink_settings::FilterSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use guides::{AxisGuide, ParseDirectionError, RangeGuide, TaskThreshold, ThresholdDirection};
pub use range::{approx_eq, normalise, FilterRange, Handle};

/// Visual axis a filter track runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAxisId {
    X,
    Y,
}

impl std::fmt::Display for FilterAxisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterAxisId::X => write!(f, "x"),
            FilterAxisId::Y => write!(f, "y"),
        }
    }
}

/// A single handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleRef {
    pub axis: FilterAxisId,
    pub handle: Handle,
}

impl HandleRef {
    pub const fn new(axis: FilterAxisId, handle: Handle) -> Self {
        Self { axis, handle }
    }

    pub const ALL: [HandleRef; 4] = [
        HandleRef::new(FilterAxisId::X, Handle::Min),
        HandleRef::new(FilterAxisId::X, Handle::Max),
        HandleRef::new(FilterAxisId::Y, Handle::Min),
        HandleRef::new(FilterAxisId::Y, Handle::Max),
    ];
}

impl std::fmt::Display for HandleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.axis, self.handle)
    }
}

/// Domain, handles and task guide for one axis.
#[derive(Debug, Clone)]
pub struct FilterAxis {
    domain: AxisDomain,
    range: FilterRange,
    guide: AxisGuide,
}

impl FilterAxis {
    fn new(domain: AxisDomain, track: (f32, f32)) -> Result<Self, SceneError> {
        domain.validate()?;
        let range = FilterRange::new(&domain.field, track.0, track.1)?;
        Ok(Self {
            domain,
            range,
            guide: AxisGuide::Hidden,
        })
    }

    pub fn domain(&self) -> &AxisDomain {
        &self.domain
    }

    pub fn range(&self) -> &FilterRange {
        &self.range
    }

    pub fn guide(&self) -> &AxisGuide {
        &self.guide
    }

    fn apply_guide(&mut self, thresholds: &[TaskThreshold], spread: f32) {
        self.guide = guides::resolve(&self.domain, &self.range, thresholds, spread);
        self.range.set_threshold(self.guide.threshold());
    }
}

/// Eligibility transitions produced by one recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPass {
    pub newly_ineligible: Vec<MarkId>,
    pub newly_eligible: Vec<MarkId>,
}

impl FilterPass {
    pub fn is_empty(&self) -> bool {
        self.newly_ineligible.is_empty() && self.newly_eligible.is_empty()
    }
}

/// The range filter.
#[derive(Debug)]
pub struct FilterEngine {
    settings: FilterSettings,
    max_ray_distance: f32,
    x: FilterAxis,
    y: FilterAxis,
    grabbed: Option<HandleRef>,
    pending: bool,
    limiter: RateLimiter,
    task: Vec<TaskThreshold>,
}

impl FilterEngine {
    /// Builds the filter for the registry's current axes.
    ///
    /// Tracks are `(start, end)` in visualization-local units: x for the X
    /// track, y for the Y track.
    pub fn new(
        settings: FilterSettings,
        max_ray_distance: f32,
        x_track: (f32, f32),
        y_track: (f32, f32),
        registry: &dyn MarkRegistry,
    ) -> Result<Self, SceneError> {
        let x = FilterAxis::new(registry.x_domain().clone(), x_track)?;
        let y = FilterAxis::new(registry.y_domain().clone(), y_track)?;
        let limiter = RateLimiter::from_rate(settings.update_rate_hz);
        Ok(Self {
            settings,
            max_ray_distance,
            x,
            y,
            grabbed: None,
            pending: false,
            limiter,
            task: Vec::new(),
        })
    }

    pub fn axis(&self, axis: FilterAxisId) -> &FilterAxis {
        match axis {
            FilterAxisId::X => &self.x,
            FilterAxisId::Y => &self.y,
        }
    }

    fn axis_mut(&mut self, axis: FilterAxisId) -> &mut FilterAxis {
        match axis {
            FilterAxisId::X => &mut self.x,
            FilterAxisId::Y => &mut self.y,
        }
    }

    pub fn grabbed(&self) -> Option<HandleRef> {
        self.grabbed
    }

    /// A recompute is queued for the next admitted tick.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn position(&self, handle: HandleRef) -> f32 {
        self.axis(handle.axis).range.position(handle.handle)
    }

    pub fn is_hit_testable(&self, handle: HandleRef) -> bool {
        self.axis(handle.axis).range.is_hit_testable(handle.handle)
    }

    /// Takes hold of a handle.
    pub fn grab(&mut self, handle: HandleRef) -> Result<(), FilterError> {
        if self.grabbed.is_some() {
            return Err(FilterError::AlreadyGrabbed);
        }
        let axis = self.axis(handle.axis);
        if !axis.range.is_hit_testable(handle.handle) {
            return Err(FilterError::HitTestDisabled {
                axis: axis.domain.field.clone(),
                handle: handle.handle.as_str(),
            });
        }
        self.grabbed = Some(handle);
        debug!("Filter handle {} grabbed", handle);
        Ok(())
    }

    /// Lets go of the held handle, if any.
    pub fn release(&mut self) -> Option<HandleRef> {
        let released = self.grabbed.take();
        if let Some(handle) = released {
            debug!("Filter handle {} released", handle);
        }
        released
    }

    /// Places a handle at a track position and queues a recompute.
    pub fn move_handle(&mut self, handle: HandleRef, position: f32) {
        let settings = self.settings.clone();
        let axis = self.axis_mut(handle.axis);
        axis.range.set_raw(handle.handle, position);
        Self::clamp_and_snap(axis, &settings);
        self.pending = true;
    }

    /// Advances the filter by `dt`.
    ///
    /// While a handle is held it follows the ray's hit point. Returns the
    /// eligibility transitions when a queued recompute was admitted.
    pub fn tick(
        &mut self,
        dt: Duration,
        ray: Option<&Ray>,
        raycaster: &dyn Raycaster,
        registry: &mut dyn MarkRegistry,
    ) -> Option<FilterPass> {
        if let Some(handle) = self.grabbed {
            let hit = ray.and_then(|ray| raycaster.raycast(ray, self.max_ray_distance));
            if let Some(hit) = hit {
                let local = registry.frame().to_local(&hit.point);
                let position = match handle.axis {
                    FilterAxisId::X => local.x,
                    FilterAxisId::Y => local.y,
                };
                self.axis_mut(handle.axis).range.set_raw(handle.handle, position);
            }
            let settings = self.settings.clone();
            Self::clamp_and_snap(self.axis_mut(handle.axis), &settings);
            self.pending = true;
        }

        if !self.limiter.tick(dt) || !self.pending {
            return None;
        }

        let settings = self.settings.clone();
        for axis in [&mut self.x, &mut self.y] {
            Self::clamp_and_snap(axis, &settings);
        }
        let pass = self.recompute(registry);
        for axis in [&mut self.x, &mut self.y] {
            axis.range.update_hit_testing(settings.handle_epsilon);
        }
        self.pending = false;
        Some(pass)
    }

    /// The filter rectangle in the visualization's local frame.
    pub fn selection_box(&self) -> LocalBox {
        LocalBox::from_extents(
            self.x.range.min_pos(),
            self.x.range.max_pos(),
            self.y.range.min_pos(),
            self.y.range.max_pos(),
            self.settings.query_half_depth,
        )
    }

    /// Re-derives every data mark's eligibility from the handles.
    pub fn recompute(&mut self, registry: &mut dyn MarkRegistry) -> FilterPass {
        let volume = QueryVolume::Box(OrientedBox::new(registry.frame(), self.selection_box()));
        let inside: BTreeSet<MarkId> = registry.overlap(&volume, false).into_iter().collect();
        let data_marks: Vec<MarkId> = registry
            .list_marks()
            .into_iter()
            .filter(|m| m.data_mark)
            .map(|m| m.id)
            .collect();

        let mut pass = FilterPass::default();
        for id in data_marks {
            let eligible = inside.contains(&id);
            match registry.set_eligible(id, eligible) {
                Some(true) if !eligible => pass.newly_ineligible.push(id),
                Some(false) if eligible => pass.newly_eligible.push(id),
                _ => {}
            }
        }

        if !pass.is_empty() {
            debug!(
                "Filter pass: {} filtered out, {} restored",
                pass.newly_ineligible.len(),
                pass.newly_eligible.len()
            );
        }
        pass
    }

    /// Both axes back to their full range, every mark eligible.
    ///
    /// Returns the marks that were restored.
    pub fn reset_filtering(&mut self, registry: &mut dyn MarkRegistry) -> Vec<MarkId> {
        self.x.range.reset();
        self.y.range.reset();
        self.pending = false;

        let ids: Vec<MarkId> = registry
            .list_marks()
            .into_iter()
            .filter(|m| m.data_mark && !m.eligible)
            .map(|m| m.id)
            .collect();
        for id in &ids {
            registry.set_eligible(*id, true);
        }
        info!("Filtering reset, {} marks restored", ids.len());
        ids
    }

    /// Refreshes the axis descriptors after the visualization changed.
    ///
    /// Guides are re-resolved against the new domains and a recompute runs
    /// on the next tick.
    pub fn on_marks_rebuilt(&mut self, registry: &dyn MarkRegistry) {
        self.x.domain = registry.x_domain().clone();
        self.y.domain = registry.y_domain().clone();
        self.refresh_guides();
        self.pending = true;
        self.limiter.prime();
        debug!(
            "Filter axes now {} / {}",
            self.x.domain.field, self.y.domain.field
        );
    }

    /// Shows guides for the current trial's thresholds.
    pub fn set_task(&mut self, thresholds: Vec<TaskThreshold>) {
        self.task = thresholds;
        self.refresh_guides();
    }

    /// Hides every guide and disables snapping.
    pub fn clear_task(&mut self) {
        self.task.clear();
        self.refresh_guides();
    }

    pub fn task(&self) -> &[TaskThreshold] {
        &self.task
    }

    /// Data value shown next to a handle.
    ///
    /// Empty for categorical axes and for handles resting on their end.
    pub fn label(&self, handle: HandleRef) -> String {
        let axis = self.axis(handle.axis);
        if !axis.domain.is_quantitative()
            || axis.range.at_extreme(handle.handle, self.settings.handle_epsilon)
        {
            return String::new();
        }
        let value =
            axis.range
                .data_value(handle.handle, axis.domain.domain_min, axis.domain.domain_max);
        format!("{:.1}", value)
    }

    /// Whether the handle's guide line is drawn.
    pub fn handle_guide_visible(&self, handle: HandleRef) -> bool {
        self.axis(handle.axis)
            .range
            .guide_visible(handle.handle, self.settings.handle_epsilon)
    }

    /// Whether any handle is off its end.
    pub fn is_active(&self) -> bool {
        let eps = self.settings.handle_epsilon;
        !(self.x.range.is_full(eps) && self.y.range.is_full(eps))
    }

    fn refresh_guides(&mut self) {
        let spread = self.settings.guide_spread;
        self.x.apply_guide(&self.task, spread);
        self.y.apply_guide(&self.task, spread);
    }

    fn clamp_and_snap(axis: &mut FilterAxis, settings: &FilterSettings) {
        axis.range.clamp_and_anchor(settings.handle_epsilon);
        axis.range.snap(
            settings.snap_epsilon,
            settings.handle_epsilon,
            axis.domain.is_quantitative(),
        );
    }
}
