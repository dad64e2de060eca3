//! Session: the composition root.
//!
//! Owns the mark registry, the entity directory, both engines, the input
//! adapter and the colliders, and wires them together explicitly. Each
//! [`Session::tick`] runs, in order: filter tick, eviction of newly
//! filtered marks, controller input, brushing tick. Filter eligibility is
//! therefore settled before the brush reads it.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use brushlink_core::{
    AppEvent, AxisDomain, EventBus, FilterError, Handedness, HighlightTechnique,
    InteractionEvent, InteractionKind, Mark, MarkRegistry, MarkStore, SceneColliders,
    SceneError, SelectionEvent, VisEvent,
};
use brushlink_highlight::{
    EdgeBundlingRenderer, EntityDirectory, EntityId, EntityVisual, HeadlessBundler,
    HighlighterFactory,
};
use brushlink_interaction::{
    BrushCommand, BrushInputAdapter, BrushMode, BrushTick, BrushingEngine, FilterEngine,
    FilterPass, HandleRef, InputFrame, SelectionMode, TaskThreshold,
};
use brushlink_settings::{Config, SettingsError};
use thiserror::Error;
use tracing::{debug, info};

/// Failure to assemble a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Everything the scene provides up front.
#[derive(Debug)]
pub struct SceneSetup {
    /// The visualization's marks and axes.
    pub marks: MarkStore,
    /// Raw scene names and render state of every entity.
    pub entities: Vec<(String, EntityVisual)>,
    /// Surfaces the controller ray can hit.
    pub colliders: SceneColliders,
    /// X filter track, in visualization-local x.
    pub x_track: (f32, f32),
    /// Y filter track, in visualization-local y.
    pub y_track: (f32, f32),
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub filter: Option<FilterPass>,
    pub evicted: usize,
    pub commands: Vec<BrushCommand>,
    pub brush: Option<BrushTick>,
}

/// A running brushing-and-linking session.
pub struct Session {
    config: Config,
    registry: MarkStore,
    directory: EntityDirectory,
    brushing: BrushingEngine,
    filter: FilterEngine,
    input: BrushInputAdapter,
    colliders: SceneColliders,
    bus: Arc<EventBus>,
    elapsed: Duration,
    last_names: BTreeSet<String>,
}

impl Session {
    /// Builds a session with a headless link renderer.
    pub fn new(config: Config, scene: SceneSetup, bus: Arc<EventBus>) -> Result<Self, SessionError> {
        Self::with_renderer(config, scene, bus, Box::new(HeadlessBundler::new()))
    }

    /// Builds a session drawing link edges with `renderer`.
    pub fn with_renderer(
        config: Config,
        scene: SceneSetup,
        bus: Arc<EventBus>,
        renderer: Box<dyn EdgeBundlingRenderer>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let SceneSetup {
            marks,
            entities,
            colliders,
            x_track,
            y_track,
        } = scene;

        let factory = HighlighterFactory::new(config.highlight.clone(), renderer);
        let mut directory = EntityDirectory::new(factory, config.highlight.technique);
        for (raw_name, visual) in entities {
            directory.add_entity(&raw_name, visual)?;
        }
        directory.rebuild();
        directory.marks_changed(&marks);

        let filter = FilterEngine::new(
            config.filter.clone(),
            config.input.max_ray_distance,
            x_track,
            y_track,
            &marks,
        )?;
        let brushing = BrushingEngine::new(config.brushing.clone());
        let input = BrushInputAdapter::new(&config.input);

        info!(
            "Session ready: {} marks, {} entity names, {} technique",
            marks.len(),
            directory.names().count(),
            directory.technique()
        );

        Ok(Self {
            config,
            registry: marks,
            directory,
            brushing,
            filter,
            input,
            colliders,
            bus,
            elapsed: Duration::ZERO,
            last_names: BTreeSet::new(),
        })
    }

    /// Advances the session by `dt` with this frame's controller input.
    pub fn tick(&mut self, dt: Duration, frame: &InputFrame) -> TickReport {
        self.elapsed += dt;
        let mut report = TickReport::default();

        let ray = frame.controller(self.input.handedness()).ray;
        report.filter = self
            .filter
            .tick(dt, ray.as_ref(), &self.colliders, &mut self.registry);

        if let Some(pass) = &report.filter {
            report.evicted = self.brushing.evict(
                &pass.newly_ineligible,
                &mut self.registry,
                &mut self.directory,
            );
            if report.evicted > 0 {
                self.publish(AppEvent::Selection(SelectionEvent::Evicted {
                    count: report.evicted,
                }));
            }
        }

        report.commands = self.input.update(frame, &self.colliders);
        for command in report.commands.clone() {
            match command {
                BrushCommand::MoveBrushPoint(point) => self.brushing.set_brush_point(point),
                BrushCommand::Start(mode) => {
                    self.begin_brushing(mode);
                }
                BrushCommand::Stop => {
                    self.end_brushing();
                }
            }
        }

        let brush = self
            .brushing
            .tick(dt, &mut self.registry, &mut self.directory);
        if brush != BrushTick::Idle {
            report.brush = Some(brush);
        }

        self.publish_names();
        report
    }

    /// Starts brushing in `mode` from the current brush point.
    pub fn start_brushing(&mut self, mode: SelectionMode) -> bool {
        self.begin_brushing(mode)
    }

    /// Stops brushing, committing a box selection.
    ///
    /// A trigger still held does not restart the brush until released.
    pub fn stop_brushing(&mut self) -> bool {
        self.input.interrupt();
        let stopped = self.end_brushing();
        self.publish_names();
        stopped
    }

    /// Moves the brush point (world space).
    pub fn set_brush_point(&mut self, point: nalgebra::Point3<f32>) {
        self.brushing.set_brush_point(point);
    }

    /// Clears the selection and every highlight.
    pub fn remove_all_brushing(&mut self) {
        self.brushing
            .remove_all_brushing(&mut self.registry, &mut self.directory);
        self.publish(AppEvent::Selection(SelectionEvent::Cleared));
        self.last_names.clear();
    }

    /// Both filter axes back to the full domain; every mark eligible.
    pub fn reset_filtering(&mut self) {
        self.filter.reset_filtering(&mut self.registry);
        self.publish(AppEvent::Vis(VisEvent::FilterReset));
    }

    /// Returns the scene to a clean state between trials.
    ///
    /// Any running brush is stopped, the selection and highlights are
    /// cleared, filters are reset and the shared highlight adapters are
    /// emptied.
    pub fn reset_trial(&mut self) {
        if self.brushing.is_brushing() {
            self.stop_brushing();
        }
        self.remove_all_brushing();
        self.directory.unhighlight_all();
        self.reset_filtering();
        self.directory.marks_changed(&self.registry);
        self.filter.clear_task();
        info!("Trial state reset");
    }

    /// Shows the task guides for a new trial.
    pub fn begin_task(&mut self, thresholds: Vec<TaskThreshold>) {
        debug!("Task with {} thresholds", thresholds.len());
        self.filter.set_task(thresholds);
    }

    /// Switches every entity to `technique`, clearing the selection first.
    pub fn set_highlight_technique(&mut self, technique: HighlightTechnique) {
        if technique == self.directory.technique() {
            return;
        }
        self.remove_all_brushing();
        self.directory.set_technique_all(technique);
    }

    pub fn set_handedness(&mut self, handedness: Handedness) {
        if self.brushing.is_brushing() {
            self.stop_brushing();
        }
        self.input.set_handedness(handedness);
        info!("Handedness set to {}", handedness);
    }

    /// Shape used by the next brushing session.
    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        if mode == self.brushing.brush_mode() {
            return;
        }
        self.brushing.set_brush_mode(mode);
        self.interaction(InteractionKind::BrushChange, mode.to_string());
    }

    /// Takes hold of a filter handle.
    pub fn grab_filter_handle(&mut self, handle: HandleRef) -> Result<(), FilterError> {
        self.filter.grab(handle)?;
        self.interaction(InteractionKind::Filter, "Start");
        Ok(())
    }

    /// Lets go of the held filter handle.
    pub fn release_filter_handle(&mut self) -> Option<HandleRef> {
        let released = self.filter.release()?;
        self.interaction(InteractionKind::Filter, "End");
        Some(released)
    }

    /// Records that the participant picked an entity as their answer.
    ///
    /// Returns false if no entity has that name.
    pub fn record_selection(&mut self, name: &str) -> bool {
        if !self.directory.contains(name) {
            return false;
        }
        self.interaction(InteractionKind::ProductSelect, name);
        true
    }

    /// Replaces the mark set after a data or encoding change.
    ///
    /// The old selection is dropped, the filter re-reads the axes and
    /// recomputes on its next tick, and the link lookup is rebuilt.
    pub fn rebuild_visualization(
        &mut self,
        x_domain: AxisDomain,
        y_domain: AxisDomain,
        marks: Vec<Mark>,
    ) -> Result<u64, SceneError> {
        let fields_changed = x_domain.field != self.registry.x_domain().field
            || y_domain.field != self.registry.y_domain().field;
        let dimensions = format!("{} / {}", x_domain.field, y_domain.field);

        let generation = self.registry.rebuild(x_domain, y_domain, marks)?;
        self.brushing.remove_all_brushing(&mut self.registry, &mut self.directory);
        self.brushing.on_marks_rebuilt(&self.registry);
        self.filter.on_marks_rebuilt(&self.registry);
        self.directory.marks_changed(&self.registry);
        self.publish_names();

        if fields_changed {
            self.interaction(InteractionKind::DimensionChange, dimensions);
        }
        self.publish(AppEvent::Vis(VisEvent::MarksRebuilt {
            generation,
            mark_count: self.registry.len(),
        }));
        Ok(generation)
    }

    /// Shows and hides entities (layout switch) and re-indexes names.
    ///
    /// Brushed names still present are highlighted again.
    pub fn switch_layout(&mut self, visibility: &[(EntityId, bool)]) -> usize {
        for (id, active) in visibility {
            self.directory.set_entity_active(*id, *active);
        }
        let name_count = self.directory.rebuild();
        let names = self.brushing.brushed_names(&self.registry);
        self.directory.sync_to_set(&names);
        self.publish(AppEvent::Vis(VisEvent::EntitiesRebuilt { name_count }));
        name_count
    }

    /// Distinct names of the brushed marks.
    pub fn currently_brushed_names(&self) -> BTreeSet<String> {
        self.brushing.brushed_names(&self.registry)
    }

    /// Simulated time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &MarkStore {
        &self.registry
    }

    pub fn directory(&self) -> &EntityDirectory {
        &self.directory
    }

    pub fn brushing(&self) -> &BrushingEngine {
        &self.brushing
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    /// Direct handle placement, bypassing the controller ray.
    pub fn move_filter_handle(&mut self, handle: HandleRef, position: f32) {
        self.filter.move_handle(handle, position);
    }

    pub fn input(&self) -> &BrushInputAdapter {
        &self.input
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    fn begin_brushing(&mut self, mode: SelectionMode) -> bool {
        self.brushing.set_selection_mode(mode);
        let started = self.brushing.start(&self.registry);
        if started {
            self.interaction(InteractionKind::Brushing, "Start");
        }
        started
    }

    fn end_brushing(&mut self) -> bool {
        let stopped = self
            .brushing
            .stop(&mut self.registry, &mut self.directory)
            .is_some();
        if stopped {
            self.interaction(InteractionKind::Brushing, "End");
        }
        stopped
    }

    fn publish_names(&mut self) {
        let names = self.directory.highlighted_names();
        if names != self.last_names {
            self.publish(AppEvent::Selection(SelectionEvent::NamesChanged {
                names: names.iter().cloned().collect(),
            }));
            self.last_names = names;
        }
    }

    fn interaction(&self, kind: InteractionKind, comment: impl Into<String>) {
        let event = InteractionEvent::new(kind, comment, self.elapsed.as_secs_f64());
        self.publish(AppEvent::Interaction(event));
    }

    fn publish(&self, event: AppEvent) {
        debug!("{}", event.description());
        self.bus.publish(event);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("elapsed", &self.elapsed)
            .field("marks", &self.registry.len())
            .field("brushing", &self.brushing.state())
            .field("filter_grabbed", &self.filter.grabbed())
            .finish()
    }
}
