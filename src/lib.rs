//! # Brushlink
//!
//! Brushing, range filtering and linked highlighting for immersive
//! visualizations whose marks stand for physical entities (products on a
//! shelf, exhibits in a room).
//!
//! ## Architecture
//!
//! Brushlink is organized as a workspace with multiple crates:
//!
//! 1. **brushlink-core** - Marks, geometry, rate limiting, errors, events
//! 2. **brushlink-settings** - Configuration loading, saving and validation
//! 3. **brushlink-highlight** - Entity directory and highlight strategies
//! 4. **brushlink-interaction** - Brushing engine, range filter, controller input
//! 5. **brushlink-session** - The [`Session`] composition root
//! 6. **brushlink** - This facade and a headless demo
//!
//! ## Features
//!
//! - **Brushing**: sphere and box brushes with add, subtract and free selection
//! - **Range filtering**: two-handle filters per axis with snapping and task guides
//! - **Linking**: outline, recolor, size, arrow and link highlight strategies
//! - **Simulated time**: every rate limit runs on tick deltas, no wall clock

pub use brushlink_core::{
    AppEvent, AxisDomain, AxisKind, EventBus, EventBusConfig, EventCategory, EventFilter,
    FilterError, Handedness, HighlightTechnique, InteractionEvent, InteractionKind, Mark, MarkId,
    MarkRegistry, MarkStore, Quad, Ray, Rgba, SceneColliders, SceneError, SelectionEvent,
    SurfaceTag, VisEvent, VisFrame,
};

pub use brushlink_highlight::{
    EntityDirectory, EntityId, EntityVisual, HeadlessBundler, Material, MeshRenderer,
};

pub use brushlink_interaction::{
    BrushCommand, BrushMode, BrushTick, BrushingEngine, ControllerState, FilterAxisId,
    FilterEngine, Handle, HandleRef, InputFrame, SelectionMode, TaskThreshold,
    ThresholdDirection,
};

pub use brushlink_settings::{Config, SettingsError};

pub use brushlink_session::{SceneSetup, Session, SessionError, TickReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, INFO by default
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
