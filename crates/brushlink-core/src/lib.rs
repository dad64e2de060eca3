//! # Brushlink Core
//!
//! Core types, geometry and utilities for Brushlink.
//! Provides the mark registry the engines query, spatial primitives,
//! simulated-time rate limiting, errors and the event bus.

pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod marks;
pub mod timing;
pub mod types;

pub use error::{FilterError, SceneError};

pub use geometry::{
    LocalBox, OrientedBox, Quad, QueryVolume, Ray, RayHit, Raycaster, SceneColliders, Sphere,
    SurfaceTag, VisFrame,
};

pub use marks::{AxisDomain, AxisKind, Mark, MarkId, MarkRegistry, MarkStore};

pub use timing::RateLimiter;

// Re-export event bus for convenience
pub use event_bus::{
    AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    InteractionEvent, InteractionKind, SelectionEvent, SubscriptionId, VisEvent,
};

// Re-export type aliases for convenience
pub use types::{shared, Handedness, HighlightTechnique, Rgba, Shared};
