//! # Brushlink Interaction
//!
//! The two tick-driven engines and the controller adapter feeding them:
//!
//! - [`BrushingEngine`]: sphere or box brushing with add/subtract/free
//!   selection
//! - [`FilterEngine`]: two-handle range filters on the X and Y axes
//! - [`BrushInputAdapter`]: trigger and ray input to brush commands

pub mod brushing;
pub mod filter;
pub mod input;

pub use brushing::{
    reconcile, BrushMode, BrushShape, BrushState, BrushTick, BrushVisual, BrushedSet,
    BrushingEngine, SelectionMode,
};
pub use filter::{
    AxisGuide, FilterAxis, FilterAxisId, FilterEngine, FilterPass, FilterRange, Handle,
    HandleRef, RangeGuide, TaskThreshold, ThresholdDirection,
};
pub use input::{BrushCommand, BrushInputAdapter, ControllerState, InputFrame};
