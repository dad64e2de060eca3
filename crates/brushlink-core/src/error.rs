//! Error handling for Brushlink
//!
//! Only wiring and configuration problems are errors. Lookup misses
//! (unknown names) and geometry misses (a ray that hits nothing) are logged
//! and treated as "nothing to do this tick"; invariant violations are
//! assertions.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Scene wiring error type
///
/// Raised while assembling a session. None of these are recoverable at
/// runtime; the composition root reports them and refuses to start.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// An axis descriptor has an empty or inverted domain
    #[error("Invalid domain for axis {axis}: [{min}, {max}]")]
    InvalidDomain {
        /// The axis name.
        axis: String,
        /// The lower bound supplied.
        min: f32,
        /// The upper bound supplied.
        max: f32,
    },

    /// A filter track has zero or negative length
    #[error("Invalid track for axis {axis}: [{start}, {end}]")]
    InvalidTrack {
        /// The axis name.
        axis: String,
        /// Track start in visualization-local units.
        start: f32,
        /// Track end in visualization-local units.
        end: f32,
    },

    /// Two marks were registered with the same id
    #[error("Duplicate mark id {id}")]
    DuplicateMark {
        /// The duplicated id.
        id: u32,
    },

    /// An entity was registered with a name that normalises to nothing
    #[error("Entity name '{raw}' is empty after normalisation")]
    EmptyEntityName {
        /// The raw scene name.
        raw: String,
    },
}

/// Filter handle error type
///
/// Returned by grab requests the range filter refuses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The handle is occluded by its partner and hit-testing is disabled
    #[error("The {handle} handle on axis {axis} is not hit-testable")]
    HitTestDisabled {
        /// The axis name.
        axis: String,
        /// "min" or "max".
        handle: &'static str,
    },

    /// Another handle is already held
    #[error("A filter handle is already grabbed")]
    AlreadyGrabbed,
}
