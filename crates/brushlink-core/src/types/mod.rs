//! Type system utilities and aliases.
//!
//! - [`aliases`]: Type aliases for the single-threaded shared state the tick
//!   pipeline passes around.
//! - [`common`]: Colours, highlight techniques and handedness.

pub mod aliases;
pub mod common;

pub use aliases::*;
pub use common::*;
