//! Events published by a session and the bus that carries them.
//!
//! Trial loggers, UI feedback and audio cues listen here instead of being
//! called by the engines directly.

mod bus;
mod events;

pub use bus::*;
pub use events::*;
