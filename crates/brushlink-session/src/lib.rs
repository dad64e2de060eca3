//! # Brushlink Session
//!
//! The composition root: one [`Session`] owns the mark registry, the entity
//! directory, both engines and the input adapter, and publishes what happens
//! on an injected event bus.

pub mod session;

pub use session::{SceneSetup, Session, SessionError, TickReport};
