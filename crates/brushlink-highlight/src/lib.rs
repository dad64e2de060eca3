//! # Brushlink Highlight
//!
//! Name-scoped highlighting of scene entities.
//!
//! The [`EntityDirectory`] groups entities by logical name and keeps one
//! highlight flag per name. Each entity carries one strategy built by the
//! [`HighlighterFactory`]; strategies that share state across entities
//! (arrow targets, link edges) get it from adapters the factory owns.

pub mod directory;
pub mod entity;
pub mod factory;
pub mod highlighters;
pub mod visual;

pub use directory::{EntityDirectory, HighlightStats};
pub use entity::{normalize_entity_name, Entity, EntityId};
pub use factory::HighlighterFactory;
pub use highlighters::{
    ArrowHighlighter, ArrowTargets, BundlerLog, ColorHighlighter, EdgeBundlingRenderer,
    HeadlessBundler, Highlighter, LinkBoard, LinkEdge, LinkHighlighter, OutlineHighlighter,
    SizeHighlighter,
};
pub use visual::{EntityVisual, Material, MeshRenderer, OutlineEffect};
