//! Highlight strategies.
//!
//! Every strategy implements [`Highlighter`]. `highlight` and `unhighlight`
//! are idempotent, and `unhighlight` undoes everything `highlight` did.
//! `detach` runs right before a binding is dropped and removes whatever the
//! strategy added at attach time.
//!
//! Arrow and link strategies share state across entities through adapter
//! objects ([`ArrowTargets`], [`LinkBoard`]) handed to them by the factory.

mod arrow;
mod color;
mod link;
mod outline;
mod size;

pub use arrow::{ArrowHighlighter, ArrowTargets};
pub use color::ColorHighlighter;
pub use link::{
    BundlerLog, EdgeBundlingRenderer, HeadlessBundler, LinkBoard, LinkEdge, LinkHighlighter,
};
pub use outline::OutlineHighlighter;
pub use size::SizeHighlighter;

use brushlink_core::HighlightTechnique;

use crate::visual::EntityVisual;

/// A per-entity highlight strategy.
pub trait Highlighter: std::fmt::Debug {
    /// The technique this strategy implements.
    fn technique(&self) -> HighlightTechnique;

    fn highlight(&mut self, visual: &mut EntityVisual);

    fn unhighlight(&mut self, visual: &mut EntityVisual);

    fn is_highlighted(&self) -> bool;

    /// Tears the strategy down. The default only unhighlights.
    fn detach(&mut self, visual: &mut EntityVisual) {
        self.unhighlight(visual);
    }
}
