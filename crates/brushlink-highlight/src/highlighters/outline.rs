use brushlink_core::{HighlightTechnique, Rgba};

use super::Highlighter;
use crate::visual::{EntityVisual, OutlineEffect};

/// Toggles an outline effect added when the strategy is attached.
#[derive(Debug)]
pub struct OutlineHighlighter {
    highlighted: bool,
}

impl OutlineHighlighter {
    /// Adds a disabled outline effect to `visual`.
    pub fn attach(visual: &mut EntityVisual, color: Rgba, width: f32) -> Self {
        visual.outline = Some(OutlineEffect {
            enabled: false,
            color,
            width,
        });
        Self { highlighted: false }
    }
}

impl Highlighter for OutlineHighlighter {
    fn technique(&self) -> HighlightTechnique {
        HighlightTechnique::Outline
    }

    fn highlight(&mut self, visual: &mut EntityVisual) {
        if self.highlighted {
            return;
        }
        if let Some(outline) = visual.outline.as_mut() {
            outline.enabled = true;
        }
        self.highlighted = true;
    }

    fn unhighlight(&mut self, visual: &mut EntityVisual) {
        if !self.highlighted {
            return;
        }
        if let Some(outline) = visual.outline.as_mut() {
            outline.enabled = false;
        }
        self.highlighted = false;
    }

    fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    fn detach(&mut self, visual: &mut EntityVisual) {
        self.unhighlight(visual);
        visual.outline = None;
    }
}
