use brushlink_core::HighlightTechnique;
use nalgebra::Vector3;

use super::Highlighter;
use crate::visual::EntityVisual;

/// Scales the entity by a fixed multiplier.
///
/// Entities are unit-scaled at rest, so unhighlight writes back unit scale
/// rather than remembering the previous value.
#[derive(Debug)]
pub struct SizeHighlighter {
    multiplier: f32,
    highlighted: bool,
}

impl SizeHighlighter {
    pub fn new(multiplier: f32) -> Self {
        Self {
            multiplier,
            highlighted: false,
        }
    }
}

impl Highlighter for SizeHighlighter {
    fn technique(&self) -> HighlightTechnique {
        HighlightTechnique::Size
    }

    fn highlight(&mut self, visual: &mut EntityVisual) {
        visual.scale = Vector3::repeat(self.multiplier);
        self.highlighted = true;
    }

    fn unhighlight(&mut self, visual: &mut EntityVisual) {
        visual.scale = Vector3::repeat(1.0);
        self.highlighted = false;
    }

    fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}
