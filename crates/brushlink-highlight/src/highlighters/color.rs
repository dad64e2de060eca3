use brushlink_core::{HighlightTechnique, Rgba};

use super::Highlighter;
use crate::visual::{EntityVisual, Material};

const HIGHLIGHT_MATERIAL: &str = "ColourUnlit";

/// Swaps every material slot for a flat unlit highlight material.
///
/// The original materials are cached once when the strategy is attached and
/// written back verbatim on unhighlight.
#[derive(Debug)]
pub struct ColorHighlighter {
    original: Vec<Vec<Material>>,
    replacement: Vec<Vec<Material>>,
    highlighted: bool,
}

impl ColorHighlighter {
    pub fn attach(visual: &EntityVisual, highlight_color: Rgba) -> Self {
        let original: Vec<Vec<Material>> = visual
            .renderers
            .iter()
            .map(|renderer| renderer.materials.clone())
            .collect();
        let material = Material::unlit(HIGHLIGHT_MATERIAL, highlight_color);
        let replacement = original
            .iter()
            .map(|slots| vec![material.clone(); slots.len()])
            .collect();

        Self {
            original,
            replacement,
            highlighted: false,
        }
    }

    fn assign(visual: &mut EntityVisual, sets: &[Vec<Material>]) {
        for (renderer, materials) in visual.renderers.iter_mut().zip(sets) {
            renderer.materials = materials.clone();
        }
    }
}

impl Highlighter for ColorHighlighter {
    fn technique(&self) -> HighlightTechnique {
        HighlightTechnique::Color
    }

    fn highlight(&mut self, visual: &mut EntityVisual) {
        if !self.highlighted {
            Self::assign(visual, &self.replacement);
            self.highlighted = true;
        }
    }

    fn unhighlight(&mut self, visual: &mut EntityVisual) {
        if self.highlighted {
            Self::assign(visual, &self.original);
            self.highlighted = false;
        }
    }

    fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}
