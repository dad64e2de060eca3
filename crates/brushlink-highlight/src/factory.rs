//! Builds highlight strategies keyed on [`HighlightTechnique`].

use brushlink_core::{shared, HighlightTechnique, MarkRegistry, Shared};
use brushlink_settings::HighlightSettings;

use crate::entity::EntityId;
use crate::highlighters::{
    ArrowHighlighter, ArrowTargets, ColorHighlighter, EdgeBundlingRenderer, Highlighter,
    LinkBoard, LinkHighlighter, OutlineHighlighter, SizeHighlighter,
};
use crate::visual::EntityVisual;

/// Strategy factory owning the shared arrow and link adapters.
#[derive(Debug, Clone)]
pub struct HighlighterFactory {
    settings: HighlightSettings,
    arrows: Shared<ArrowTargets>,
    links: Shared<LinkBoard>,
}

impl HighlighterFactory {
    pub fn new(settings: HighlightSettings, bundler: Box<dyn EdgeBundlingRenderer>) -> Self {
        Self {
            settings,
            arrows: shared(ArrowTargets::new()),
            links: shared(LinkBoard::new(bundler)),
        }
    }

    /// Creates and attaches the strategy for `technique`.
    ///
    /// `HighlightTechnique::None` binds nothing.
    pub fn create(
        &self,
        technique: HighlightTechnique,
        entity: EntityId,
        name: &str,
        visual: &mut EntityVisual,
    ) -> Option<Box<dyn Highlighter>> {
        let s = &self.settings;
        match technique {
            HighlightTechnique::None => None,
            HighlightTechnique::Outline => Some(Box::new(OutlineHighlighter::attach(
                visual,
                s.outline_color,
                s.outline_width,
            ))),
            HighlightTechnique::Color => {
                Some(Box::new(ColorHighlighter::attach(visual, s.highlight_color)))
            }
            HighlightTechnique::Size => Some(Box::new(SizeHighlighter::new(s.size_multiplier))),
            HighlightTechnique::Arrow => {
                Some(Box::new(ArrowHighlighter::new(entity, self.arrows.clone())))
            }
            HighlightTechnique::Link => Some(Box::new(LinkHighlighter::new(
                entity,
                name,
                self.links.clone(),
            ))),
        }
    }

    /// Resets the shared adapters after the mark set was rebuilt.
    pub fn marks_changed(&self, registry: &dyn MarkRegistry) {
        self.arrows.borrow_mut().clear();
        self.links.borrow_mut().marks_changed(registry);
    }

    pub fn arrow_targets(&self) -> Shared<ArrowTargets> {
        self.arrows.clone()
    }

    pub fn link_board(&self) -> Shared<LinkBoard> {
        self.links.clone()
    }

    pub fn settings(&self) -> &HighlightSettings {
        &self.settings
    }
}
