//! Small value types shared by the settings and engine crates.

use serde::{Deserialize, Serialize};

/// Linear RGBA colour, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const YELLOW: Rgba = Rgba::new(1.0, 1.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// True when every component lies in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// How highlighted entities are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightTechnique {
    /// No visual change.
    #[default]
    None,
    /// Swap in a flat highlight material.
    Color,
    /// Enable an outline effect.
    Outline,
    /// Draw a bundled link from the entity to its mark.
    Link,
    /// Point an off-screen indicator at the entity.
    Arrow,
    /// Scale the entity up.
    Size,
}

impl HighlightTechnique {
    pub const ALL: [HighlightTechnique; 6] = [
        HighlightTechnique::None,
        HighlightTechnique::Color,
        HighlightTechnique::Outline,
        HighlightTechnique::Link,
        HighlightTechnique::Arrow,
        HighlightTechnique::Size,
    ];
}

impl std::fmt::Display for HighlightTechnique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Color => write!(f, "Color"),
            Self::Outline => write!(f, "Outline"),
            Self::Link => write!(f, "Link"),
            Self::Arrow => write!(f, "Arrow"),
            Self::Size => write!(f, "Size"),
        }
    }
}

impl std::str::FromStr for HighlightTechnique {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HighlightTechnique::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown highlight technique '{}'", s))
    }
}

/// Which hand holds the brushing controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handedness::Left => write!(f, "Left"),
            Handedness::Right => write!(f, "Right"),
        }
    }
}
