//! Render state of one entity as the highlight strategies see it.
//!
//! This is the observable surface the strategies mutate: material slots per
//! renderer, the local scale and an optional outline effect. A rendering
//! backend mirrors it onto real scene objects.

use brushlink_core::Rgba;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A material bound to one renderer slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub color: Rgba,
    /// Ignores scene lighting.
    pub unlit: bool,
}

impl Material {
    pub fn lit(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            name: name.into(),
            color,
            unlit: false,
        }
    }

    pub fn unlit(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            name: name.into(),
            color,
            unlit: true,
        }
    }
}

/// One mesh renderer with its material slots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshRenderer {
    pub materials: Vec<Material>,
}

impl MeshRenderer {
    pub fn new(materials: Vec<Material>) -> Self {
        Self { materials }
    }

    pub fn slot_count(&self) -> usize {
        self.materials.len()
    }
}

/// Outline render effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlineEffect {
    pub enabled: bool,
    pub color: Rgba,
    pub width: f32,
}

/// Everything a highlight strategy may touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityVisual {
    pub renderers: Vec<MeshRenderer>,
    pub scale: Vector3<f32>,
    pub outline: Option<OutlineEffect>,
}

impl EntityVisual {
    pub fn new(renderers: Vec<MeshRenderer>) -> Self {
        Self {
            renderers,
            scale: Vector3::repeat(1.0),
            outline: None,
        }
    }

    /// A single renderer with a single material, handy for simple props.
    pub fn single(material: Material) -> Self {
        Self::new(vec![MeshRenderer::new(vec![material])])
    }

    pub fn is_unit_scale(&self) -> bool {
        self.scale == Vector3::repeat(1.0)
    }

    pub fn outline_enabled(&self) -> bool {
        self.outline.is_some_and(|o| o.enabled)
    }
}

impl Default for EntityVisual {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
