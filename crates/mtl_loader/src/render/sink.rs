//! Renderer sink collaborator

use serde::{Deserialize, Serialize};

use crate::assets::materials::ResolvedMaterial;
use crate::assets::ImageData;
use super::WrapMode;

/// Which faces a material is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Front faces only
    #[default]
    Front,
    /// Back faces only
    Back,
    /// Both faces
    Double,
}

/// Constructs and owns runtime-renderable objects
///
/// Implemented by the renderer. The loader calls it once per material when
/// [`MaterialCreator::realize`](crate::assets::materials::MaterialCreator::realize)
/// runs, passing a texture object only for images that have already arrived.
pub trait RenderSink {
    /// Renderer material object
    type Material;
    /// Renderer texture object
    type Texture;

    /// Build a texture from a decoded, power-of-two image
    fn create_texture(&mut self, image: &ImageData, wrap_s: WrapMode, wrap_t: WrapMode) -> Self::Texture;

    /// Build a material from its resolved description
    fn create_material(&mut self, material: &ResolvedMaterial, map: Option<Self::Texture>) -> Self::Material;
}
