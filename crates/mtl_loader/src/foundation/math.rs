//! Math utilities and types
//!
//! Colors in material files are plain RGB triples, so a 3-component vector is
//! all the math this crate needs.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// RGB color triple
pub type Color = Vec3;

/// Scale every channel of a 0-255 color into the 0-1 range
pub fn normalize_rgb(color: &Color) -> Color {
    color / 255.0
}
