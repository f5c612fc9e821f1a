//! Renderer-facing vocabulary
//!
//! The loader never owns GPU objects. It produces material descriptions and
//! texture placeholders, and hands them to a [`RenderSink`] supplied by the
//! renderer that actually draws them.

pub mod texture;
pub mod sink;

pub use texture::{Texture, TextureState, WrapMode};
pub use sink::{RenderSink, Side};
