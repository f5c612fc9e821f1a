//! Image decoding and power-of-two normalization for texture data
//!
//! Decoding and resizing go through the [`ImageCodec`] collaborator so the
//! fetch pipeline can be driven by synthetic images in tests. [`RgbaCodec`] is
//! the production codec backed by the `image` crate.

use image::{imageops, ImageFormat, RgbaImage};

use crate::assets::AssetError;

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (typically 4 for RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Load image from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::Decode(format!("Failed to load image from bytes: {}", e)))?;
        
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();
        
        log::debug!("Loaded image {}x{} from memory", width, height);
        
        Ok(Self::from_rgba(rgba_img))
    }

    /// Wrap an already decoded RGBA buffer
    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            channels: 4,
        }
    }
    
    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        
        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }
        
        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }
    
    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
    
    /// Check if both dimensions are powers of two
    pub fn is_power_of_two(&self) -> bool {
        is_power_of_two(self.width) && is_power_of_two(self.height)
    }

    fn to_rgba(&self) -> Result<RgbaImage, AssetError> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            AssetError::InvalidData(format!(
                "{} bytes do not form a {}x{} RGBA image",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }
}

/// Bit test used by GPU upload paths; zero counts as a power of two
pub const fn is_power_of_two(x: u32) -> bool {
    x & x.wrapping_sub(1) == 0
}

/// Smallest power of two that is `>= x`
///
/// Smears the highest set bit of `x - 1` into every lower bit, then adds one.
pub const fn next_power_of_two(x: u32) -> u32 {
    let mut x = x.wrapping_sub(1);
    x |= x >> 1;
    x |= x >> 2;
    x |= x >> 4;
    x |= x >> 8;
    x |= x >> 16;
    x.wrapping_add(1)
}

/// Image decode/resize collaborator
pub trait ImageCodec: Send + Sync {
    /// Decode raw image bytes
    fn decode(&self, bytes: &[u8]) -> Result<ImageData, AssetError>;

    /// Decode a GPU-compressed container (DDS)
    fn decode_compressed(&self, bytes: &[u8]) -> Result<ImageData, AssetError>;

    /// Redraw `image` into a `width` x `height` canvas anchored at the origin
    fn resize(&self, image: &ImageData, width: u32, height: u32) -> Result<ImageData, AssetError>;
}

/// Codec backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbaCodec;

impl ImageCodec for RgbaCodec {
    fn decode(&self, bytes: &[u8]) -> Result<ImageData, AssetError> {
        ImageData::from_bytes(bytes)
    }

    fn decode_compressed(&self, bytes: &[u8]) -> Result<ImageData, AssetError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Dds)
            .map_err(|e| AssetError::Decode(format!("Failed to load DDS texture: {}", e)))?;
        Ok(ImageData::from_rgba(img.to_rgba8()))
    }

    fn resize(&self, image: &ImageData, width: u32, height: u32) -> Result<ImageData, AssetError> {
        let source = image.to_rgba()?;
        let resized = imageops::resize(&source, width, height, imageops::FilterType::Triangle);
        Ok(ImageData::from_rgba(resized))
    }
}

/// Return `image` untouched if both sides are powers of two, otherwise redraw
/// it at the next power of two on each axis
pub fn ensure_power_of_two(codec: &dyn ImageCodec, image: ImageData) -> Result<ImageData, AssetError> {
    if image.is_power_of_two() {
        return Ok(image);
    }

    let width = next_power_of_two(image.width);
    let height = next_power_of_two(image.height);
    log::debug!(
        "Resizing texture {}x{} -> {}x{}",
        image.width, image.height, width, height
    );
    codec.resize(&image, width, height)
}
