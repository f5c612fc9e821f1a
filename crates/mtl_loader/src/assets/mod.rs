//! Asset loading: MTL text, CDN-hosted texture binaries, and the
//! collaborators used to fetch and decode them

pub mod cdn;
pub mod image_loader;
pub mod transport;
pub mod texture_fetcher;
pub mod materials;

#[cfg(test)]
pub(crate) mod test_support;

pub use cdn::HashSharder;
pub use image_loader::{ImageCodec, ImageData, RgbaCodec};
pub use transport::{Transport, TransportError};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use texture_fetcher::{CancellationToken, FetchCallbacks, FetchError, FetchState, TextureFetcher};
pub use materials::{
    MtlParser, MaterialMap, MaterialRecord, RawMaterial, NormalizedMaterial, DirectiveValue,
    MaterialNormalizer,
    MaterialResolver, ResolvedMaterial,
    MaterialCreator, MaterialEntry,
    MtlLoader,
};

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),
    
    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),
    
    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    /// Unsupported asset format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Transport failed to deliver the bytes
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Image bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
    
    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
