//! # MTL Loader
//!
//! Loads Wavefront MTL material descriptions for 3D thumbnails and resolves
//! them into renderer-ready materials. Diffuse textures are referenced by
//! content hash, served from a sharded CDN, and fetched in the background
//! with bounded retry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mtl_loader::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), AssetError> {
//!     let loader = MtlLoader::new(LoaderConfig::default());
//!     let mut creator = loader.load("https://t0.rbxcdn.com/0123456789abcdef0123456789abcdef").await?;
//!
//!     let (materials, lookup) = creator.get_all();
//!     for material in materials {
//!         println!("{} -> {}", material.name, lookup[&material.name]);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;

/// Common imports for loader users
pub mod prelude {
    pub use crate::{
        foundation::math::{Color, Vec3},
        config::{Config, ConfigError, ConfigFormat, FetchConfig, LoaderConfig, MaterialOptions},
        assets::{
            AssetError, HashSharder, ImageCodec, ImageData, RgbaCodec,
            Transport, TransportError, CancellationToken, FetchCallbacks, FetchError, TextureFetcher,
            MtlParser, MaterialCreator, MaterialEntry, ResolvedMaterial, MtlLoader,
        },
        render::{RenderSink, Side, Texture, TextureState, WrapMode},
    };

    #[cfg(feature = "http")]
    pub use crate::assets::HttpTransport;
}
