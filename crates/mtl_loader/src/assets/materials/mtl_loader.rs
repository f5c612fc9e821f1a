//! MTL loading entry point
//!
//! Fetches material text through the byte transport (or reads it from disk),
//! parses it and hands back a [`MaterialCreator`] wired to the loader's
//! texture fetcher.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::assets::image_loader::ImageCodec;
use crate::assets::texture_fetcher::TextureFetcher;
use crate::assets::transport::Transport;
use crate::assets::AssetError;
use crate::config::LoaderConfig;
use super::material_creator::MaterialCreator;
use super::mtl_parser::MtlParser;

/// Loads MTL files into [`MaterialCreator`]s
#[derive(Clone)]
pub struct MtlLoader {
    transport: Arc<dyn Transport>,
    codec: Arc<dyn ImageCodec>,
    config: LoaderConfig,
}

impl MtlLoader {
    /// Loader over HTTP with the `image`-backed codec
    #[cfg(feature = "http")]
    pub fn new(config: LoaderConfig) -> Self {
        use crate::assets::image_loader::RgbaCodec;
        use crate::assets::transport::HttpTransport;

        Self::with_collaborators(Arc::new(HttpTransport), Arc::new(RgbaCodec), config)
    }

    /// Loader over caller-supplied collaborators
    pub fn with_collaborators(transport: Arc<dyn Transport>, codec: Arc<dyn ImageCodec>, config: LoaderConfig) -> Self {
        Self { transport, codec, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    fn fetcher(&self) -> TextureFetcher {
        TextureFetcher::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.codec),
            self.config.fetch.clone(),
        )
    }

    /// Fetch and parse the MTL file at `url`
    ///
    /// The MTL request itself is not retried; a transport failure is returned
    /// as [`AssetError::Transport`]. Invalid UTF-8 is replaced, not rejected.
    pub async fn load(&self, url: &str) -> Result<MaterialCreator, AssetError> {
        log::info!("Loading materials from {}", url);
        let bytes = self.transport.get(url).await?;
        Ok(self.parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Parse MTL text that is already in memory
    pub fn parse(&self, text: &str) -> MaterialCreator {
        let materials = MtlParser::parse(text);
        log::debug!("Parsed {} materials", materials.len());

        let mut creator = MaterialCreator::new(self.config.materials.clone(), self.fetcher());
        creator.set_materials(&materials);
        creator
    }

    /// Read and parse an MTL file from disk
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<MaterialCreator, AssetError> {
        let path = path.as_ref();
        log::info!("Loading materials from {:?}", path);

        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AssetError::NotFound(path.display().to_string()),
            _ => AssetError::IoError(e),
        })?;
        Ok(self.parse(&String::from_utf8_lossy(&bytes)))
    }
}

impl std::fmt::Debug for MtlLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MtlLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
