//! Texture fetching with bounded retry
//!
//! A fetch walks `Idle -> Requesting -> {Succeeded, Retrying, Failed}`. A
//! transport or decode failure parks the fetch in `Retrying` for the configured
//! delay and then requests the same URL again, until the retry ceiling is hit.
//! Successful images are normalized to power-of-two dimensions before they are
//! handed to the texture placeholder.
//!
//! Compressed (`.dds`) textures skip all of this: one request, no retry, no
//! resizing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::assets::image_loader::{ensure_power_of_two, ImageCodec, ImageData};
use crate::assets::transport::{Transport, TransportError};
use crate::assets::AssetError;
use crate::config::FetchConfig;
use crate::render::{Texture, WrapMode};

/// Texture fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt failed
    #[error("Gave up on {url} after {attempts} attempts")]
    Exhausted {
        /// Requested URL
        url: String,
        /// Attempts made, including the first
        attempts: u32,
    },

    /// Cancelled through a [`CancellationToken`]
    #[error("Fetch cancelled")]
    Cancelled,

    /// Compressed texture request failed (never retried)
    #[error("Compressed texture request failed: {0}")]
    Transport(#[from] TransportError),

    /// Compressed texture could not be decoded (never retried)
    #[error("Compressed texture could not be decoded: {0}")]
    Decode(#[from] AssetError),
}

/// States of a single texture fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing requested yet
    Idle,
    /// Request in flight; `attempt` counts retries already spent
    Requesting {
        /// Retries already spent
        attempt: u32,
    },
    /// Waiting out the retry delay before the next request
    Retrying {
        /// Retries spent once the wait is over
        attempt: u32,
    },
    /// Image delivered, already power-of-two
    Succeeded(ImageData),
    /// Retry ceiling hit
    Failed {
        /// Attempts made, including the first
        attempts: u32,
    },
}

/// Cooperative cancellation flag shared between a caller and a fetch
///
/// Checked before every request and after every retry wait.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Success callback
pub type OnLoad = Box<dyn FnOnce(&Texture) + Send>;

/// Final failure callback, receives the configured failure message
pub type OnError = Box<dyn FnOnce(&str) + Send>;

/// Callbacks fired once a background fetch finishes
#[derive(Default)]
pub struct FetchCallbacks {
    on_load: Option<OnLoad>,
    on_error: Option<OnError>,
}

impl FetchCallbacks {
    /// No callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `f` with the live texture on success
    pub fn on_load(mut self, f: impl FnOnce(&Texture) + Send + 'static) -> Self {
        self.on_load = Some(Box::new(f));
        self
    }

    /// Fire `f` with the failure message once retries are exhausted
    pub fn on_error(mut self, f: impl FnOnce(&str) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for FetchCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCallbacks")
            .field("on_load", &self.on_load.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Whether a URL points at a GPU-compressed container
pub fn is_compressed(url: &str) -> bool {
    url.len()
        .checked_sub(4)
        .and_then(|start| url.get(start..))
        .is_some_and(|ext| ext.eq_ignore_ascii_case(".dds"))
}

/// One fetch of one URL, owned so it can run on a spawned task
struct FetchJob {
    transport: Arc<dyn Transport>,
    codec: Arc<dyn ImageCodec>,
    config: FetchConfig,
    url: String,
}

impl FetchJob {
    async fn run(self, cancel: CancellationToken) -> Result<ImageData, FetchError> {
        if is_compressed(&self.url) {
            return self.run_compressed(&cancel).await;
        }

        let mut state = FetchState::Idle;
        loop {
            state = match state {
                FetchState::Idle => FetchState::Requesting { attempt: 0 },

                FetchState::Requesting { attempt } => {
                    if cancel.is_cancelled() {
                        return Err(FetchError::Cancelled);
                    }
                    log::debug!("Requesting texture {} (attempt {})", self.url, attempt + 1);

                    match self.attempt().await {
                        Ok(image) => FetchState::Succeeded(image),
                        Err(e) if attempt < self.config.max_retries => {
                            log::warn!(
                                "Texture {} failed ({}), retry {}/{} in {:?}",
                                self.url, e, attempt + 1, self.config.max_retries, self.config.retry_delay()
                            );
                            FetchState::Retrying { attempt: attempt + 1 }
                        }
                        Err(e) => {
                            log::error!("Texture {} failed for good: {}", self.url, e);
                            FetchState::Failed { attempts: attempt + 1 }
                        }
                    }
                }

                FetchState::Retrying { attempt } => {
                    tokio::time::sleep(self.config.retry_delay()).await;
                    FetchState::Requesting { attempt }
                }

                FetchState::Failed { attempts } => {
                    return Err(FetchError::Exhausted { url: self.url, attempts });
                }

                FetchState::Succeeded(image) => {
                    log::info!("Loaded texture {} ({}x{})", self.url, image.width, image.height);
                    return Ok(image);
                }
            };
        }
    }

    /// A single request + decode + power-of-two pass
    async fn attempt(&self) -> Result<ImageData, AssetError> {
        let bytes = self.transport.get(&self.url).await?;
        let image = self.codec.decode(&bytes)?;
        ensure_power_of_two(self.codec.as_ref(), image)
    }

    async fn run_compressed(&self, cancel: &CancellationToken) -> Result<ImageData, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        log::debug!("Requesting compressed texture {}", self.url);
        let bytes = self.transport.get(&self.url).await?;
        Ok(self.codec.decode_compressed(&bytes)?)
    }
}

/// Retrieves texture images with bounded retry
#[derive(Clone)]
pub struct TextureFetcher {
    transport: Arc<dyn Transport>,
    codec: Arc<dyn ImageCodec>,
    config: FetchConfig,
}

impl TextureFetcher {
    /// Create a fetcher over the given collaborators
    pub fn new(transport: Arc<dyn Transport>, codec: Arc<dyn ImageCodec>, config: FetchConfig) -> Self {
        Self { transport, codec, config }
    }

    /// Retry policy in use
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn job(&self, url: &str) -> FetchJob {
        FetchJob {
            transport: Arc::clone(&self.transport),
            codec: Arc::clone(&self.codec),
            config: self.config.clone(),
            url: url.to_string(),
        }
    }

    /// Run a fetch to completion
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<ImageData, FetchError> {
        self.job(url).run(cancel.clone()).await
    }

    /// Start a background fetch and return its placeholder immediately
    ///
    /// Must be called from within a Tokio runtime; without one the texture is
    /// failed on the spot and `on_error` fires.
    pub fn load_texture(&self, url: &str, callbacks: FetchCallbacks) -> Texture {
        self.load_texture_with_cancel(url, callbacks, CancellationToken::new())
    }

    /// [`load_texture`](Self::load_texture) with a caller-held cancellation token
    ///
    /// A cancelled fetch fails its placeholder without firing either callback.
    pub fn load_texture_with_cancel(
        &self,
        url: &str,
        callbacks: FetchCallbacks,
        cancel: CancellationToken,
    ) -> Texture {
        self.spawn_fetch(Texture::pending(url), callbacks, cancel)
    }

    /// [`load_texture`](Self::load_texture) with the wrap modes set before the
    /// fetch starts, so `on_load` always observes them
    pub fn load_texture_with_wrap(
        &self,
        url: &str,
        wrap_s: WrapMode,
        wrap_t: WrapMode,
        callbacks: FetchCallbacks,
    ) -> Texture {
        let texture = Texture::pending(url);
        texture.set_wrap(wrap_s, wrap_t);
        self.spawn_fetch(texture, callbacks, CancellationToken::new())
    }

    fn spawn_fetch(&self, texture: Texture, callbacks: FetchCallbacks, cancel: CancellationToken) -> Texture {
        let url = texture.url();
        let failure_message = self.config.failure_message.clone();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Cannot fetch {} outside a Tokio runtime: {}", url, e);
                texture.fail();
                if let Some(on_error) = callbacks.on_error {
                    on_error(&failure_message);
                }
                return texture;
            }
        };

        let job = self.job(&url);
        let placeholder = texture.clone();
        handle.spawn(async move {
            match job.run(cancel).await {
                Ok(image) => {
                    placeholder.fulfill(Arc::new(image));
                    if let Some(on_load) = callbacks.on_load {
                        on_load(&placeholder);
                    }
                }
                Err(FetchError::Cancelled) => {
                    log::debug!("Texture fetch {} cancelled", placeholder.url());
                    placeholder.fail();
                }
                Err(_) => {
                    placeholder.fail();
                    if let Some(on_error) = callbacks.on_error {
                        on_error(&failure_message);
                    }
                }
            }
        });

        texture
    }
}

impl std::fmt::Debug for TextureFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
