//! # Loader Configuration
//!
//! Options that shape how material records are normalized and resolved, and
//! how texture binaries are fetched from the CDN.
//!
//! ```toml
//! [materials]
//! side = "double"
//! wrap = "clamp_to_edge"
//! normalize_rgb = true
//!
//! [fetch]
//! max_retries = 4
//! retry_delay_ms = 5000
//! cdn_domain = "rbxcdn.com"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Config;
use crate::render::{Side, WrapMode};

/// Message reported once a texture has exhausted every retry
pub const DEFAULT_FAILURE_MESSAGE: &str = "Unable to load 3D thumbnail";

/// # Material Options
///
/// Controls normalization of raw MTL records and the renderer-wide settings
/// applied to every resolved material.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialOptions {
    /// Which faces every material is applied to
    pub side: Side,
    /// Wrap mode applied to both axes of every diffuse texture
    pub wrap: WrapMode,
    /// Colors are stored as 0-255 and must be scaled to 0-1
    pub normalize_rgb: bool,
    /// Drop `Ka`/`Kd`/`Ks` triples that are zero
    pub ignore_zero_rgb: bool,
    /// `d = 0` means fully opaque and must be inverted
    pub invert_transparency: bool,
}

impl MaterialOptions {
    /// Create options with every flag off
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the material side
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Set the texture wrap mode
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    /// Enable 0-255 to 0-1 color scaling
    pub fn with_normalize_rgb(mut self, enabled: bool) -> Self {
        self.normalize_rgb = enabled;
        self
    }

    /// Enable dropping of zero colors
    pub fn with_ignore_zero_rgb(mut self, enabled: bool) -> Self {
        self.ignore_zero_rgb = enabled;
        self
    }

    /// Enable dissolve inversion
    pub fn with_invert_transparency(mut self, enabled: bool) -> Self {
        self.invert_transparency = enabled;
        self
    }
}

/// # Fetch Configuration
///
/// Retry policy and CDN location for texture binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Wait between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Domain under which the `t0`..`t7` shard hosts live
    pub cdn_domain: String,
    /// Message passed to the failure callback
    pub failure_message: String,
}

impl FetchConfig {
    /// Create the default retry policy
    pub fn new() -> Self {
        Self {
            max_retries: 4,
            retry_delay_ms: 5_000,
            cdn_domain: "rbxcdn.com".to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Set the retry ceiling
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay between attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the CDN domain
    pub fn with_cdn_domain(mut self, domain: impl Into<String>) -> Self {
        self.cdn_domain = domain.into();
        self
    }

    /// Delay between attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Loader Configuration
///
/// `materials` is optional: without it raw records pass through the
/// normalizer untouched and the renderer defaults apply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Normalization and renderer options
    pub materials: Option<MaterialOptions>,
    /// Texture fetch policy
    pub fetch: FetchConfig,
}

impl LoaderConfig {
    /// Create a configuration with no material options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the material options
    pub fn with_materials(mut self, options: MaterialOptions) -> Self {
        self.materials = Some(options);
        self
    }

    /// Set the fetch policy
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }
}

impl Config for MaterialOptions {}
impl Config for FetchConfig {}
impl Config for LoaderConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;
    use crate::config::ConfigError;

    #[test]
    fn test_fetch_defaults() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.max_retries, 4);
        assert_eq!(fetch.max_attempts(), 5);
        assert_eq!(fetch.retry_delay(), Duration::from_secs(5));
        assert_eq!(fetch.failure_message, "Unable to load 3D thumbnail");
    }

    #[test]
    fn test_material_option_defaults() {
        let options = MaterialOptions::default();
        assert_eq!(options.side, Side::Front);
        assert_eq!(options.wrap, WrapMode::Repeat);
        assert!(!options.normalize_rgb && !options.ignore_zero_rgb && !options.invert_transparency);
    }

    #[test]
    fn test_load_toml() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, r#"
[materials]
side = "double"
wrap = "clamp_to_edge"
normalize_rgb = true

[fetch]
max_retries = 2
retry_delay_ms = 100
"#).unwrap();

        let config = LoaderConfig::load_from_file(file.path()).unwrap();
        let materials = config.materials.unwrap();
        assert_eq!(materials.side, Side::Double);
        assert_eq!(materials.wrap, WrapMode::ClampToEdge);
        assert!(materials.normalize_rgb);
        assert!(!materials.invert_transparency);
        assert_eq!(config.fetch.max_retries, 2);
        assert_eq!(config.fetch.cdn_domain, "rbxcdn.com");
    }

    #[test]
    fn test_ron_round_trip() {
        let file = Builder::new().suffix(".ron").tempfile().unwrap();
        let path = file.path();

        let config = LoaderConfig::new()
            .with_materials(MaterialOptions::new().with_invert_transparency(true))
            .with_fetch(FetchConfig::new().with_cdn_domain("cdn.test"));
        config.save_to_file(path).unwrap();

        assert_eq!(LoaderConfig::load_from_file(path).unwrap(), config);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".ini").tempfile().unwrap();
        let result = LoaderConfig::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
