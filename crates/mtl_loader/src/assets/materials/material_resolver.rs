//! Material resolution
//!
//! Turns one normalized record into the description the renderer builds its
//! Phong-style material from. Everything except the diffuse texture is
//! resolved synchronously; `map_kd` starts a background fetch and leaves a
//! pending [`Texture`] in the result.

use crate::assets::cdn::HashSharder;
use crate::assets::texture_fetcher::{FetchCallbacks, TextureFetcher};
use crate::config::MaterialOptions;
use crate::foundation::math::Color;
use crate::render::{Side, Texture, WrapMode};
use super::mtl_parser::{DirectiveValue, NormalizedMaterial};

/// Renderer-facing material description
#[derive(Debug, Clone)]
pub struct ResolvedMaterial {
    /// Material name (the `newmtl` value)
    pub name: String,
    /// Faces the material applies to
    pub side: Side,
    /// Base color from `Kd`
    pub color: Color,
    /// Specular color from `Ks`
    pub specular: Color,
    /// Always zero; the target lighting model has no specular exponent
    pub shininess: f32,
    /// Opacity from `d`
    pub opacity: f32,
    /// Set when `d < 1`
    pub transparent: bool,
    /// Diffuse texture from `map_Kd`, possibly still pending
    pub map: Option<Texture>,
    /// `Ka` as read from the file; not applied (ambient follows the base color)
    pub source_ambient: Option<Color>,
    /// `Ns` as read from the file; not applied
    pub source_shininess: Option<String>,
}

impl ResolvedMaterial {
    /// Description with the renderer's defaults
    pub fn new(name: impl Into<String>, side: Side) -> Self {
        Self {
            name: name.into(),
            side,
            color: Color::new(1.0, 1.0, 1.0),
            specular: Color::new(17.0 / 255.0, 17.0 / 255.0, 17.0 / 255.0),
            shininess: 0.0,
            opacity: 1.0,
            transparent: false,
            map: None,
            source_ambient: None,
            source_shininess: None,
        }
    }

    /// Whether the diffuse texture is still being fetched
    pub fn has_pending_texture(&self) -> bool {
        self.map.as_ref().is_some_and(Texture::is_pending)
    }
}

/// Resolves normalized records into [`ResolvedMaterial`]s
#[derive(Debug, Clone)]
pub struct MaterialResolver {
    side: Side,
    wrap: WrapMode,
    sharder: HashSharder,
    fetcher: TextureFetcher,
}

impl MaterialResolver {
    /// Create a resolver; without options the renderer defaults apply
    pub fn new(options: Option<&MaterialOptions>, sharder: HashSharder, fetcher: TextureFetcher) -> Self {
        let options = options.cloned().unwrap_or_default();
        Self {
            side: options.side,
            wrap: options.wrap,
            sharder,
            fetcher,
        }
    }

    /// Resolve `record` under the name `name`
    pub fn resolve(&self, name: &str, record: &NormalizedMaterial) -> ResolvedMaterial {
        let mut material = ResolvedMaterial::new(name, self.side);

        for (key, value) in record.iter() {
            match key {
                "kd" => {
                    if let Some(color) = value.as_color() {
                        material.color = *color;
                    }
                }

                // Ambient collapses into the base color in the target renderer
                "ka" => material.source_ambient = value.as_color().copied(),

                "ks" => {
                    if let Some(color) = value.as_color() {
                        material.specular = *color;
                    }
                }

                "map_kd" => material.map = Some(self.load_texture(name, value)),

                "ns" => material.source_shininess = Some(display_value(value)),

                "d" => {
                    let dissolve = value.as_number();
                    if dissolve < 1.0 {
                        material.transparent = true;
                        material.opacity = dissolve;
                    }
                }

                _ => {}
            }
        }

        material.shininess = 0.0;

        log::debug!(
            "Resolved material '{}' (opacity {}, texture: {})",
            name, material.opacity, material.map.is_some()
        );
        material
    }

    fn load_texture(&self, material: &str, value: &DirectiveValue) -> Texture {
        let hash = display_value(value);
        let url = self.sharder.url_for(&hash);
        log::info!("Requesting diffuse texture for '{}' from {}", material, url);

        let owner = material.to_string();
        let callbacks = FetchCallbacks::new().on_error(move |message| {
            log::warn!("Material '{}' stays untextured: {}", owner, message);
        });

        self.fetcher.load_texture_with_wrap(&url, self.wrap, self.wrap, callbacks)
    }
}

fn display_value(value: &DirectiveValue) -> String {
    match value {
        DirectiveValue::Text(text) => text.clone(),
        DirectiveValue::Scalar(number) => number.to_string(),
        DirectiveValue::Color(color) => format!("{} {} {}", color.x, color.y, color.z),
    }
}
