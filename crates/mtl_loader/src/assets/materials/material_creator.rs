//! Material creator facade
//!
//! Owns the normalized mapping of one MTL file and resolves materials from it
//! lazily. Resolutions are memoized per name until the next
//! [`MaterialCreator::set_materials`], which is the only reset point.

use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::cdn::HashSharder;
use crate::assets::texture_fetcher::TextureFetcher;
use crate::config::MaterialOptions;
use crate::render::{RenderSink, TextureState};
use super::material_resolver::{MaterialResolver, ResolvedMaterial};
use super::mtl_parser::{MaterialMap, NormalizedMaterial, RawMaterial};
use super::normalizer::MaterialNormalizer;

/// Resolution status of a named material
#[derive(Debug, Clone)]
pub enum MaterialEntry {
    /// Known but not resolved yet
    Unresolved,
    /// Resolved; its diffuse texture is still in flight
    Pending(Arc<ResolvedMaterial>),
    /// Resolved with nothing outstanding
    Resolved(Arc<ResolvedMaterial>),
}

impl MaterialEntry {
    /// Resolved material, if any
    pub fn material(&self) -> Option<&Arc<ResolvedMaterial>> {
        match self {
            Self::Unresolved => None,
            Self::Pending(material) | Self::Resolved(material) => Some(material),
        }
    }
}

/// Lazily resolving, memoizing view over one set of materials
#[derive(Debug)]
pub struct MaterialCreator {
    options: Option<MaterialOptions>,
    resolver: MaterialResolver,
    materials_info: MaterialMap<NormalizedMaterial>,
    cache: HashMap<String, Arc<ResolvedMaterial>>,
    materials_array: Vec<Arc<ResolvedMaterial>>,
    name_lookup: HashMap<String, usize>,
}

impl MaterialCreator {
    /// Create an empty creator
    ///
    /// Textures are fetched through `fetcher` from the CDN domain in its
    /// configuration.
    pub fn new(options: Option<MaterialOptions>, fetcher: TextureFetcher) -> Self {
        let sharder = HashSharder::new(fetcher.config().cdn_domain.clone());
        let resolver = MaterialResolver::new(options.as_ref(), sharder, fetcher);
        Self {
            options,
            resolver,
            materials_info: MaterialMap::new(),
            cache: HashMap::new(),
            materials_array: Vec::new(),
            name_lookup: HashMap::new(),
        }
    }

    /// Install a freshly parsed set of materials
    ///
    /// Drops every cached resolution and the index table.
    pub fn set_materials(&mut self, raw: &MaterialMap<RawMaterial>) {
        self.materials_info = MaterialNormalizer::normalize(raw, self.options.as_ref());
        self.cache.clear();
        self.materials_array.clear();
        self.name_lookup.clear();
        log::debug!("Installed {} materials", self.materials_info.len());
    }

    /// Resolve `name`, or return the cached resolution
    ///
    /// Returns `None` for names not in the installed set.
    pub fn get(&mut self, name: &str) -> Option<Arc<ResolvedMaterial>> {
        if let Some(material) = self.cache.get(name) {
            return Some(Arc::clone(material));
        }

        let Some(record) = self.materials_info.get(name) else {
            log::warn!("Material '{}' is not defined", name);
            return None;
        };

        let material = Arc::new(self.resolver.resolve(name, record));
        self.cache.insert(name.to_string(), Arc::clone(&material));
        Some(material)
    }

    /// Resolve every material and assign indices in declaration order
    ///
    /// Returns the ordered materials and the name-to-index table.
    pub fn get_all(&mut self) -> (&[Arc<ResolvedMaterial>], &HashMap<String, usize>) {
        let names: Vec<String> = self.materials_info.names().map(str::to_string).collect();

        self.materials_array.clear();
        self.name_lookup.clear();
        for name in names {
            if let Some(material) = self.get(&name) {
                self.name_lookup.insert(name, self.materials_array.len());
                self.materials_array.push(material);
            }
        }

        (&self.materials_array, &self.name_lookup)
    }

    /// Index assigned to `name` by the last [`get_all`](Self::get_all)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_lookup.get(name).copied()
    }

    /// Resolve every material without assigning indices
    ///
    /// Starts all texture fetches up front.
    pub fn preload(&mut self) {
        let names: Vec<String> = self.materials_info.names().map(str::to_string).collect();
        for name in names {
            self.get(&name);
        }
    }

    /// Current status of `name`, or `None` if it is not defined
    pub fn entry(&self, name: &str) -> Option<MaterialEntry> {
        if !self.materials_info.contains(name) {
            return None;
        }

        Some(match self.cache.get(name) {
            None => MaterialEntry::Unresolved,
            Some(material) if material.has_pending_texture() => MaterialEntry::Pending(Arc::clone(material)),
            Some(material) => MaterialEntry::Resolved(Arc::clone(material)),
        })
    }

    /// Build runtime materials for every material, in index order
    ///
    /// Textures that have already arrived are uploaded through the sink and
    /// marked as uploaded; pending or failed ones are left off the material.
    pub fn realize<S: RenderSink>(&mut self, sink: &mut S) -> Vec<S::Material> {
        let (materials, _) = self.get_all();

        materials
            .iter()
            .map(|material| {
                let map = material.map.as_ref().and_then(|texture| match texture.state() {
                    TextureState::Loaded(image) => {
                        let (wrap_s, wrap_t) = texture.wrap();
                        let created = sink.create_texture(&image, wrap_s, wrap_t);
                        texture.mark_uploaded();
                        Some(created)
                    }
                    TextureState::Pending | TextureState::Failed => None,
                });
                sink.create_material(material, map)
            })
            .collect()
    }

    /// Number of installed materials
    pub fn len(&self) -> usize {
        self.materials_info.len()
    }

    /// Whether no materials are installed
    pub fn is_empty(&self) -> bool {
        self.materials_info.is_empty()
    }

    /// Installed material names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials_info.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use approx::assert_relative_eq;

    use crate::assets::image_loader::{ImageData, RgbaCodec};
    use crate::assets::materials::MtlParser;
    use crate::assets::test_support::{png_bytes, ScriptedTransport};
    use crate::config::FetchConfig;
    use crate::foundation::math::Color;
    use crate::render::WrapMode;

    const HASH: &str = "ffffffffffffffffffffffffffffffff";

    fn creator(transport: Arc<ScriptedTransport>, options: Option<MaterialOptions>, text: &str) -> MaterialCreator {
        let fetcher = TextureFetcher::new(transport, Arc::new(RgbaCodec), FetchConfig::default());
        let mut creator = MaterialCreator::new(options, fetcher);
        creator.set_materials(&MtlParser::parse(text));
        creator
    }

    #[derive(Default)]
    struct RecordingSink {
        textures: Vec<(u32, u32)>,
    }

    impl RenderSink for RecordingSink {
        type Material = (String, Option<usize>);
        type Texture = usize;

        fn create_texture(&mut self, image: &ImageData, _wrap_s: WrapMode, _wrap_t: WrapMode) -> usize {
            self.textures.push((image.width, image.height));
            self.textures.len() - 1
        }

        fn create_material(&mut self, material: &ResolvedMaterial, map: Option<usize>) -> Self::Material {
            (material.name.clone(), map)
        }
    }

    #[test]
    fn test_end_to_end_without_options() {
        let mut creator = creator(ScriptedTransport::new(), None, "newmtl m1\nKd 1.0 0.0 0.0\nd 0.5\n");
        let (materials, lookup) = creator.get_all();

        assert_eq!(materials.len(), 1);
        let m1 = &materials[0];
        assert_eq!(m1.name, "m1");
        assert_eq!(m1.color, Color::new(1.0, 0.0, 0.0));
        assert_relative_eq!(m1.opacity, 0.5);
        assert!(m1.transparent);
        assert_eq!(m1.shininess, 0.0);
        assert_eq!(lookup.get("m1"), Some(&0));
    }

    #[test]
    fn test_get_all_indices_follow_declaration_order() {
        let text = "newmtl c\nKd 1 1 1\nnewmtl a\nnewmtl b\nnewmtl a\nNs 10\n";
        let mut creator = creator(ScriptedTransport::new(), None, text);
        let (materials, _) = creator.get_all();

        let names: Vec<&str> = materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
        assert_eq!(creator.index_of("c"), Some(0));
        assert_eq!(creator.index_of("a"), Some(1));
        assert_eq!(creator.index_of("b"), Some(2));
    }

    #[test]
    fn test_index_of_before_get_all() {
        let mut creator = creator(ScriptedTransport::new(), None, "newmtl a\n");
        assert_eq!(creator.index_of("a"), None);
        assert!(creator.get("a").is_some());
        assert_eq!(creator.index_of("a"), None);
        assert_eq!(creator.index_of("missing"), None);
    }

    #[test]
    fn test_get_is_memoized() {
        let mut creator = creator(ScriptedTransport::new(), None, "newmtl a\nKd 0 0 1\n");
        let first = creator.get("a").unwrap();
        let second = creator.get("a").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let (all, _) = creator.get_all();
        assert!(Arc::ptr_eq(&first, &all[0]));
    }

    #[test]
    fn test_unknown_material_is_none() {
        let mut creator = creator(ScriptedTransport::new(), None, "newmtl a\n");
        assert!(creator.get("b").is_none());
        assert!(creator.entry("b").is_none());
    }

    #[test]
    fn test_set_materials_resets_everything() {
        let mut creator = creator(ScriptedTransport::new(), None, "newmtl a\nKd 1 0 0\n");
        let before = creator.get("a").unwrap();
        creator.get_all();
        assert_eq!(creator.index_of("a"), Some(0));

        creator.set_materials(&MtlParser::parse("newmtl b\nnewmtl a\nKd 0 1 0\n"));
        assert_eq!(creator.index_of("a"), None);
        assert!(matches!(creator.entry("a"), Some(MaterialEntry::Unresolved)));

        let after = creator.get("a").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.color, Color::new(0.0, 1.0, 0.0));
        creator.get_all();
        assert_eq!(creator.index_of("a"), Some(1));
    }

    #[test]
    fn test_options_flow_through() {
        let options = MaterialOptions::new().with_normalize_rgb(true).with_invert_transparency(true);
        let mut creator = creator(ScriptedTransport::new(), Some(options), "newmtl m\nKd 255 0 0\nd 0.3\nNs 96\n");
        let material = creator.get("m").unwrap();

        assert_eq!(material.color, Color::new(1.0, 0.0, 0.0));
        assert_relative_eq!(material.opacity, 0.7);
        assert!(material.transparent);
        assert_eq!(material.shininess, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let mut creator = creator(ScriptedTransport::new(), None, "# nothing here\n\n");
        assert!(creator.is_empty());
        let (materials, lookup) = creator.get_all();
        assert!(materials.is_empty());
        assert!(lookup.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_tracks_texture_arrival() {
        let url = HashSharder::new("rbxcdn.com").url_for(HASH);
        let transport = ScriptedTransport::new();
        transport.serve(&url, png_bytes(64, 64), 1);

        let mut creator = creator(Arc::clone(&transport), None, &format!("newmtl t\nmap_Kd {HASH}\nnewmtl plain\n"));
        assert!(matches!(creator.entry("t"), Some(MaterialEntry::Unresolved)));

        creator.preload();
        assert_eq!(creator.index_of("t"), None);
        assert!(matches!(creator.entry("t"), Some(MaterialEntry::Pending(_))));
        assert!(matches!(creator.entry("plain"), Some(MaterialEntry::Resolved(_))));

        let texture = creator.get("t").unwrap().map.clone().unwrap();
        while texture.is_pending() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert!(texture.is_loaded());
        assert_eq!(transport.requests(&url), 2);
        let entry = creator.entry("t").unwrap();
        assert!(matches!(entry, MaterialEntry::Resolved(_)));
        assert!(entry.material().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_realize_uploads_loaded_textures() {
        let url = HashSharder::new("rbxcdn.com").url_for(HASH);
        let transport = ScriptedTransport::new();
        transport.serve(&url, png_bytes(100, 60), 0);

        let text = format!("newmtl plain\nKd 1 0 0\nnewmtl textured\nmap_Kd {HASH}\n");
        let mut creator = creator(Arc::clone(&transport), None, &text);
        creator.preload();

        let texture = creator.get("textured").unwrap().map.clone().unwrap();
        while texture.is_pending() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(texture.needs_update());

        let mut sink = RecordingSink::default();
        let built = creator.realize(&mut sink);

        assert_eq!(built, [("plain".to_string(), None), ("textured".to_string(), Some(0))]);
        assert_eq!(sink.textures, [(128, 64)]);
        assert!(!texture.needs_update());
        assert_eq!(creator.index_of("textured"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_realize_skips_pending_textures() {
        let transport = ScriptedTransport::new();
        let mut creator = creator(Arc::clone(&transport), None, &format!("newmtl t\nmap_Kd {HASH}\n"));

        let mut sink = RecordingSink::default();
        let built = creator.realize(&mut sink);

        assert_eq!(built, [("t".to_string(), None)]);
        assert!(sink.textures.is_empty());
    }
}
