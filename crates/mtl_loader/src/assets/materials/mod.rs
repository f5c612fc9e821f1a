//! Material loading subsystem
//!
//! MTL text is parsed into raw records, normalized under the configured
//! options, and resolved lazily into renderer-facing descriptions by the
//! [`MaterialCreator`].

pub mod mtl_parser;
pub mod normalizer;
pub mod material_resolver;
pub mod material_creator;
pub mod mtl_loader;

pub use mtl_parser::{MtlParser, MaterialMap, MaterialRecord, RawMaterial, NormalizedMaterial, DirectiveValue};
pub use normalizer::MaterialNormalizer;
pub use material_resolver::{MaterialResolver, ResolvedMaterial};
pub use material_creator::{MaterialCreator, MaterialEntry};
pub use mtl_loader::MtlLoader;
