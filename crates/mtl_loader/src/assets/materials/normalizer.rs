//! Option-driven normalization of raw material records

use crate::config::MaterialOptions;
use crate::foundation::math::{normalize_rgb, Color};
use super::mtl_parser::{DirectiveValue, MaterialMap, MaterialRecord, NormalizedMaterial, RawMaterial, COLOR_DIRECTIVES};

/// Applies [`MaterialOptions`] to parsed records
pub struct MaterialNormalizer;

impl MaterialNormalizer {
    /// Normalize every material in `raw`
    ///
    /// With `options == None` the records are copied through unchanged apart
    /// from key lower-casing.
    pub fn normalize(
        raw: &MaterialMap<RawMaterial>,
        options: Option<&MaterialOptions>,
    ) -> MaterialMap<NormalizedMaterial> {
        raw.iter()
            .map(|(name, record)| (name.to_string(), Self::normalize_record(record, options)))
            .collect()
    }

    /// Normalize a single record
    pub fn normalize_record(record: &RawMaterial, options: Option<&MaterialOptions>) -> NormalizedMaterial {
        let mut normalized = MaterialRecord::empty();

        for (key, value) in record.iter() {
            let key = key.to_lowercase();
            let value = match options {
                Some(options) => Self::convert(&key, value, options),
                None => Some(value.clone()),
            };
            if let Some(value) = value {
                normalized.set(key, value);
            }
        }

        normalized
    }

    /// Converted value for one directive, or `None` to drop it
    fn convert(key: &str, value: &DirectiveValue, options: &MaterialOptions) -> Option<DirectiveValue> {
        if COLOR_DIRECTIVES.contains(&key) {
            let DirectiveValue::Color(color) = value else {
                return Some(value.clone());
            };

            let color = if options.normalize_rgb { normalize_rgb(color) } else { *color };

            if options.ignore_zero_rgb && is_zero_color(&color) {
                log::debug!("Dropping zero color '{}'", key);
                return None;
            }
            return Some(DirectiveValue::Color(color));
        }

        if key == "d" && options.invert_transparency {
            return Some(DirectiveValue::Scalar(1.0 - value.as_number()));
        }

        Some(value.clone())
    }
}

/// Zero test used by `ignore_zero_rgb`
///
/// Only the red and green channels are compared; blue is never looked at, so
/// `(0, 0, 1)` counts as zero.
pub fn is_zero_color(color: &Color) -> bool {
    color.x == 0.0 && color.y == 0.0
}
