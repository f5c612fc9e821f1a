//! MTL (Material Template Library) file parser
//!
//! Turns Wavefront .mtl text into an ordered map of material name -> raw
//! directive record. The parser is deliberately tolerant: it never fails.
//! Comments and blank lines are skipped, directives before the first
//! `newmtl` are dropped, and color channels without a leading number become
//! NaN instead of errors.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::foundation::math::Color;

/// Directives whose value is an RGB triple
pub const COLOR_DIRECTIVES: [&str; 3] = ["ka", "kd", "ks"];

/// Value stored under a directive key
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveValue {
    /// `Ka`/`Kd`/`Ks` triple
    Color(Color),
    /// Number produced by normalization (inverted dissolve)
    Scalar(f32),
    /// Any other directive, kept verbatim
    Text(String),
}

impl DirectiveValue {
    /// The color triple, if this is one
    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Self::Color(color) => Some(color),
            _ => None,
        }
    }

    /// The verbatim text, if this is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric view of the value
    ///
    /// Text follows loose numeric coercion: surrounding whitespace is ignored,
    /// an empty string is zero and anything unparsable is NaN.
    pub fn as_number(&self) -> f32 {
        match self {
            Self::Scalar(value) => *value,
            Self::Text(text) => coerce_number(text),
            Self::Color(_) => f32::NAN,
        }
    }
}

/// Loose string -> number coercion used for scalar directives
pub fn coerce_number(text: &str) -> f32 {
    let text = text.trim();
    if text.is_empty() {
        0.0
    } else {
        text.parse().unwrap_or(f32::NAN)
    }
}

/// Directive record of one material
///
/// Keys are lower-cased directive names. `name` is always present and holds
/// the `newmtl` value.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    directives: BTreeMap<String, DirectiveValue>,
}

/// Record as produced by the parser
pub type RawMaterial = MaterialRecord;

/// Record after normalization (same shape, transformed values)
pub type NormalizedMaterial = MaterialRecord;

impl MaterialRecord {
    /// Start a record for a `newmtl` name
    pub fn new(name: impl Into<String>) -> Self {
        let mut directives = BTreeMap::new();
        directives.insert("name".to_string(), DirectiveValue::Text(name.into()));
        Self { directives }
    }

    /// Record with no entries at all, not even `name`
    pub(crate) fn empty() -> Self {
        Self { directives: BTreeMap::new() }
    }

    /// Value of the `name` directive
    pub fn name(&self) -> &str {
        self.directives
            .get("name")
            .and_then(DirectiveValue::as_text)
            .unwrap_or_default()
    }

    /// Look up a directive (keys are lower-case)
    pub fn get(&self, key: &str) -> Option<&DirectiveValue> {
        self.directives.get(key)
    }

    /// Store a directive, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: DirectiveValue) {
        self.directives.insert(key.into(), value);
    }

    /// Iterate directives in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.directives.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of directives, `name` included
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Whether the record has no directives
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// Name-keyed map that iterates in first-insertion order
///
/// Re-inserting an existing name replaces its value but keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMap<T> {
    order: Vec<String>,
    entries: HashMap<String, T>,
}

impl<T> Default for MaterialMap<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<T> MaterialMap<T> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`
    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        match self.entries.entry(name.into()) {
            Entry::Occupied(mut slot) => {
                slot.insert(value);
            }
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(value);
            }
        }
    }

    /// Look up by name
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Mutable lookup by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(name)
    }

    /// Whether `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in first-seen order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.order
            .iter()
            .filter_map(move |name| self.entries.get(name).map(|value| (name.as_str(), value)))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<T> FromIterator<(String, T)> for MaterialMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Accumulator threaded through the line fold
#[derive(Default)]
struct ParseState {
    current: Option<String>,
    materials: MaterialMap<RawMaterial>,
}

impl ParseState {
    fn apply(mut self, line: &str) -> Self {
        let (key, value) = match line.split_once(' ') {
            Some((key, value)) => (key, value.trim()),
            None => (line, ""),
        };
        let key = key.to_lowercase();

        if key == "newmtl" {
            log::debug!("MTL: new material '{}'", value);
            self.materials.insert(value, RawMaterial::new(value));
            self.current = Some(value.to_string());
            return self;
        }

        let Some(current) = self.current.as_deref() else {
            log::trace!("MTL: discarding '{}' before any newmtl", key);
            return self;
        };

        if let Some(material) = self.materials.get_mut(current) {
            let parsed = if COLOR_DIRECTIVES.contains(&key.as_str()) {
                DirectiveValue::Color(parse_color(value))
            } else {
                DirectiveValue::Text(value.to_string())
            };
            material.set(key, parsed);
        }
        self
    }
}

/// Split on whitespace runs into three floats; missing tokens are NaN
fn parse_color(value: &str) -> Color {
    let mut channels = value.split_whitespace().map(parse_float_prefix);
    let mut next = || channels.next().unwrap_or(f32::NAN);
    let (r, g, b) = (next(), next(), next());
    Color::new(r, g, b)
}

/// Longest leading decimal number of `token`, so `0.8,` reads as 0.8
///
/// Accepts an optional sign, digits with an optional fraction, an optional
/// exponent, or `Infinity`. NaN when no number starts the token.
pub fn parse_float_prefix(token: &str) -> f32 {
    let token = token.trim_start();
    let bytes = token.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    if token[end..].starts_with("Infinity") {
        return if token.starts_with('-') { f32::NEG_INFINITY } else { f32::INFINITY };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f32::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exp_digits = count_digits(&bytes[exponent..]);
        if exp_digits > 0 {
            end = exponent + exp_digits;
        }
    }

    token[..end].parse().unwrap_or(f32::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL file contents into an ordered map of material name -> record
    ///
    /// Never fails; the result may be empty.
    pub fn parse(contents: &str) -> MaterialMap<RawMaterial> {
        contents
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .fold(ParseState::default(), ParseState::apply)
            .materials
    }
}
