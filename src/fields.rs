//! Field tokenizer, field-name normalizer, and the `FieldMap` data model.
//!
//! Content files store one field per block, blocks separated by a line that
//! holds only the delimiter:
//!
//! ```text
//! Title: II. Bauhaus-Kolloquium
//!
//! ----
//!
//! Text:
//!
//! First paragraph.
//!
//! Second paragraph.
//! ```
//!
//! The first line of a block is `Name: value-start`; every following line up
//! to the next delimiter continues the value. Blocks whose first line has no
//! colon are reported as malformed and dropped, the rest of the file still
//! parses.
//!
//! Field names are case-insensitive and treat `-` and `_` as the same
//! separator, so `Date-start`, `date_start` and `DATE-START` all normalize to
//! `date_start`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line that separates two field blocks.
pub const FIELD_DELIMITER: &str = "----";

/// One item of a structured list field: normalized sub-field name → value.
pub type Record = BTreeMap<String, String>;

/// A field's value: free text or an ordered list of flat records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    StructuredList(Vec<Record>),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::StructuredList(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Record]> {
        match self {
            FieldValue::StructuredList(items) => Some(items),
            FieldValue::Scalar(_) => None,
        }
    }
}

/// Normalized field name → value, one per parsed content file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the normalized form of `name`. A later field with the
    /// same normalized name replaces an earlier one.
    pub fn insert(&mut self, name: &str, value: FieldValue) {
        self.0.insert(normalize_field_name(name), value);
    }

    /// Look up a field; `name` is normalized first.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(&normalize_field_name(name))
    }

    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_scalar)
    }

    pub fn list(&self, name: &str) -> Option<&[Record]> {
        self.get(name).and_then(FieldValue::as_list)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Rewrite every non-empty scalar value; structured lists are untouched.
    pub fn map_scalars(self, f: impl Fn(&str) -> String) -> Self {
        let inner = self
            .0
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    FieldValue::Scalar(s) if !s.is_empty() => FieldValue::Scalar(f(&s)),
                    other => other,
                };
                (name, value)
            })
            .collect();
        FieldMap(inner)
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (name, value) in iter {
            map.insert(&name, value);
        }
        map
    }
}

/// Canonicalize a field name: lower-case, `-` replaced by `_`.
///
/// Applied to top-level field names and to keys inside structured records.
/// - `"Date-start"` → `"date_start"`
/// - `"Text-intro-en"` → `"text_intro_en"`
/// - `"date_start"` → `"date_start"`
pub fn normalize_field_name(name: &str) -> String {
    name.to_lowercase().replace('-', "_")
}

/// A field block as it appears in the file, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// Normalized name (snake_case).
    pub name: String,
    /// Trimmed value; may be empty.
    pub value: String,
}

/// Result of tokenizing one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Field(RawField),
    /// First line had no colon (or an empty name); carries that line.
    Malformed(String),
}

/// Split a content file into its field blocks, in file order.
///
/// Empty blocks (e.g. a trailing delimiter) produce nothing.
pub fn tokenize(text: &str) -> Vec<Block> {
    let text = text.replace("\r\n", "\n");
    split_blocks(&text)
        .into_iter()
        .filter_map(parse_block)
        .collect()
}

fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.split('\n') {
        if line.trim() == FIELD_DELIMITER {
            blocks.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    blocks.push(current);
    blocks
}

fn parse_block(block: String) -> Option<Block> {
    let block = block.trim();
    if block.is_empty() {
        return None;
    }

    let (first_line, rest) = match block.find('\n') {
        Some(pos) => (&block[..pos], &block[pos + 1..]),
        None => (block, ""),
    };

    let Some(colon) = first_line.find(':') else {
        return Some(Block::Malformed(first_line.to_string()));
    };
    let name = first_line[..colon].trim();
    if name.is_empty() {
        return Some(Block::Malformed(first_line.to_string()));
    }
    let first_value = first_line[colon + 1..].trim();

    let value = if !first_value.is_empty() && !rest.trim().is_empty() {
        format!("{first_value}\n{rest}")
    } else if !first_value.is_empty() {
        first_value.to_string()
    } else {
        rest.to_string()
    };

    Some(Block::Field(RawField {
        name: normalize_field_name(name),
        value: value.trim().to_string(),
    }))
}

/// Tokenize into a flat scalar map, ignoring malformed blocks.
///
/// Used for sidecar files and site content, where no structured fields exist.
pub fn parse_flat(text: &str) -> FieldMap {
    tokenize(text)
        .into_iter()
        .filter_map(|block| match block {
            Block::Field(f) => Some((f.name, FieldValue::Scalar(f.value))),
            Block::Malformed(_) => None,
        })
        .collect()
}
