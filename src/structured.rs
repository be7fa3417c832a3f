//! Structured-field classification and decoding.
//!
//! Some fields hold a YAML list of flat records instead of free text:
//!
//! ```text
//! Gallery:
//!
//! -
//!   image: BHK_02_150.jpg
//!   position: "1"
//!   column: left
//! -
//!   image: BHK_02_25.jpg
//!   position: "3"
//! ```
//!
//! Whether a field is structured is decided by a [`Classify`] strategy chosen
//! once per file:
//!
//! - [`Hinted`]: the template's configured field set decides. Fields in the
//!   set are always decoded, everything else stays a scalar.
//! - [`Heuristic`]: used when a template has no configured set. A value is
//!   structured only if it opens with a list-item line followed by an
//!   indented `key:` line, so markdown bullet lists stay prose.
//!
//! Decoding coerces every value to a trimmed string and normalizes every key.

use crate::fields::{Record, normalize_field_name};
use crate::types::Template;
use regex::Regex;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use thiserror::Error;

/// Value opens with a bare `-` line, then an indented `key:`.
static LIST_OF_RECORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A-[ \t]*\n\s+[A-Za-z0-9_][A-Za-z0-9_-]*:").expect("valid regex")
});

/// Decides whether a field's raw value is a structured list.
pub trait Classify {
    fn is_structured(&self, name: &str, value: &str) -> bool;
}

/// Classification by an explicit per-template field set.
#[derive(Debug, Clone, Copy)]
pub struct Hinted<'a> {
    fields: &'a BTreeSet<String>,
}

impl<'a> Hinted<'a> {
    pub fn new(fields: &'a BTreeSet<String>) -> Self {
        Self { fields }
    }
}

impl Classify for Hinted<'_> {
    fn is_structured(&self, name: &str, _value: &str) -> bool {
        self.fields.contains(name)
    }
}

/// Classification by the shape of the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Heuristic;

impl Classify for Heuristic {
    fn is_structured(&self, _name: &str, value: &str) -> bool {
        looks_structured(value)
    }
}

/// The strategy selected for one file.
#[derive(Debug, Clone, Copy)]
pub enum Classifier<'a> {
    Hinted(Hinted<'a>),
    Heuristic(Heuristic),
}

impl<'a> Classifier<'a> {
    /// Hinted when the table has an entry for `template`, heuristic otherwise.
    pub fn for_template(template: Template, table: &'a HintTable) -> Self {
        match table.hints_for(template) {
            Some(fields) => Classifier::Hinted(Hinted::new(fields)),
            None => Classifier::Heuristic(Heuristic),
        }
    }
}

impl Classify for Classifier<'_> {
    fn is_structured(&self, name: &str, value: &str) -> bool {
        match self {
            Classifier::Hinted(h) => h.is_structured(name, value),
            Classifier::Heuristic(h) => h.is_structured(name, value),
        }
    }
}

/// Template → names of its structured fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintTable(BTreeMap<Template, BTreeSet<String>>);

impl HintTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `fields` (normalized) as structured for `template`.
    pub fn with<I, S>(mut self, template: Template, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = fields
            .into_iter()
            .map(|f| normalize_field_name(f.as_ref()))
            .collect();
        self.0.insert(template, set);
        self
    }

    pub fn hints_for(&self, template: Template) -> Option<&BTreeSet<String>> {
        self.0.get(&template)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Template, &BTreeSet<String>)> {
        self.0.iter().map(|(t, fields)| (*t, fields))
    }

    /// The archive's stock table. `credits` and `default` have no entry and
    /// are classified heuristically.
    pub fn stock() -> Self {
        HintTable::new()
            .with(Template::Colloquia, ["program", "gallery", "quotes"])
            .with(Template::Addon, ["gallery", "quotes"])
            .with(Template::Retrospect, ["videosource", "quotes"])
            .with(
                Template::VideoGallery,
                [
                    "panel1_videos",
                    "panel2_videos",
                    "panel3_videos",
                    "panel4_videos",
                ],
            )
            .with(Template::Publication, ["gallery"])
            .with(Template::Gallery, ["gallery"])
            .with(Template::Participants, ["persons"])
            .with(Template::Start, ["logos"])
    }
}

/// Heuristic shape test: a list-item line followed by an indented `key:`.
///
/// - `"- \n  image: a.jpg"` → true
/// - `"- item one\n- item two"` → false
pub fn looks_structured(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && LIST_OF_RECORDS.is_match(trimmed)
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("expected a list, found {0}")]
    NotAList(&'static str),
}

/// Decode a structured value into records, in source order.
///
/// Empty input is an empty list. Items that are not mappings become a
/// single-entry record under `value`.
pub fn decode_list(value: &str) -> Result<Vec<Record>, DecodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let parsed: Value = serde_yaml::from_str(trimmed)?;
    let items = match parsed {
        Value::Sequence(items) => items,
        other => return Err(DecodeError::NotAList(kind_of(&other))),
    };

    Ok(items.iter().map(to_record).collect())
}

fn to_record(item: &Value) -> Record {
    match item {
        Value::Mapping(map) => map
            .iter()
            .map(|(k, v)| (normalize_field_name(&coerce(k)), coerce(v)))
            .collect(),
        other => Record::from([("value".to_string(), coerce(other))]),
    }
}

/// Flatten any YAML value to a trimmed string.
fn coerce(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            // Round floats print without a fraction: `1e3` → "1000".
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::String(s) => s.trim().to_string(),
        Value::Sequence(items) => items.iter().map(coerce).collect::<Vec<_>>().join(","),
        Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        Value::Tagged(tagged) => coerce(&tagged.value),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
