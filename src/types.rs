//! Shared types produced by the loader and consumed by presentation code.
//!
//! Everything here serializes to JSON (the `load` command's manifest) and is
//! read-only once a load completes.

use crate::diagnostics::Diagnostic;
use crate::fields::FieldMap;
use crate::metadata::ImageMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of page templates. A content file is named
/// `<template>.<lang>.txt`; any other template name is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    Start,
    Colloquia,
    Addon,
    Retrospect,
    VideoGallery,
    Publication,
    Gallery,
    Participants,
    Credits,
    Default,
}

impl Template {
    pub const ALL: [Template; 10] = [
        Template::Start,
        Template::Colloquia,
        Template::Addon,
        Template::Retrospect,
        Template::VideoGallery,
        Template::Publication,
        Template::Gallery,
        Template::Participants,
        Template::Credits,
        Template::Default,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Template::Start => "start",
            Template::Colloquia => "colloquia",
            Template::Addon => "addon",
            Template::Retrospect => "retrospect",
            Template::VideoGallery => "video-gallery",
            Template::Publication => "publication",
            Template::Gallery => "gallery",
            Template::Participants => "participants",
            Template::Credits => "credits",
            Template::Default => "default",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown template {0:?}")]
pub struct UnknownTemplate(pub String);

impl FromStr for Template {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// Content languages. German is mandatory for every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    De,
    En,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::De, Lang::En];
    /// A page without content in this language is not loaded.
    pub const PRIMARY: Lang = Lang::De;

    pub fn code(self) -> &'static str {
        match self {
            Lang::De => "de",
            Lang::En => "en",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown language code {0:?} (expected de or en)")]
pub struct UnknownLang(pub String);

impl FromStr for Lang {
    type Err = UnknownLang;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lang::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| UnknownLang(s.to_string()))
    }
}

/// One page directory of the content root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Directory name, e.g. `4-1979`.
    pub slug: String,
    /// From the directory's numeric prefix; unprefixed directories sort last.
    pub sort_order: u32,
    pub template: Template,
    /// German content (always present).
    pub de: FieldMap,
    /// English content, often partial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<FieldMap>,
    /// Image metadata keyed by image filename.
    #[serde(default)]
    pub images: BTreeMap<String, ImageMeta>,
    /// Directory path relative to the content root, used for asset URLs.
    pub dir_path: String,
}

impl Page {
    pub fn content(&self, lang: Lang) -> Option<&FieldMap> {
        match lang {
            Lang::De => Some(&self.de),
            Lang::En => self.en.as_ref(),
        }
    }

    pub fn scalar(&self, lang: Lang, name: &str) -> Option<&str> {
        self.content(lang).and_then(|c| c.scalar(name))
    }

    /// Scalar in `lang` when present and non-empty, German otherwise.
    pub fn localized(&self, name: &str, lang: Lang) -> Option<&str> {
        self.scalar(lang, name)
            .filter(|s| !s.is_empty())
            .or_else(|| self.de.scalar(name))
    }
}

/// Site-wide fields from `site.<lang>.txt`. Flat scalars only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteContent {
    pub de: FieldMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<FieldMap>,
}

impl SiteContent {
    pub fn title(&self) -> &str {
        self.de.scalar("title").unwrap_or_default()
    }
}

/// Result of loading a whole content root.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteData {
    pub site: SiteContent,
    /// Sorted by `sort_order`, ties in directory-name order.
    pub pages: Vec<Page>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl SiteData {
    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.slug == slug)
    }
}
