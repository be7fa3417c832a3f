//! Image metadata and asset URLs.
//!
//! Every image in a page directory can have a sidecar per language,
//! `<image>.<lang>.txt`, holding flat fields:
//!
//! ```text
//! Caption: Gruppenfoto
//!
//! ----
//!
//! Copyright: Archiv der Moderne
//! ```
//!
//! ## Resolution priority
//!
//! Each field is resolved independently; the first non-empty value wins:
//!
//! - German sidecar → English sidecar → None
//!
//! German is the archive's primary language, so the English sidecar only
//! fills gaps.

use crate::config::AssetsConfig;
use crate::fields::FieldMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata for one image. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archiveid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImageMeta {
    /// Read the known fields out of a parsed sidecar. Empty values count as
    /// absent.
    pub fn from_fields(fields: &FieldMap) -> Self {
        let field = |name: &str| resolve(&[fields.scalar(name)]);
        Self {
            caption: field("caption"),
            copyright: field("copyright"),
            archiveid: field("archiveid"),
            alt: field("alt"),
        }
    }

    /// Fill fields missing here from `fallback`.
    pub fn or(self, fallback: &ImageMeta) -> Self {
        Self {
            caption: resolve(&[self.caption.as_deref(), fallback.caption.as_deref()]),
            copyright: resolve(&[self.copyright.as_deref(), fallback.copyright.as_deref()]),
            archiveid: resolve(&[self.archiveid.as_deref(), fallback.archiveid.as_deref()]),
            alt: resolve(&[self.alt.as_deref(), fallback.alt.as_deref()]),
        }
    }
}

/// First non-None, non-empty value of `sources`, trimmed.
///
/// ```text
/// caption: resolve(&[german_caption, english_caption])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Public URL of a file in a page directory:
/// `{base_url}{url_prefix}/{dir}/{filename}`.
pub fn image_url(assets: &AssetsConfig, dir_path: &str, filename: &str) -> String {
    let base = assets.base_url.trim_end_matches('/');
    let prefix = assets.url_prefix.trim_end_matches('/');
    format!("{base}{prefix}/{dir_path}/{filename}")
}

/// Alt text: `© copyright`, else the caption, else `fallback`.
pub fn image_alt(images: &BTreeMap<String, ImageMeta>, filename: &str, fallback: &str) -> String {
    let meta = images.get(filename);
    if let Some(copyright) = meta.and_then(|m| m.copyright.as_deref()) {
        return format!("© {copyright}");
    }
    if let Some(caption) = meta.and_then(|m| m.caption.as_deref()) {
        return caption.to_string();
    }
    fallback.to_string()
}

pub fn image_caption<'a>(images: &'a BTreeMap<String, ImageMeta>, filename: &str) -> Option<&'a str> {
    images.get(filename).and_then(|m| m.caption.as_deref())
}

pub fn image_copyright<'a>(
    images: &'a BTreeMap<String, ImageMeta>,
    filename: &str,
) -> Option<&'a str> {
    images.get(filename).and_then(|m| m.copyright.as_deref())
}
