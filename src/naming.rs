//! Filename conventions of the content root.
//!
//! ## Page directories
//!
//! Page directories carry an optional numeric sort prefix followed by a dash:
//! - `4-1979` → sort order 4
//! - `22-credits` → sort order 22
//! - `error` → no prefix, sorts last ([`SORT_SENTINEL`])
//!
//! ## Files inside a page directory
//!
//! - `<template>.<lang>.txt` → page content (`colloquia.de.txt`)
//! - `<image>.<ext>.<lang>.txt` → image metadata sidecar (`BHK_02_150.jpg.de.txt`)
//! - anything else (the images themselves, stray files) is ignored

use crate::types::Lang;

/// Sort order of directories without a numeric prefix.
pub const SORT_SENTINEL: u32 = 999;

/// Image extensions that make a `.txt` file an image sidecar (case-insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp"];

/// Numeric prefix of a `N-name` directory name. The dash is required:
/// `1979` alone is not a prefix.
pub fn sort_prefix(name: &str) -> Option<u32> {
    if let Some((prefix, _)) = name.split_once('-')
        && !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_digit())
        && let Ok(num) = prefix.parse::<u32>()
    {
        return Some(num);
    }
    None
}

/// Sort order of a page directory.
pub fn sort_order(dir_name: &str) -> u32 {
    sort_prefix(dir_name).unwrap_or(SORT_SENTINEL)
}

/// What a file inside a page directory is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// `<template>.<lang>.txt`; the template name is not validated here.
    Content { template: String, lang: Lang },
    /// `<image>.<lang>.txt` where `<image>` has an image extension.
    ImageMeta { image: String, lang: Lang },
    Other,
}

/// Classify a filename by the conventions above.
pub fn classify_file(filename: &str) -> FileKind {
    let Some(stem) = filename.strip_suffix(".txt") else {
        return FileKind::Other;
    };
    let Some((base, code)) = stem.rsplit_once('.') else {
        return FileKind::Other;
    };
    let Ok(lang) = code.parse::<Lang>() else {
        return FileKind::Other;
    };
    if base.is_empty() {
        return FileKind::Other;
    }

    if has_image_extension(base) {
        FileKind::ImageMeta {
            image: base.to_string(),
            lang,
        }
    } else {
        FileKind::Content {
            template: base.to_string(),
            lang,
        }
    }
}

fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
