//! Content directory loading.
//!
//! Walks the immediate subdirectories of a content root and turns each into a
//! [`Page`]. Produces a [`SiteData`] with all pages, the site-wide content and
//! every [`Diagnostic`] collected on the way.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root
//! ├── config.toml                  # Loader configuration (optional)
//! ├── site.de.txt                  # Site-wide fields, German
//! ├── site.en.txt                  # Site-wide fields, English (optional)
//! ├── 1-start/
//! │   └── start.de.txt             # Page content: <template>.<lang>.txt
//! ├── 4-1979/                      # Sort order 4
//! │   ├── colloquia.de.txt         # German content (mandatory)
//! │   ├── colloquia.en.txt         # English content (same template)
//! │   ├── BHK_02_150.jpg
//! │   ├── BHK_02_150.jpg.de.txt    # Image metadata sidecar
//! │   └── BHK_02_150.jpg.en.txt
//! ├── archiv/                      # No number prefix = sorts last
//! │   └── default.de.txt
//! └── error/                       # Excluded (see `excluded_dirs`)
//! ```
//!
//! ## Degradation
//!
//! Only a missing or non-directory root is an error. Everything below the
//! root degrades: unreadable files are treated as absent, unknown templates
//! are skipped, a directory without German content yields no page. Each case
//! is recorded as a diagnostic with the path relative to the root.
//!
//! ## Parallelism
//!
//! Page directories are independent, so they are loaded on a rayon pool
//! capped by `[processing] max_threads`. Results are collected in directory
//! name order and sorted by sort order afterwards, so the output does not
//! depend on scheduling.

use crate::config::{self, ArchiveConfig, ConfigError, effective_threads};
use crate::diagnostics::{Diagnostic, Problem};
use crate::fields::{FieldMap, parse_flat};
use crate::kirbytext::{self, LinkPolicy};
use crate::metadata::ImageMeta;
use crate::naming::{FileKind, classify_file, sort_order};
use crate::parse::parse_content;
use crate::structured::{Classifier, HintTable};
use crate::types::{Lang, Page, SiteContent, SiteData, Template};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Content root not found: {0}")]
    MissingRoot(PathBuf),
    #[error("Content root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Load a content root with the configuration found in its `config.toml`.
pub fn load(root: &Path) -> Result<SiteData, LoadError> {
    check_root(root)?;
    let config = config::load_config(root)?;
    load_with(root, &config)
}

/// Load a content root with an explicit configuration.
pub fn load_with(root: &Path, config: &ArchiveConfig) -> Result<SiteData, LoadError> {
    check_root(root)?;

    let dirs = collect_page_dirs(root, config)?;
    let hints = config.hint_table();
    let policy = config.link_policy();

    let load_all = || -> Vec<LoadedDir> {
        dirs.par_iter()
            .map(|slug| load_page(root, slug, &hints, policy))
            .collect()
    };
    let threads = effective_threads(&config.processing);
    let loaded = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(load_all),
        Err(e) => {
            warn!("could not build a {threads}-thread pool, using the global one: {e}");
            load_all()
        }
    };

    let mut diagnostics = Vec::new();
    let site = load_site(root, &mut diagnostics);

    let mut pages = Vec::with_capacity(loaded.len());
    for dir in loaded {
        diagnostics.extend(dir.diagnostics);
        pages.extend(dir.page);
    }
    // Stable: equal sort orders keep directory-name order.
    pages.sort_by_key(|p| p.sort_order);

    Ok(SiteData {
        site,
        pages,
        diagnostics,
    })
}

fn check_root(root: &Path) -> Result<(), LoadError> {
    if !root.exists() {
        return Err(LoadError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(LoadError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Names of the page directories in the root, sorted. Files at the root,
/// hidden directories and excluded directories are skipped.
fn collect_page_dirs(root: &Path, config: &ArchiveConfig) -> Result<Vec<String>, LoadError> {
    let mut dirs: Vec<String> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !config.is_excluded(name))
        .collect();

    dirs.sort();
    Ok(dirs)
}

/// Regular files of a page directory, sorted by name.
fn collect_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut files: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();

    files.sort();
    Ok(files)
}

/// Outcome of one page directory.
struct LoadedDir {
    page: Option<Page>,
    diagnostics: Vec<Diagnostic>,
}

/// A recognized content file: its template and filename.
struct ContentFile {
    template: Template,
    filename: String,
}

fn load_page(root: &Path, slug: &str, hints: &HintTable, policy: LinkPolicy) -> LoadedDir {
    let dir = root.join(slug);
    let rel_dir = Path::new(slug);
    let mut diagnostics = Vec::new();

    let files = match collect_files(&dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(dir = %slug, "cannot list page directory: {e}");
            diagnostics.push(unreadable(rel_dir, &e));
            return LoadedDir {
                page: None,
                diagnostics,
            };
        }
    };

    let mut content: BTreeMap<Lang, ContentFile> = BTreeMap::new();
    let mut sidecars: Vec<(String, Lang, String)> = Vec::new();

    for filename in files {
        let rel = rel_dir.join(&filename);
        match classify_file(&filename) {
            FileKind::Content { template, lang } => {
                let Ok(template) = template.parse::<Template>() else {
                    warn!(file = %rel.display(), "unknown template {template:?}, file skipped");
                    diagnostics
                        .push(Diagnostic::new(Problem::UnknownTemplate { name: template }).at(&rel));
                    continue;
                };
                if content.contains_key(&lang) {
                    diagnostics.push(
                        Diagnostic::new(Problem::DuplicateContent {
                            lang: lang.code().to_string(),
                        })
                        .at(&rel),
                    );
                    continue;
                }
                content.insert(lang, ContentFile { template, filename });
            }
            FileKind::ImageMeta { image, lang } => sidecars.push((image, lang, filename)),
            FileKind::Other => {}
        }
    }

    let Some(de_file) = content.remove(&Lang::PRIMARY) else {
        warn!(dir = %slug, "no German content file, page skipped");
        diagnostics.push(
            Diagnostic::new(Problem::MissingLanguage {
                lang: Lang::PRIMARY.code().to_string(),
            })
            .at(rel_dir),
        );
        return LoadedDir {
            page: None,
            diagnostics,
        };
    };
    let template = de_file.template;

    let Some(de) = read_content(&dir, rel_dir, &de_file, hints, policy, &mut diagnostics) else {
        return LoadedDir {
            page: None,
            diagnostics,
        };
    };

    let en = content.remove(&Lang::En).and_then(|en_file| {
        if en_file.template != template {
            diagnostics.push(
                Diagnostic::new(Problem::TemplateMismatch {
                    expected: template.to_string(),
                    found: en_file.template.to_string(),
                })
                .at(&rel_dir.join(&en_file.filename)),
            );
            return None;
        }
        read_content(&dir, rel_dir, &en_file, hints, policy, &mut diagnostics)
    });

    let images = read_sidecars(&dir, rel_dir, sidecars, &mut diagnostics);

    let page = Page {
        slug: slug.to_string(),
        sort_order: sort_order(slug),
        template,
        de,
        en,
        images,
        dir_path: slug.to_string(),
    };
    debug!(
        slug = %page.slug,
        template = %page.template,
        fields = page.de.len(),
        english = page.en.is_some(),
        images = page.images.len(),
        "loaded page"
    );

    LoadedDir {
        page: Some(page),
        diagnostics,
    }
}

/// Parse a content file and apply the inline rewrites to its scalar fields.
fn read_content(
    dir: &Path,
    rel_dir: &Path,
    file: &ContentFile,
    hints: &HintTable,
    policy: LinkPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<FieldMap> {
    let rel = rel_dir.join(&file.filename);
    let text = read_file(&dir.join(&file.filename), &rel, diagnostics)?;
    let parsed = parse_content(&text, &Classifier::for_template(file.template, hints));
    diagnostics.extend(parsed.diagnostics.into_iter().map(|d| d.at(&rel)));
    Some(
        parsed
            .fields
            .map_scalars(|s| kirbytext::transform(s, policy)),
    )
}

/// Image metadata per image file, German values first, English filling gaps.
fn read_sidecars(
    dir: &Path,
    rel_dir: &Path,
    sidecars: Vec<(String, Lang, String)>,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<String, ImageMeta> {
    let mut by_image: BTreeMap<String, BTreeMap<Lang, ImageMeta>> = BTreeMap::new();
    for (image, lang, filename) in sidecars {
        let rel = rel_dir.join(&filename);
        if let Some(text) = read_file(&dir.join(&filename), &rel, diagnostics) {
            let meta = ImageMeta::from_fields(&parse_flat(&text));
            by_image.entry(image).or_default().insert(lang, meta);
        }
    }

    by_image
        .into_iter()
        .map(|(image, mut langs)| {
            let de = langs.remove(&Lang::De).unwrap_or_default();
            let en = langs.remove(&Lang::En).unwrap_or_default();
            (image, de.or(&en))
        })
        .collect()
}

/// `site.de.txt` and `site.en.txt` as flat maps. A missing German file is an
/// empty map.
fn load_site(root: &Path, diagnostics: &mut Vec<Diagnostic>) -> SiteContent {
    SiteContent {
        de: read_site_file(root, Lang::De, diagnostics).unwrap_or_default(),
        en: read_site_file(root, Lang::En, diagnostics),
    }
}

fn read_site_file(root: &Path, lang: Lang, diagnostics: &mut Vec<Diagnostic>) -> Option<FieldMap> {
    let filename = format!("site.{}.txt", lang.code());
    let path = root.join(&filename);
    if !path.is_file() {
        return None;
    }
    read_file(&path, Path::new(&filename), diagnostics).map(|text| parse_flat(&text))
}

fn read_file(path: &Path, rel: &Path, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(file = %rel.display(), "unreadable file, treated as absent: {e}");
            diagnostics.push(unreadable(rel, &e));
            None
        }
    }
}

fn unreadable(rel: &Path, e: &std::io::Error) -> Diagnostic {
    Diagnostic::new(Problem::UnreadableFile {
        reason: e.to_string(),
    })
    .at(rel)
}
