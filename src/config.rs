//! Archive configuration.
//!
//! Loaded from `config.toml` in the content root. Every key is optional; the
//! file is merged on top of the stock defaults, so it only needs the values
//! it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # Directories in the content root that never hold pages.
//! excluded_dirs = ["error"]
//!
//! # Template → fields decoded as structured lists. Templates without an
//! # entry (stock: credits, default) are classified by value shape.
//! [structured_fields]
//! colloquia = ["program", "gallery", "quotes"]
//! start = ["logos"]
//!
//! [assets]
//! url_prefix = "/content"   # Path prefix of page-directory files
//! base_url = ""             # CDN origin, prepended when set
//!
//! [markup]
//! external_link_target = true  # (link: …) to http(s) URLs opens a new tab
//!
//! [processing]
//! max_threads = 4           # Cap for the parallel page walk (omit = all cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early, and so are template names
//! outside the known template set.

use crate::kirbytext::LinkPolicy;
use crate::structured::HintTable;
use crate::types::Template;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Archive configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Root-level directories skipped by the loader. Hidden directories are
    /// always skipped.
    pub excluded_dirs: Vec<String>,
    /// Template name → structured field names.
    pub structured_fields: BTreeMap<String, Vec<String>>,
    /// Public URL construction for page-directory files.
    pub assets: AssetsConfig,
    /// Inline markup options.
    pub markup: MarkupConfig,
    /// Parallel loading settings.
    pub processing: ProcessingConfig,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        let structured_fields = HintTable::stock()
            .iter()
            .map(|(template, fields)| {
                (
                    template.as_str().to_string(),
                    fields.iter().cloned().collect(),
                )
            })
            .collect();
        Self {
            excluded_dirs: vec!["error".to_string()],
            structured_fields,
            assets: AssetsConfig::default(),
            markup: MarkupConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl ArchiveConfig {
    /// Validate values that serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.structured_fields.keys() {
            if name.parse::<Template>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "structured_fields: unknown template {name:?}"
                )));
            }
        }
        if !self.assets.url_prefix.is_empty() && !self.assets.url_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "assets.url_prefix must be empty or start with '/'".into(),
            ));
        }
        Ok(())
    }

    /// The structured-field table the classifier consumes.
    pub fn hint_table(&self) -> HintTable {
        self.structured_fields
            .iter()
            .filter_map(|(name, fields)| name.parse::<Template>().ok().map(|t| (t, fields)))
            .fold(HintTable::new(), |table, (template, fields)| {
                table.with(template, fields)
            })
    }

    pub fn link_policy(&self) -> LinkPolicy {
        LinkPolicy::from_flag(self.markup.external_link_target)
    }

    pub fn is_excluded(&self, dir_name: &str) -> bool {
        dir_name.starts_with('.') || self.excluded_dirs.iter().any(|d| d == dir_name)
    }
}

/// Public URL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Path prefix under which page directories are served.
    pub url_prefix: String,
    /// Origin prepended to every asset URL (e.g. a CDN). Empty for local.
    pub base_url: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/content".to_string(),
            base_url: String::new(),
        }
    }
}

/// Inline markup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    /// Link directives to absolute URLs without a `target:` open in a new tab.
    pub external_link_target: bool,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            external_link_target: true,
        }
    }
}

/// Parallel loading settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum threads for the page walk. When absent, all cores are used.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ArchiveConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ArchiveConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ArchiveConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root, on top of stock
/// defaults.
pub fn load_config(root: &Path) -> Result<ArchiveConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// A fully-commented stock `config.toml`. Printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Archive Content Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the content root. Unknown keys cause an error.

# Root-level directories that never hold pages. Directories starting
# with "." are always skipped.
excluded_dirs = ["error"]

# ---------------------------------------------------------------------------
# Structured fields
# ---------------------------------------------------------------------------
# Per template, the fields whose values are YAML lists of records.
# Every other field of that template stays free text. Templates not listed
# here (stock: credits, default) are classified by the shape of each value.
[structured_fields]
addon = ["gallery", "quotes"]
colloquia = ["gallery", "program", "quotes"]
gallery = ["gallery"]
participants = ["persons"]
publication = ["gallery"]
retrospect = ["quotes", "videosource"]
start = ["logos"]
video-gallery = ["panel1_videos", "panel2_videos", "panel3_videos", "panel4_videos"]

# ---------------------------------------------------------------------------
# Asset URLs
# ---------------------------------------------------------------------------
[assets]
# Path prefix under which page directories are served.
url_prefix = "/content"

# Origin prepended to asset URLs, e.g. "https://cdn.example.org".
base_url = ""

# ---------------------------------------------------------------------------
# Inline markup
# ---------------------------------------------------------------------------
[markup]
# (link: https://… text: …) without a target opens in a new tab.
external_link_target = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum threads for loading page directories.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
