//! Degraded-but-non-fatal outcomes of a parse or load.
//!
//! The corpus is hand-authored and static, so problems in individual files
//! never abort a load: a malformed block is dropped, a broken structured
//! value becomes an empty list, an unreadable file is treated as absent.
//! Each of those decisions is recorded as a [`Diagnostic`] and returned next
//! to the data, and also logged through `tracing`.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What went wrong. One variant per entry of the degradation taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    #[error("unreadable file: {reason}")]
    UnreadableFile { reason: String },
    #[error("malformed field block (no field name): {first_line:?}")]
    MalformedBlock { first_line: String },
    #[error("malformed structured value: {reason}")]
    MalformedStructured { reason: String },
    #[error("unknown template {name:?}")]
    UnknownTemplate { name: String },
    #[error("no {lang} content file, page skipped")]
    MissingLanguage { lang: String },
    #[error("second {lang} content file ignored")]
    DuplicateContent { lang: String },
    #[error("template {found:?} does not match page template {expected:?}")]
    TemplateMismatch { expected: String, found: String },
}

/// A [`Problem`] with the file and field it concerns, where known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(flatten)]
    pub problem: Problem,
}

impl Diagnostic {
    pub fn new(problem: Problem) -> Self {
        Self {
            path: None,
            field: None,
            problem,
        }
    }

    pub fn for_field(field: &str, problem: Problem) -> Self {
        Self {
            path: None,
            field: Some(field.to_string()),
            problem,
        }
    }

    pub fn at(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: ", path.display())?;
        }
        if let Some(field) = &self.field {
            write!(f, "[{field}] ")?;
        }
        write!(f, "{}", self.problem)
    }
}
