//! # Archive Content
//!
//! A typed loader for flat-file exhibition archives. Content lives in plain
//! text files in the on-disk format of the Kirby CMS: one directory per page,
//! one file per template and language, fields separated by `----` lines.
//! This crate recovers that content losslessly into typed pages.
//!
//! # Architecture: Parse Once, Render Lazily
//!
//! ```text
//! 1. Tokenize   file text  →  field blocks       (fields)
//! 2. Classify   field      →  scalar | list       (structured)
//! 3. Decode     list text  →  Vec<Record>         (structured)
//! 4. Rewrite    scalar     →  inline-HTML text    (kirbytext)
//! 5. Assemble   directory  →  Page                (load)
//! 6. Render     one field  →  HTML, on demand     (markdown)
//! ```
//!
//! Steps 1–3 are pure functions of the file text ([`parse::parse_content`]).
//! The loader runs them per file, applies step 4 to every scalar, and orders
//! the pages. Rendering is left to the consumer, one field at a time.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fields`] | Delimiter tokenizer, field-name normalization, `FieldMap` |
//! | [`structured`] | Hinted / heuristic classification and YAML list decoding |
//! | [`parse`] | One content file → fields plus diagnostics |
//! | [`kirbytext`] | `(link: …)` directives and `****` rules |
//! | [`markdown`] | Field text → HTML via pulldown-cmark |
//! | [`load`] | Content root → ordered pages, site content, diagnostics |
//! | [`naming`] | `N-name` directory prefixes and file classification |
//! | [`metadata`] | Image sidecar metadata and asset URLs |
//! | [`present`] | Typed records, column layout, German date ranges |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`diagnostics`] | Non-fatal problems found while parsing or loading |
//! | [`types`] | `Page`, `SiteData`, templates and languages |
//! | [`output`] | CLI inventory formatting |
//!
//! # Design Decisions
//!
//! ## Best-Effort Loading
//!
//! The corpus is hand-written and static. A single broken file must not hide
//! the rest of the archive, so the loader never fails on content: broken
//! blocks are dropped, broken lists become empty, unreadable files count as
//! absent. Every such decision is returned as a [`diagnostics::Diagnostic`]
//! next to the data. Only a missing content root or an invalid
//! `config.toml` is an error.
//!
//! ## Structured Fields Are Configuration
//!
//! Which fields of a template hold YAML lists is data, not code: the stock
//! table ships in [`structured::HintTable::stock`] and can be overridden per
//! template in `config.toml`. Templates without an entry fall back to a
//! shape heuristic, so the `credits` page with its ad-hoc sponsor lists still
//! decodes.
//!
//! ## German First
//!
//! German content is mandatory; English is a partial overlay. A page without
//! a German file does not exist. [`types::Page::localized`] falls back to
//! German field by field, and image sidecars merge the same way.

pub mod config;
pub mod diagnostics;
pub mod fields;
pub mod kirbytext;
pub mod load;
pub mod markdown;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod parse;
pub mod present;
pub mod structured;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
