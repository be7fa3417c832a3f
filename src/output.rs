//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every page leads with
//! its positional index and title; the directory it came from, its template
//! and what it contains follow as indented context lines. The result reads as
//! an inventory of the archive while still pointing back to the files.
//!
//! # Output Format
//!
//! ```text
//! Site
//!     Internationale Bauhaus-Kolloquien
//!     Languages: de, en
//!
//! Pages
//! 001 Start (start)
//!     Source: 1-start/
//!     Fields: 3, structured: logos
//!     English: 2 fields
//! 002 II. Internationales Bauhaus-Kolloquium (colloquia)
//!     Source: 4-1979/
//!     Fields: 9, structured: gallery, program, quotes
//!     English: 2 fields
//!     Images: 1 with metadata
//!
//! Diagnostics
//!     40-entwurf: no de content file, page skipped
//!
//! Loaded 2 pages, 1 diagnostic
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::diagnostics::Diagnostic;
use crate::fields::{FieldMap, FieldValue};
use crate::types::{Page, SiteData};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
///
/// Scalar fields are already link-rewritten at load time, so titles may
/// carry anchors.
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

/// Count with a singular or plural noun: `1 page`, `2 pages`.
fn plural(n: usize, singular: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {singular}s")
    }
}

/// Display title of a page: its German `title` field, else the slug.
fn page_title(page: &Page) -> String {
    page.de
        .scalar("title")
        .map(|t| truncate(strip_html_tags(t).trim(), 60))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| page.slug.clone())
}

/// Names of the structured fields of a map, in key order.
fn structured_names(fields: &FieldMap) -> Vec<&str> {
    fields
        .iter()
        .filter(|(_, v)| matches!(v, FieldValue::StructuredList(_)))
        .map(|(name, _)| name)
        .collect()
}

// ============================================================================
// Load / check output
// ============================================================================

/// Format the inventory of a loaded content root.
pub fn format_load_output(site: &SiteData) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Site".to_string());
    let title = site.site.title();
    lines.push(format!(
        "{}{}",
        indent(1),
        if title.is_empty() { "(untitled)" } else { title }
    ));
    let languages = if site.site.en.is_some() { "de, en" } else { "de" };
    lines.push(format!("{}Languages: {}", indent(1), languages));

    lines.push(String::new());
    lines.push("Pages".to_string());
    for (i, page) in site.pages.iter().enumerate() {
        lines.extend(format_page(i + 1, page));
    }

    let diagnostics = format_diagnostics(&site.diagnostics);
    if !diagnostics.is_empty() {
        lines.push(String::new());
        lines.extend(diagnostics);
    }

    lines.push(String::new());
    lines.push(format!(
        "Loaded {}, {}",
        plural(site.pages.len(), "page"),
        plural(site.diagnostics.len(), "diagnostic")
    ));

    lines
}

/// Header line plus context lines for one page.
fn format_page(index: usize, page: &Page) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} ({})",
        format_index(index),
        page_title(page),
        page.template
    )];
    let ctx = indent(1);

    lines.push(format!("{ctx}Source: {}/", page.dir_path));

    let structured = structured_names(&page.de);
    if structured.is_empty() {
        lines.push(format!("{ctx}Fields: {}", page.de.len()));
    } else {
        lines.push(format!(
            "{ctx}Fields: {}, structured: {}",
            page.de.len(),
            structured.join(", ")
        ));
    }

    if let Some(en) = &page.en {
        lines.push(format!("{ctx}English: {}", plural(en.len(), "field")));
    }
    if !page.images.is_empty() {
        lines.push(format!("{ctx}Images: {} with metadata", page.images.len()));
    }

    lines
}

/// Format diagnostics as a titled section. Empty input gives no lines.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    if diagnostics.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Diagnostics".to_string()];
    lines.extend(diagnostics.iter().map(|d| format!("{}{}", indent(1), d)));
    lines
}

/// Print the load inventory to stdout.
pub fn print_load_output(site: &SiteData) {
    for line in format_load_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Problem;
    use crate::types::Template;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn page(slug: &str, fields: &[(&str, FieldValue)]) -> Page {
        Page {
            slug: slug.into(),
            sort_order: crate::naming::sort_order(slug),
            template: Template::Colloquia,
            de: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            en: None,
            images: BTreeMap::new(),
            dir_path: slug.into(),
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn strip_html_tags_removes_tags() {
        assert_eq!(strip_html_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_html_tags("plain text"), "plain text");
        assert_eq!(strip_html_tags(""), "");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Short text", 40), "Short text");
        assert_eq!(truncate(&"a".repeat(40), 40), "a".repeat(40));
        assert_eq!(truncate(&"ä".repeat(50), 40), format!("{}...", "ä".repeat(40)));
        assert_eq!(truncate("", 40), "");
    }

    #[test]
    fn format_index_padding() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(0, "page"), "0 pages");
        assert_eq!(plural(1, "page"), "1 page");
        assert_eq!(plural(2, "diagnostic"), "2 diagnostics");
    }

    // =========================================================================
    // Page display
    // =========================================================================

    #[test]
    fn page_header_uses_title_then_slug() {
        let titled = page(
            "4-1979",
            &[("title", FieldValue::Scalar("II. Kolloquium".into()))],
        );
        assert_eq!(format_page(1, &titled)[0], "001 II. Kolloquium (colloquia)");

        let untitled = page("archiv", &[]);
        assert_eq!(format_page(7, &untitled)[0], "007 archiv (colloquia)");
    }

    #[test]
    fn page_title_strips_anchors() {
        let linked = page(
            "4-1979",
            &[(
                "title",
                FieldValue::Scalar(r#"<a href="/x">Kolloquium</a>"#.into()),
            )],
        );
        assert_eq!(page_title(&linked), "Kolloquium");
    }

    #[test]
    fn page_context_lists_structured_fields() {
        let p = page(
            "4-1979",
            &[
                ("year", FieldValue::Scalar("1979".into())),
                ("gallery", FieldValue::StructuredList(vec![])),
                ("quotes", FieldValue::StructuredList(vec![])),
            ],
        );
        let lines = format_page(1, &p);
        assert_eq!(lines[1], "    Source: 4-1979/");
        assert_eq!(lines[2], "    Fields: 3, structured: gallery, quotes");
        assert_eq!(lines.len(), 3);
    }

    // =========================================================================
    // Whole output
    // =========================================================================

    #[test]
    fn load_output_sections() {
        let site = SiteData {
            pages: vec![page("4-1979", &[])],
            diagnostics: vec![
                Diagnostic::new(Problem::MissingLanguage { lang: "de".into() })
                    .at(Path::new("40-entwurf")),
            ],
            ..Default::default()
        };
        let lines = format_load_output(&site);
        assert_eq!(lines[0], "Site");
        assert_eq!(lines[1], "    (untitled)");
        assert!(lines.contains(&"Pages".to_string()));
        assert!(lines.contains(&"Diagnostics".to_string()));
        assert!(lines.contains(&"    40-entwurf: no de content file, page skipped".to_string()));
        assert_eq!(lines.last().unwrap(), "Loaded 1 page, 1 diagnostic");
    }

    #[test]
    fn no_diagnostics_section_when_clean() {
        let site = SiteData::default();
        let lines = format_load_output(&site);
        assert!(!lines.contains(&"Diagnostics".to_string()));
        assert_eq!(lines.last().unwrap(), "Loaded 0 pages, 0 diagnostics");
        assert!(format_diagnostics(&[]).is_empty());
    }
}
