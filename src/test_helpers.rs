//! Shared test utilities for the archive-content test suite.
//!
//! Provides fixture setup, page-writing helpers and lookups over the
//! load-phase data structures (`SiteData`, `Page`, `Diagnostic`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = load(tmp.path()).unwrap();
//!
//! let page = find_page(&site, "4-1979");
//! assert_eq!(page.de.scalar("year"), Some("1979"));
//! assert_eq!(page_slugs(&site)[0], "1-start");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::diagnostics::Problem;
use crate::types::{Page, SiteData};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `content` to `root/dir/filename`, creating the directory.
pub fn write_page(root: &Path, dir: &str, filename: &str, content: &str) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(filename), content).unwrap();
}

// =========================================================================
// SiteData lookups — panics with a clear message on miss
// =========================================================================

/// Find a page by slug. Panics if not found.
pub fn find_page<'a>(site: &'a SiteData, slug: &str) -> &'a Page {
    site.page(slug).unwrap_or_else(|| {
        let slugs = page_slugs(site);
        panic!("page '{slug}' not found. Available: {slugs:?}")
    })
}

/// All page slugs in load order.
pub fn page_slugs(site: &SiteData) -> Vec<&str> {
    site.pages.iter().map(|p| p.slug.as_str()).collect()
}

/// All diagnostic problems in report order.
pub fn problems(site: &SiteData) -> Vec<&Problem> {
    site.diagnostics.iter().map(|d| &d.problem).collect()
}
