//! Legacy inline markup that standard markdown does not cover.
//!
//! Two rewrites, applied in this order:
//!
//! 1. Link directives: `(link: URL text: LABEL target: TARGET)` becomes an
//!    `<a>` element. `target:` is optional.
//! 2. Rule markers: a line of four or more `*` becomes `<hr>`.
//!
//! Both are pure and idempotent; running them over their own output changes
//! nothing, so text transformed at load time can be rendered again safely.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static LINK_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(link:\s*([^\s)]+)\s+text:\s*([^)]*?)(?:\s+target:\s*([^)]*?))?\)")
        .expect("valid regex")
});

static RULE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*{4,}[ \t]*$").expect("valid regex"));

/// How a link directive without an explicit `target:` is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Only the directive's own attributes.
    Bare,
    /// Absolute `http(s)` URLs open in a new tab.
    #[default]
    ExternalBlank,
}

impl LinkPolicy {
    pub fn from_flag(external_link_target: bool) -> Self {
        if external_link_target {
            LinkPolicy::ExternalBlank
        } else {
            LinkPolicy::Bare
        }
    }
}

/// True for `http://` and `https://` URLs.
pub fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Rewrite every link directive in `text` to an anchor.
///
/// A `_blank` target, explicit or inferred, always carries
/// `rel="noreferrer"`. The label is inserted verbatim.
pub fn rewrite_links(text: &str, policy: LinkPolicy) -> String {
    LINK_DIRECTIVE
        .replace_all(text, |caps: &Captures| {
            let href = caps[1].trim();
            let label = caps[2].trim();
            let explicit = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();

            let target = if !explicit.is_empty() {
                explicit
            } else if policy == LinkPolicy::ExternalBlank && is_absolute_url(href) {
                "_blank"
            } else {
                ""
            };

            let mut anchor = format!("<a href=\"{href}\"");
            if !target.is_empty() {
                anchor.push_str(&format!(" target=\"{target}\""));
            }
            if target == "_blank" {
                anchor.push_str(" rel=\"noreferrer\"");
            }
            anchor.push_str(&format!(">{label}</a>"));
            anchor
        })
        .into_owned()
}

/// Replace lines made only of four or more asterisks with `<hr>`.
///
/// `**bold**` and shorter runs are left alone.
pub fn rewrite_rules(text: &str) -> String {
    RULE_MARKER.replace_all(text, "<hr>").into_owned()
}

/// Both rewrites, links first.
pub fn transform(text: &str, policy: LinkPolicy) -> String {
    rewrite_rules(&rewrite_links(text, policy))
}
