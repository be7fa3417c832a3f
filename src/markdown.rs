//! Markdown rendering for scalar text fields.
//!
//! Text goes through the legacy inline rewrites first, then a GFM-style
//! markdown pass. Soft line breaks stay soft. Markdown links to absolute
//! URLs open in a new tab with `rel="noreferrer"`; relative links render
//! plainly.

use crate::kirbytext::{self, LinkPolicy, is_absolute_url};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use pulldown_cmark_escape::{escape_href, escape_html};

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render one field's text to HTML. Empty input renders to an empty string.
pub fn render_markdown(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let source = kirbytext::transform(text, LinkPolicy::ExternalBlank);

    // One entry per open link: whether its start tag was replaced.
    let mut replaced: Vec<bool> = Vec::new();
    let events = Parser::new_ext(&source, options()).map(|event| match event {
        Event::Start(Tag::Link {
            dest_url, title, ..
        }) if is_absolute_url(&dest_url) => {
            replaced.push(true);
            Event::InlineHtml(external_anchor(&dest_url, &title))
        }
        Event::Start(tag @ Tag::Link { .. }) => {
            replaced.push(false);
            Event::Start(tag)
        }
        Event::End(TagEnd::Link) => {
            if replaced.pop().unwrap_or(false) {
                Event::InlineHtml("</a>".into())
            } else {
                Event::End(TagEnd::Link)
            }
        }
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn external_anchor(href: &str, title: &str) -> CowStr<'static> {
    let mut tag = String::from("<a href=\"");
    // Writing into a String cannot fail.
    let _ = escape_href(&mut tag, href);
    tag.push_str("\" target=\"_blank\" rel=\"noreferrer\"");
    if !title.is_empty() {
        tag.push_str(" title=\"");
        let _ = escape_html(&mut tag, title);
        tag.push('"');
    }
    tag.push('>');
    tag.into()
}
