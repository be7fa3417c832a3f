//! Content-file parsing: tokenize, normalize, classify, decode.
//!
//! [`parse_content`] is a pure function of the file text and a
//! [`Classify`] strategy. Problems are returned next to the fields rather
//! than raised: malformed blocks are dropped, structured values that fail to
//! decode become empty lists.

use crate::diagnostics::{Diagnostic, Problem};
use crate::fields::{Block, FieldMap, FieldValue, tokenize};
use crate::structured::{Classify, decode_list};
use tracing::warn;

/// A parsed content file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    pub fields: FieldMap,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn parse_content(text: &str, classifier: &impl Classify) -> Parsed {
    let mut parsed = Parsed::default();

    for block in tokenize(text) {
        let field = match block {
            Block::Field(field) => field,
            Block::Malformed(first_line) => {
                parsed
                    .diagnostics
                    .push(Diagnostic::new(Problem::MalformedBlock { first_line }));
                continue;
            }
        };

        let value = if classifier.is_structured(&field.name, &field.value) {
            match decode_list(&field.value) {
                Ok(items) => FieldValue::StructuredList(items),
                Err(e) => {
                    let preview: String = field.value.chars().take(100).collect();
                    warn!(field = %field.name, %preview, "failed to decode structured field: {e}");
                    parsed.diagnostics.push(Diagnostic::for_field(
                        &field.name,
                        Problem::MalformedStructured {
                            reason: e.to_string(),
                        },
                    ));
                    FieldValue::StructuredList(Vec::new())
                }
            }
        } else {
            FieldValue::Scalar(field.value)
        };

        parsed.fields.insert(&field.name, value);
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::{Classifier, Heuristic, HintTable};
    use crate::types::Template;

    const COLLOQUIA: &str = r#"Year: 1979

----

Title: 1979

----

Name: II. Bauhaus-Kolloquium

----

Website:

----

Edition: 2

----

Date-start: 1979-06-27

----

Gallery:

-
  group: "2"
  image: BHK_02_150.jpg
  position: "1"
  column: left
-
  group: "2"
  image: BHK_02_25.jpg
  position: "3"
  column: left

----

Quotes:

-
  group: "4"
  blockquote: 'A quote here'
  source: >
    Someone, 2016
  position: "4"
  column: left

----

Text-intro:

#### 60 Jahre Gründung des Bauhauses

- Ines Weizman
- Robin Weißenborn

----

Text: Main content here"#;

    fn colloquia() -> Parsed {
        let table = HintTable::stock();
        parse_content(
            COLLOQUIA,
            &Classifier::for_template(Template::Colloquia, &table),
        )
    }

    #[test]
    fn scalar_fields() {
        let p = colloquia();
        assert_eq!(p.fields.scalar("year"), Some("1979"));
        assert_eq!(p.fields.scalar("name"), Some("II. Bauhaus-Kolloquium"));
        assert_eq!(p.fields.scalar("website"), Some(""));
        assert_eq!(p.fields.scalar("date_start"), Some("1979-06-27"));
        assert_eq!(p.fields.scalar("text"), Some("Main content here"));
        assert!(p.diagnostics.is_empty());
    }

    #[test]
    fn hinted_structured_fields() {
        let p = colloquia();
        let gallery = p.fields.list("gallery").unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery[0]["image"], "BHK_02_150.jpg");
        assert_eq!(gallery[1]["position"], "3");

        let quotes = p.fields.list("quotes").unwrap();
        assert_eq!(quotes[0]["blockquote"], "A quote here");
        assert_eq!(quotes[0]["source"], "Someone, 2016");
    }

    #[test]
    fn hinted_field_missing_from_file_is_absent() {
        assert!(!colloquia().fields.contains("program"));
    }

    #[test]
    fn markdown_list_stays_scalar() {
        let p = colloquia();
        let intro = p.fields.scalar("text_intro").unwrap();
        assert!(intro.contains("60 Jahre"));
        assert!(intro.contains("- Ines Weizman"));
    }

    #[test]
    fn parsing_is_deterministic() {
        assert_eq!(colloquia(), colloquia());
    }

    #[test]
    fn heuristic_mode_detects_lists() {
        let text = "Gallery: \n\n- \n  image: test.jpg\n  column: left\n- \n  image: test2.jpg\n  column: right\n\n----\n\nTitle: Test";
        let p = parse_content(text, &Heuristic);
        assert_eq!(p.fields.scalar("title"), Some("Test"));
        let gallery = p.fields.list("gallery").unwrap();
        assert_eq!(gallery[1]["image"], "test2.jpg");
        assert_eq!(gallery[1]["column"], "right");
    }

    #[test]
    fn heuristic_mode_keeps_prose_with_a_later_record_shape() {
        let text = "Text: Unsere Partner\n\n-\n  Hinweis: siehe unten\n\n----\n\nTitle: X";
        let p = parse_content(text, &Heuristic);
        assert_eq!(
            p.fields.scalar("text"),
            Some("Unsere Partner\n\n-\n  Hinweis: siehe unten")
        );
        assert!(p.diagnostics.is_empty());
    }

    #[test]
    fn empty_hinted_field_is_empty_list() {
        let table = HintTable::stock();
        let p = parse_content(
            "Gallery: \n\n----\n\nTitle: X",
            &Classifier::for_template(Template::Gallery, &table),
        );
        assert_eq!(p.fields.list("gallery").map(<[_]>::len), Some(0));
        assert!(p.diagnostics.is_empty());
    }

    #[test]
    fn broken_structured_value_degrades_to_empty_list() {
        let table = HintTable::stock();
        let p = parse_content(
            "Gallery: just some words\n\n----\n\nTitle: Still here",
            &Classifier::for_template(Template::Gallery, &table),
        );
        assert_eq!(p.fields.list("gallery").map(<[_]>::len), Some(0));
        assert_eq!(p.fields.scalar("title"), Some("Still here"));
        assert_eq!(p.diagnostics.len(), 1);
        assert_eq!(p.diagnostics[0].field.as_deref(), Some("gallery"));
        assert!(matches!(
            p.diagnostics[0].problem,
            Problem::MalformedStructured { .. }
        ));
    }

    #[test]
    fn malformed_block_reported_and_dropped() {
        let p = parse_content("Title: A\n----\nno colon here\n----\nYear: 1", &Heuristic);
        assert_eq!(p.fields.len(), 2);
        assert_eq!(
            p.diagnostics,
            vec![Diagnostic::new(Problem::MalformedBlock {
                first_line: "no colon here".into()
            })]
        );
    }

    #[test]
    fn video_gallery_panel_field_names_normalize_before_hint_lookup() {
        let table = HintTable::stock();
        let text = "Panel1-videos: \n\n- \n  title: Introduction\n  duration_min: \"9\"\n\n----\n\nTitle: Videos";
        let p = parse_content(
            text,
            &Classifier::for_template(Template::VideoGallery, &table),
        );
        let videos = p.fields.list("panel1_videos").unwrap();
        assert_eq!(videos[0]["title"], "Introduction");
        assert_eq!(videos[0]["duration_min"], "9");
    }
}
