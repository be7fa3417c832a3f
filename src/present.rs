//! Typed access to structured records for page presentation.
//!
//! Structured fields load as lists of string records. The types here give
//! those records names: a gallery entry, a quote, a video, a logo, a person.
//! Missing keys default to empty strings, so a sparse record still converts.
//!
//! Colloquia pages lay their galleries, programs and quotes out in two
//! columns; [`sort_into_columns`] and [`merge_column_items`] compute that
//! layout from each item's `column` and `position` fields.

use crate::fields::FieldMap;
use crate::types::Lang;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One image of a gallery or program block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryItem {
    pub image: String,
    pub group: String,
    pub position: String,
    pub column: String,
}

/// Program entries share the gallery shape.
pub type ProgramItem = GalleryItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteItem {
    pub blockquote: String,
    pub source: String,
    pub blockquote_en: String,
    pub source_en: String,
    pub position: String,
    pub column: String,
    pub group: String,
}

impl QuoteItem {
    /// Quote text in `lang`, German when no translation exists.
    pub fn blockquote_in(&self, lang: Lang) -> &str {
        localized(&self.blockquote, &self.blockquote_en, lang)
    }

    pub fn source_in(&self, lang: Lang) -> &str {
        localized(&self.source, &self.source_en, lang)
    }
}

fn localized<'a>(de: &'a str, en: &'a str, lang: Lang) -> &'a str {
    match lang {
        Lang::En if !en.trim().is_empty() => en,
        _ => de,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoItem {
    pub title: String,
    pub thumbnail: String,
    pub filename: String,
    /// Comma-separated encoded sizes, e.g. `"480, 720, 1080"`.
    pub sizes: String,
    pub duration_min: String,
    pub duration_sec: String,
}

impl VideoItem {
    /// Running time as `M:SS`. Unparseable parts count as zero.
    pub fn duration(&self) -> String {
        let min = parse_int_prefix(&self.duration_min).unwrap_or(0);
        let sec = parse_int_prefix(&self.duration_sec).unwrap_or(0);
        format!("{min}:{sec:02}")
    }

    pub fn size_list(&self) -> Vec<&str> {
        self.sizes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoItem {
    pub image: String,
    pub position: String,
}

/// A participant. Every key besides `name` and `country` is a year column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonItem {
    pub name: String,
    pub country: String,
    #[serde(flatten)]
    pub years: BTreeMap<String, String>,
}

impl PersonItem {
    /// Years with a non-empty mark, ascending.
    pub fn attended(&self) -> Vec<u16> {
        self.years
            .iter()
            .filter(|(_, mark)| !mark.trim().is_empty())
            .filter_map(|(year, _)| year.parse().ok())
            .collect()
    }
}

impl FieldMap {
    /// Typed items of a structured field. Empty for scalar or absent fields;
    /// records that do not fit `T` are skipped.
    pub fn items<T: DeserializeOwned>(&self, name: &str) -> Vec<T> {
        self.list(name)
            .unwrap_or_default()
            .iter()
            .filter_map(|record| {
                serde_json::to_value(record)
                    .and_then(serde_json::from_value)
                    .ok()
            })
            .collect()
    }
}

// =============================================================================
// Dates
// =============================================================================

const GERMAN_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// German day range of two ISO dates, month taken from the end date:
/// `("1979-06-27", "1979-06-29")` → `"27.–29. Juni"`.
///
/// Empty when either date is missing, has fewer than three `-` parts, or has
/// no leading digits in its day part.
pub fn format_date_range(start: Option<&str>, end: Option<&str>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };
    let start: Vec<&str> = start.split('-').collect();
    let end: Vec<&str> = end.split('-').collect();
    if start.len() < 3 || end.len() < 3 {
        return String::new();
    }

    let (Some(start_day), Some(end_day)) = (parse_int_prefix(start[2]), parse_int_prefix(end[2]))
    else {
        return String::new();
    };
    let month = german_month(end[1]).unwrap_or_default();

    format!("{start_day}.–{end_day}. {month}")
        .trim_end()
        .to_string()
}

/// Month name for a two-digit month number (`"06"` → `"Juni"`).
fn german_month(number: &str) -> Option<&'static str> {
    if number.len() != 2 {
        return None;
    }
    let n: usize = number.parse().ok()?;
    GERMAN_MONTHS.get(n.checked_sub(1)?).copied()
}

/// Leading integer of `s` after trimming, with an optional sign:
/// `"12px"` → 12, `"-3"` → -3, `"x1"` → None.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

// =============================================================================
// Column layout
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

/// `right`, `r` and `rechts` (any case, surrounding whitespace ignored) are
/// the right column; anything else is the left one.
pub fn normalize_column(value: &str) -> Column {
    match value.trim().to_lowercase().as_str() {
        "right" | "r" | "rechts" => Column::Right,
        _ => Column::Left,
    }
}

/// Position slot 0..=9; `fallback` when missing or not a number.
pub fn normalize_position(value: &str, fallback: u8) -> u8 {
    parse_int_prefix(value)
        .map(|n| n.clamp(0, 9) as u8)
        .unwrap_or(fallback)
}

/// An item that can be placed in a two-column layout.
pub trait Placed {
    fn column(&self) -> &str;
    fn position(&self) -> &str;
}

impl Placed for GalleryItem {
    fn column(&self) -> &str {
        &self.column
    }
    fn position(&self) -> &str {
        &self.position
    }
}

impl Placed for QuoteItem {
    fn column(&self) -> &str {
        &self.column
    }
    fn position(&self) -> &str {
        &self.position
    }
}

/// Logos have no column and always land left.
impl Placed for LogoItem {
    fn column(&self) -> &str {
        ""
    }
    fn position(&self) -> &str {
        &self.position
    }
}

/// An item with its block kind (`"gallery"`, `"program"`, `"quote"`) and
/// resolved position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnItem<T> {
    pub kind: String,
    pub position: u8,
    pub item: T,
}

impl<T> ColumnItem<T> {
    /// Convert the payload, e.g. into an enum so different kinds can be
    /// merged into one column.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ColumnItem<U> {
        ColumnItem {
            kind: self.kind,
            position: self.position,
            item: f(self.item),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Columns<T> {
    pub left: Vec<ColumnItem<T>>,
    pub right: Vec<ColumnItem<T>>,
}

impl<T> Default for Columns<T> {
    fn default() -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
        }
    }
}

/// Split items into left and right columns, each sorted by position.
/// Items with equal positions keep their input order.
pub fn sort_into_columns<T: Placed>(
    items: impl IntoIterator<Item = T>,
    kind: &str,
    default_position: u8,
) -> Columns<T> {
    let mut columns = Columns::default();
    for item in items {
        let entry = ColumnItem {
            kind: kind.to_string(),
            position: normalize_position(item.position(), default_position),
            item,
        };
        match normalize_column(entry.item.column()) {
            Column::Left => columns.left.push(entry),
            Column::Right => columns.right.push(entry),
        }
    }
    columns.left.sort_by_key(|e| e.position);
    columns.right.sort_by_key(|e| e.position);
    columns
}

/// Concatenate column lists and re-sort by position (stable).
pub fn merge_column_items<T>(
    lists: impl IntoIterator<Item = Vec<ColumnItem<T>>>,
) -> Vec<ColumnItem<T>> {
    let mut merged: Vec<ColumnItem<T>> = lists.into_iter().flatten().collect();
    merged.sort_by_key(|e| e.position);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_content;
    use crate::structured::{Classifier, HintTable};
    use crate::types::Template;

    fn colloquia(text: &str) -> FieldMap {
        let table = HintTable::stock();
        parse_content(text, &Classifier::for_template(Template::Colloquia, &table)).fields
    }

    fn gallery(column: &str, position: &str, image: &str) -> GalleryItem {
        GalleryItem {
            image: image.into(),
            column: column.into(),
            position: position.into(),
            ..Default::default()
        }
    }

    // =========================================================================
    // Typed items
    // =========================================================================

    #[test]
    fn gallery_items_from_records() {
        let fields = colloquia(
            "Gallery:\n\n- \n  image: a.jpg\n  position: \"2\"\n  column: rechts\n- \n  image: b.jpg\n",
        );
        let items: Vec<GalleryItem> = fields.items("gallery");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].image, "a.jpg");
        assert_eq!(items[0].column, "rechts");
        assert_eq!(items[1].position, "");
    }

    #[test]
    fn items_of_scalar_or_missing_field_are_empty() {
        let fields = colloquia("Title: Kolloquium\n");
        assert!(fields.items::<GalleryItem>("title").is_empty());
        assert!(fields.items::<GalleryItem>("gallery").is_empty());
    }

    #[test]
    fn quote_falls_back_to_german() {
        let fields = colloquia(
            "Quotes:\n\n- \n  blockquote: Zitat\n  source: Quelle\n  blockquote-en: Quote\n",
        );
        let quote = &fields.items::<QuoteItem>("quotes")[0];
        assert_eq!(quote.blockquote_in(Lang::En), "Quote");
        assert_eq!(quote.blockquote_in(Lang::De), "Zitat");
        assert_eq!(quote.source_in(Lang::En), "Quelle");
    }

    #[test]
    fn person_years_collected() {
        let table = HintTable::stock();
        let fields = parse_content(
            "Persons:\n\n- \n  name: Kenneth Frampton\n  country: USA\n  1983: x\n  1976: \"\"\n  1989: x\n",
            &Classifier::for_template(Template::Participants, &table),
        )
        .fields;
        let person = &fields.items::<PersonItem>("persons")[0];
        assert_eq!(person.name, "Kenneth Frampton");
        assert_eq!(person.country, "USA");
        assert_eq!(person.attended(), vec![1983, 1989]);
    }

    #[test]
    fn video_duration_and_sizes() {
        let video = VideoItem {
            duration_min: "4".into(),
            duration_sec: "7".into(),
            sizes: "480, 720,1080,".into(),
            ..Default::default()
        };
        assert_eq!(video.duration(), "4:07");
        assert_eq!(video.size_list(), vec!["480", "720", "1080"]);

        let empty = VideoItem::default();
        assert_eq!(empty.duration(), "0:00");
        assert!(empty.size_list().is_empty());
    }

    // =========================================================================
    // format_date_range
    // =========================================================================

    #[test]
    fn date_range_same_month() {
        assert_eq!(
            format_date_range(Some("1979-06-27"), Some("1979-06-29")),
            "27.–29. Juni"
        );
        assert_eq!(
            format_date_range(Some("2019-10-23"), Some("2019-10-25")),
            "23.–25. Oktober"
        );
    }

    #[test]
    fn date_range_strips_leading_zeros() {
        assert_eq!(
            format_date_range(Some("2020-12-01"), Some("2020-12-03")),
            "1.–3. Dezember"
        );
        assert_eq!(
            format_date_range(Some("2020-01-10"), Some("2020-01-12")),
            "10.–12. Januar"
        );
    }

    #[test]
    fn date_range_missing_or_malformed_is_empty() {
        assert_eq!(format_date_range(None, Some("1979-06-29")), "");
        assert_eq!(format_date_range(Some("1979-06-27"), None), "");
        assert_eq!(format_date_range(None, None), "");
        assert_eq!(format_date_range(Some(""), Some("")), "");
        assert_eq!(format_date_range(Some("bad"), Some("also-bad")), "");
        assert_eq!(format_date_range(Some("1979-06-xx"), Some("1979-06-29")), "");
    }

    #[test]
    fn date_range_unknown_month_omits_name() {
        assert_eq!(
            format_date_range(Some("1979-13-01"), Some("1979-13-02")),
            "1.–2."
        );
    }

    // =========================================================================
    // normalize_column / normalize_position
    // =========================================================================

    #[test]
    fn column_values() {
        for right in ["right", "Right", "RIGHT", "r", "R", "rechts", "Rechts", "  right  "] {
            assert_eq!(normalize_column(right), Column::Right, "{right:?}");
        }
        for left in ["", "left", "Left", "  left  ", "center", "middle"] {
            assert_eq!(normalize_column(left), Column::Left, "{left:?}");
        }
    }

    #[test]
    fn position_values() {
        assert_eq!(normalize_position("", 1), 1);
        assert_eq!(normalize_position("", 3), 3);
        assert_eq!(normalize_position("0", 1), 0);
        assert_eq!(normalize_position("5", 1), 5);
        assert_eq!(normalize_position("-1", 1), 0);
        assert_eq!(normalize_position("10", 1), 9);
        assert_eq!(normalize_position("100", 1), 9);
        assert_eq!(normalize_position("abc", 7), 7);
        assert_eq!(normalize_position("3rd", 1), 3);
    }

    // =========================================================================
    // Column layout
    // =========================================================================

    #[test]
    fn items_split_and_sorted() {
        let items = vec![
            gallery("left", "2", "a.jpg"),
            gallery("right", "1", "b.jpg"),
            gallery("left", "1", "c.jpg"),
        ];
        let columns = sort_into_columns(items, "gallery", 1);
        assert_eq!(columns.left.len(), 2);
        assert_eq!(columns.right.len(), 1);
        assert_eq!(columns.left[0].item.image, "c.jpg");
        assert_eq!(columns.left[1].position, 2);
        assert_eq!(columns.left[0].kind, "gallery");
    }

    #[test]
    fn missing_column_and_position_use_defaults() {
        let items = vec![gallery("", "", "a.jpg"), gallery("", "2", "b.jpg")];
        let columns = sort_into_columns(items, "program", 5);
        assert!(columns.right.is_empty());
        assert_eq!(columns.left[0].item.image, "b.jpg");
        assert_eq!(columns.left[1].position, 5);
        assert_eq!(columns.left[1].kind, "program");
    }

    #[test]
    fn equal_positions_keep_input_order() {
        let items = vec![
            gallery("left", "1", "first.jpg"),
            gallery("left", "1", "second.jpg"),
            gallery("left", "0", "zero.jpg"),
        ];
        let columns = sort_into_columns(items, "gallery", 1);
        let images: Vec<&str> = columns.left.iter().map(|e| e.item.image.as_str()).collect();
        assert_eq!(images, vec!["zero.jpg", "first.jpg", "second.jpg"]);
    }

    #[test]
    fn empty_input_gives_empty_columns() {
        let columns = sort_into_columns(Vec::<GalleryItem>::new(), "gallery", 1);
        assert!(columns.left.is_empty());
        assert!(columns.right.is_empty());
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Block {
        Gallery(GalleryItem),
        Quote(QuoteItem),
    }

    #[test]
    fn merge_mixed_kinds_by_position() {
        let galleries = sort_into_columns(
            vec![gallery("left", "3", "a.jpg"), gallery("left", "1", "b.jpg")],
            "gallery",
            1,
        );
        let quotes = sort_into_columns(
            vec![QuoteItem {
                blockquote: "Zitat".into(),
                position: "2".into(),
                ..Default::default()
            }],
            "quote",
            1,
        );

        let gallery_blocks: Vec<ColumnItem<Block>> = galleries
            .left
            .into_iter()
            .map(|e| e.map(Block::Gallery))
            .collect();
        let quote_blocks: Vec<ColumnItem<Block>> =
            quotes.left.into_iter().map(|e| e.map(Block::Quote)).collect();

        let merged = merge_column_items([gallery_blocks, quote_blocks]);
        let kinds: Vec<(&str, u8)> = merged.iter().map(|e| (e.kind.as_str(), e.position)).collect();
        assert_eq!(kinds, vec![("gallery", 1), ("quote", 2), ("gallery", 3)]);
        assert!(matches!(merged[1].item, Block::Quote(_)));
    }

    #[test]
    fn merge_empty_lists() {
        let merged: Vec<ColumnItem<GalleryItem>> = merge_column_items([Vec::new(), Vec::new()]);
        assert!(merged.is_empty());
    }
}
