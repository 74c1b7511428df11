use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Document page number.
///
/// Signed so that malformed spans (zero, negative) survive normalization
/// unchanged when the span policy asks for it.
pub type PageNumber = i64;

/// Separator between the bounds of a multi-page span in formatted output
pub const EN_DASH: char = '\u{2013}';

/// Separator between spans in formatted output
pub const SPAN_SEPARATOR: &str = ", ";

/// One occurrence of an indexed term, on a single page or a page span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    /// First page (1-indexed)
    #[serde(alias = "page_number")]
    pub page_number: PageNumber,

    /// Last page, inclusive. `None` means a single-page mention
    #[serde(default, alias = "page_number_end")]
    pub page_number_end: Option<PageNumber>,
}

impl Mention {
    /// Mention on a single page
    #[must_use]
    pub const fn page(page_number: PageNumber) -> Self {
        Self {
            page_number,
            page_number_end: None,
        }
    }

    /// Mention spanning `start..=end`
    #[must_use]
    pub const fn span(start: PageNumber, end: PageNumber) -> Self {
        Self {
            page_number: start,
            page_number_end: Some(end),
        }
    }

    /// Effective last page
    #[must_use]
    pub fn end(&self) -> PageNumber {
        self.page_number_end.unwrap_or(self.page_number)
    }
}

/// Inclusive `[start, end]` integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageSpan {
    pub start: PageNumber,
    pub end: PageNumber,
}

impl PageSpan {
    #[must_use]
    pub const fn new(start: PageNumber, end: PageNumber) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn single(page: PageNumber) -> Self {
        Self {
            start: page,
            end: page,
        }
    }

    #[must_use]
    pub const fn is_single_page(&self) -> bool {
        self.start == self.end
    }

    /// True when `next` overlaps this span or starts on the page right after it
    #[must_use]
    pub const fn touches(&self, next: &Self) -> bool {
        next.start <= self.end.saturating_add(1)
    }
}

impl From<Mention> for PageSpan {
    fn from(mention: Mention) -> Self {
        Self::new(mention.page_number, mention.end())
    }
}

impl std::fmt::Display for PageSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single_page() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}{EN_DASH}{}", self.start, self.end)
        }
    }
}

/// Read-only lookup from document page number to a display label
pub trait LabelLookup {
    /// Label for `page`, or `None` to fall back to the page number itself
    fn label_for(&self, page: PageNumber) -> Option<&str>;
}

impl LabelLookup for HashMap<PageNumber, String> {
    fn label_for(&self, page: PageNumber) -> Option<&str> {
        self.get(&page).map(String::as_str)
    }
}

impl LabelLookup for BTreeMap<PageNumber, String> {
    fn label_for(&self, page: PageNumber) -> Option<&str> {
        self.get(&page).map(String::as_str)
    }
}

impl<T: LabelLookup + ?Sized> LabelLookup for &T {
    fn label_for(&self, page: PageNumber) -> Option<&str> {
        (**self).label_for(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_end_defaults_to_start() {
        assert_eq!(Mention::page(4).end(), 4);
        assert_eq!(Mention::span(4, 9).end(), 9);
    }

    #[test]
    fn mention_deserializes_wire_and_snake_case() {
        let wire: Mention =
            serde_json::from_str(r#"{"pageNumber":3,"pageNumberEnd":null}"#).unwrap();
        assert_eq!(wire, Mention::page(3));

        let snake: Mention =
            serde_json::from_str(r#"{"page_number":3,"page_number_end":5}"#).unwrap();
        assert_eq!(snake, Mention::span(3, 5));

        let bare: Mention = serde_json::from_str(r#"{"pageNumber":8}"#).unwrap();
        assert_eq!(bare, Mention::page(8));
    }

    #[test]
    fn span_display_uses_en_dash() {
        assert_eq!(PageSpan::single(7).to_string(), "7");
        assert_eq!(PageSpan::new(10, 12).to_string(), "10\u{2013}12");
    }

    #[test]
    fn touches_handles_adjacency_and_overflow() {
        assert!(PageSpan::new(1, 2).touches(&PageSpan::single(3)));
        assert!(!PageSpan::new(1, 2).touches(&PageSpan::single(4)));
        assert!(PageSpan::single(PageNumber::MAX).touches(&PageSpan::single(PageNumber::MAX)));
    }

    #[test]
    fn label_lookup_for_maps() {
        let mut hash = HashMap::new();
        hash.insert(1, "i".to_string());
        let mut tree = BTreeMap::new();
        tree.insert(2, "ii".to_string());

        assert_eq!(hash.label_for(1), Some("i"));
        assert_eq!(hash.label_for(2), None);
        assert_eq!(tree.label_for(2), Some("ii"));
        assert_eq!((&tree).label_for(1), None);
    }
}
