use std::borrow::Cow;

use crate::error::Result;
use crate::parse::{parse_page_range_with_limit, MAX_EXPANDED_PAGES};
use crate::types::{LabelLookup, PageNumber, EN_DASH, SPAN_SEPARATOR};

/// Replace en-dashes with hyphens so the range parser accepts display strings
pub fn normalize_range_string(range_str: &str) -> String {
    range_str.replace(EN_DASH, "-").trim().to_string()
}

/// Re-express a document page range string in canonical page labels.
///
/// Runs of consecutive *document* pages are grouped first and only then
/// relabeled, so labels that do not sort numerically (roman numerals,
/// front-matter markers) still collapse into `start–end` runs.
///
/// Malformed input is returned verbatim; use
/// [`try_document_page_range_to_canonical_range_string`] to observe the error.
///
/// ```
/// use std::collections::HashMap;
/// use pubint_page_range::document_page_range_to_canonical_range_string;
///
/// let labels: HashMap<i64, String> =
///     [(1, "i"), (2, "ii"), (3, "iii")].map(|(p, l)| (p, l.to_string())).into();
/// assert_eq!(
///     document_page_range_to_canonical_range_string("1\u{2013}3, 5", &labels),
///     "i\u{2013}iii, 5"
/// );
/// ```
pub fn document_page_range_to_canonical_range_string<L: LabelLookup + ?Sized>(
    document_page_range_str: &str,
    doc_to_canonical: &L,
) -> String {
    match try_document_page_range_to_canonical_range_string(document_page_range_str, doc_to_canonical)
    {
        Ok(relabeled) => relabeled,
        Err(err) => {
            log::warn!("Leaving page range {document_page_range_str:?} unmapped: {err}");
            document_page_range_str.to_string()
        }
    }
}

/// Fallible form of [`document_page_range_to_canonical_range_string`]
pub fn try_document_page_range_to_canonical_range_string<L: LabelLookup + ?Sized>(
    document_page_range_str: &str,
    doc_to_canonical: &L,
) -> Result<String> {
    relabel(document_page_range_str, doc_to_canonical, MAX_EXPANDED_PAGES)
}

pub(crate) fn relabel<L: LabelLookup + ?Sized>(
    document_page_range_str: &str,
    doc_to_canonical: &L,
    limit: usize,
) -> Result<String> {
    if document_page_range_str.trim().is_empty() {
        return Ok(String::new());
    }

    let normalized = normalize_range_string(document_page_range_str);
    let pages = parse_page_range_with_limit(&normalized, limit)?;

    let mut rendered = Vec::new();
    let mut pages = pages.into_iter();
    let Some(first) = pages.next() else {
        return Ok(String::new());
    };

    let (mut run_start, mut run_end) = (first, first);
    for page in pages {
        if run_end.checked_add(1) == Some(page) {
            run_end = page;
            continue;
        }
        rendered.push(render_run(doc_to_canonical, run_start, run_end));
        run_start = page;
        run_end = page;
    }
    rendered.push(render_run(doc_to_canonical, run_start, run_end));

    Ok(rendered.join(SPAN_SEPARATOR))
}

fn label_of<L: LabelLookup + ?Sized>(lookup: &L, page: PageNumber) -> Cow<'_, str> {
    lookup
        .label_for(page)
        .map_or_else(|| Cow::Owned(page.to_string()), Cow::Borrowed)
}

fn render_run<L: LabelLookup + ?Sized>(lookup: &L, first: PageNumber, last: PageNumber) -> String {
    let start = label_of(lookup, first);
    let end = label_of(lookup, last);
    if first == last || start == end {
        start.to_string()
    } else {
        format!("{start}{EN_DASH}{end}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageRangeError;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, HashMap};

    fn labels(pairs: &[(PageNumber, &str)]) -> HashMap<PageNumber, String> {
        pairs.iter().map(|&(p, l)| (p, l.to_string())).collect()
    }

    #[test]
    fn empty_and_blank_input_is_empty() {
        let map = labels(&[]);
        assert_eq!(document_page_range_to_canonical_range_string("", &map), "");
        assert_eq!(document_page_range_to_canonical_range_string("   ", &map), "");
    }

    #[test]
    fn falls_back_to_page_number_without_label() {
        let map = labels(&[]);
        assert_eq!(
            document_page_range_to_canonical_range_string("1\u{2013}3, 5", &map),
            "1\u{2013}3, 5"
        );
        assert_eq!(
            document_page_range_to_canonical_range_string("1-3, 5", &map),
            "1\u{2013}3, 5"
        );
    }

    #[test]
    fn relabels_run_boundaries() {
        let map = labels(&[(1, "i"), (2, "ii"), (3, "iii"), (4, "1"), (5, "2")]);
        assert_eq!(
            document_page_range_to_canonical_range_string("1\u{2013}5", &map),
            "i\u{2013}2"
        );
    }

    #[test]
    fn contiguity_is_judged_on_document_pages() {
        // Labels look contiguous but document pages are not
        let map = labels(&[(2, "1"), (9, "2")]);
        assert_eq!(
            document_page_range_to_canonical_range_string("2, 9", &map),
            "1, 2"
        );
    }

    #[test]
    fn identical_boundary_labels_render_once() {
        let map = labels(&[(4, "plate"), (5, "plate")]);
        assert_eq!(
            document_page_range_to_canonical_range_string("4-5", &map),
            "plate"
        );
    }

    #[test]
    fn malformed_input_is_returned_verbatim() {
        let map = labels(&[(1, "i")]);
        let input = "  1\u{2013}x, 3 ";
        assert_eq!(document_page_range_to_canonical_range_string(input, &map), input);
        assert_eq!(document_page_range_to_canonical_range_string("5-2", &map), "5-2");
    }

    #[test]
    fn fallible_form_surfaces_error() {
        let map: BTreeMap<PageNumber, String> = BTreeMap::new();
        assert_eq!(
            try_document_page_range_to_canonical_range_string("abc", &map),
            Err(PageRangeError::InvalidPage("abc".to_string()))
        );
        assert_eq!(
            try_document_page_range_to_canonical_range_string("", &map),
            Ok(String::new())
        );
    }

    #[test]
    fn normalizes_en_dashes() {
        assert_eq!(normalize_range_string(" 1\u{2013}3, 5\u{2013}6 "), "1-3, 5-6");
    }
}
