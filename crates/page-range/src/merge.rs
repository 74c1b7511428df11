use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::canonical;
use crate::config::{RangeConfig, SpanPolicy};
use crate::error::{PageRangeError, Result};
use crate::types::{LabelLookup, Mention, PageSpan, SPAN_SEPARATOR};

/// Convert mentions into `[start, end]` spans, one per mention, uninterpreted.
pub fn normalize_mentions(mentions: &[Mention]) -> Vec<PageSpan> {
    mentions.iter().copied().map(PageSpan::from).collect()
}

/// Coalesce overlapping and adjacent spans into a minimal ascending set.
///
/// Pages 5 and 6 are contiguous, so `[5, 5]` and `[6, 6]` merge into `[5, 6]`.
pub fn merge_spans(mut spans: Vec<PageSpan>) -> Vec<PageSpan> {
    // Stable: equal starts keep input order
    spans.sort_by_key(|span| span.start);

    let mut merged: Vec<PageSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if last.touches(&span) => {
                last.end = last.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Render disjoint spans as `"1–3, 5, 7, 10–12"`. Empty input renders `""`.
pub fn format_spans(spans: &[PageSpan]) -> String {
    spans
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(SPAN_SEPARATOR)
}

/// Merge mention spans and format them for display.
///
/// ```
/// use pubint_page_range::{merge_and_format_page_ranges, Mention};
///
/// let mentions = [Mention::page(7), Mention::page(1), Mention::page(5), Mention::page(6)];
/// assert_eq!(merge_and_format_page_ranges(&mentions), "1, 5\u{2013}7");
/// ```
pub fn merge_and_format_page_ranges(mentions: &[Mention]) -> String {
    format_spans(&merge_spans(normalize_mentions(mentions)))
}

/// Formats and relabels page ranges under a [`RangeConfig`]
#[derive(Debug, Clone, Default)]
pub struct RangeFormatter {
    config: RangeConfig,
}

impl RangeFormatter {
    pub fn new(config: RangeConfig) -> Self {
        Self { config }
    }

    /// Formatter for a config that passes [`RangeConfig::validate`]
    pub fn try_new(config: RangeConfig) -> Result<Self> {
        config.validate().map_err(PageRangeError::invalid_config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RangeConfig {
        &self.config
    }

    /// Normalize mentions according to the configured span policy
    pub fn normalize(&self, mentions: &[Mention]) -> Result<Vec<PageSpan>> {
        let spans = normalize_mentions(mentions);
        match self.config.span_policy {
            SpanPolicy::Propagate => Ok(spans),
            SpanPolicy::Repair => Ok(spans
                .into_iter()
                .map(|span| {
                    if span.end < span.start {
                        log::debug!("Swapping inverted span {}..{}", span.start, span.end);
                        PageSpan::new(span.end, span.start)
                    } else {
                        span
                    }
                })
                .collect()),
            SpanPolicy::Strict => {
                for span in &spans {
                    if span.start < 1 {
                        return Err(PageRangeError::NonPositivePage(span.start));
                    }
                    if span.end < span.start {
                        return Err(PageRangeError::InvertedSpan {
                            start: span.start,
                            end: span.end,
                        });
                    }
                }
                Ok(spans)
            }
        }
    }

    /// Merge and format mentions. Only fails under [`SpanPolicy::Strict`].
    pub fn format(&self, mentions: &[Mention]) -> Result<String> {
        let spans = self.normalize(mentions)?;
        Ok(format_spans(&merge_spans(spans)))
    }

    /// Relabel a formatted range string, surfacing parse errors
    pub fn to_canonical<L: LabelLookup + ?Sized>(
        &self,
        document_page_range_str: &str,
        doc_to_canonical: &L,
    ) -> Result<String> {
        self.config
            .validate()
            .map_err(PageRangeError::invalid_config)?;
        canonical::relabel(
            document_page_range_str,
            doc_to_canonical,
            self.config.max_expanded_pages,
        )
    }
}

/// Format the mentions of many index entries at once.
///
/// Every id in `entry_ids` gets a string, `""` when it has no spans.
/// Spans belonging to ids not listed are ignored.
pub fn format_page_ranges_by_entry<K, I>(entry_ids: &[K], spans: I) -> BTreeMap<K, String>
where
    K: Ord + Hash + Clone,
    I: IntoIterator<Item = (K, Mention)>,
{
    let mut by_entry: HashMap<K, Vec<Mention>> = HashMap::new();
    for (entry_id, mention) in spans {
        by_entry.entry(entry_id).or_default().push(mention);
    }

    entry_ids
        .iter()
        .map(|id| {
            let mentions = by_entry.get(id).map(Vec::as_slice).unwrap_or_default();
            (id.clone(), merge_and_format_page_ranges(mentions))
        })
        .collect()
}

/// Total number of pages covered by merged spans
pub fn covered_page_count(spans: &[PageSpan]) -> u64 {
    spans
        .iter()
        .map(|span| {
            let len = i128::from(span.end) - i128::from(span.start) + 1;
            u64::try_from(len.max(0)).unwrap_or(u64::MAX)
        })
        .fold(0u64, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn format(mentions: &[Mention]) -> String {
        merge_and_format_page_ranges(mentions)
    }

    #[test]
    fn empty_input_formats_empty() {
        assert_eq!(format(&[]), "");
        assert!(merge_spans(Vec::new()).is_empty());
    }

    #[test]
    fn normalize_keeps_length_and_order() {
        let spans = normalize_mentions(&[Mention::page(9), Mention::span(2, 4)]);
        assert_eq!(spans, vec![PageSpan::single(9), PageSpan::new(2, 4)]);
    }

    #[test]
    fn contained_span_collapses() {
        let merged = merge_spans(vec![PageSpan::new(1, 10), PageSpan::new(3, 4)]);
        assert_eq!(merged, vec![PageSpan::new(1, 10)]);
    }

    #[test]
    fn propagate_renders_inverted_span_as_given() {
        assert_eq!(format(&[Mention::span(5, 3)]), "5\u{2013}3");
        assert_eq!(format(&[Mention::page(0), Mention::page(-2)]), "-2, 0");
    }

    #[test]
    fn repair_swaps_inverted_span() {
        let formatter = RangeFormatter::new(RangeConfig::lenient());
        assert_eq!(
            formatter.format(&[Mention::span(5, 3), Mention::page(6)]).unwrap(),
            "3\u{2013}6"
        );
    }

    #[test]
    fn strict_rejects_malformed_spans() {
        let formatter = RangeFormatter::new(RangeConfig::strict());
        assert_eq!(
            formatter.format(&[Mention::span(5, 3)]),
            Err(PageRangeError::InvertedSpan { start: 5, end: 3 })
        );
        assert_eq!(
            formatter.format(&[Mention::page(0)]),
            Err(PageRangeError::NonPositivePage(0))
        );
        assert_eq!(
            formatter.format(&[Mention::page(1), Mention::page(2)]).unwrap(),
            "1\u{2013}2"
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RangeConfig {
            max_expanded_pages: 0,
            ..RangeConfig::default()
        };
        let expected = PageRangeError::invalid_config("max_expanded_pages must be > 0");

        assert_eq!(RangeFormatter::try_new(config.clone()).unwrap_err(), expected);

        let unchecked = RangeFormatter::new(config);
        let labels: HashMap<i64, String> = HashMap::new();
        assert_eq!(unchecked.to_canonical("1-3", &labels), Err(expected));

        let checked = RangeFormatter::try_new(RangeConfig::strict()).unwrap();
        assert_eq!(checked.to_canonical("1-3", &labels).unwrap(), "1\u{2013}3");
    }

    #[test]
    fn groups_by_entry() {
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let spans = vec![
            ("a".to_string(), Mention::page(3)),
            ("b".to_string(), Mention::span(10, 11)),
            ("a".to_string(), Mention::page(4)),
            ("zzz".to_string(), Mention::page(1)),
        ];

        let ranges = format_page_ranges_by_entry(&ids, spans);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges["a"], "3\u{2013}4");
        assert_eq!(ranges["b"], "10\u{2013}11");
        assert_eq!(ranges["c"], "");
    }

    #[test]
    fn counts_covered_pages() {
        let spans = merge_spans(vec![PageSpan::new(1, 3), PageSpan::single(7)]);
        assert_eq!(covered_page_count(&spans), 4);
        assert_eq!(covered_page_count(&[]), 0);
    }

    fn mention_strategy() -> impl Strategy<Value = Mention> {
        (1i64..200, prop::option::of(0i64..6))
            .prop_map(|(start, len)| Mention {
                page_number: start,
                page_number_end: len.map(|l| start + l),
            })
    }

    proptest! {
        #[test]
        fn proptest_order_independent(
            (mentions, shuffled) in prop::collection::vec(mention_strategy(), 0..40)
                .prop_flat_map(|mentions| (Just(mentions.clone()), Just(mentions).prop_shuffle())),
        ) {
            prop_assert_eq!(format(&mentions), format(&shuffled));
        }

        #[test]
        fn proptest_merge_idempotent(mentions in prop::collection::vec(mention_strategy(), 0..40)) {
            let once = merge_spans(normalize_mentions(&mentions));
            let twice = merge_spans(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn proptest_merged_spans_keep_gap(mentions in prop::collection::vec(mention_strategy(), 0..40)) {
            let merged = merge_spans(normalize_mentions(&mentions));
            for pair in merged.windows(2) {
                prop_assert!(pair[1].start > pair[0].end + 1);
            }
        }

        #[test]
        fn proptest_neighbouring_pages_merge(page in 1i64..10_000) {
            let merged = merge_spans(normalize_mentions(&[Mention::page(page + 1), Mention::page(page)]));
            prop_assert_eq!(merged, vec![PageSpan::new(page, page + 1)]);
        }

        #[test]
        fn proptest_multi_page_uses_en_dash(start in 1i64..10_000, len in 1i64..50) {
            let rendered = format(&[Mention::span(start, start + len)]);
            prop_assert!(rendered.contains('\u{2013}'), "rendered output should contain an en dash");
            prop_assert!(!rendered.contains('-'));
        }
    }
}
