use pubint_page_range::PageNumber;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CanonicalPageError, Result};
use crate::numeral::{detect_sequence_continuity, number_to_roman, roman_to_number, MAX_ROMAN};
use crate::types::NumeralType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// Assigns generated labels to the range
    Positive,
    /// Excludes the range from canonical numbering
    Negative,
}

/// User-defined canonical numbering for a range of document pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPageRule {
    pub id: String,
    pub rule_type: RuleType,
    pub document_page_start: PageNumber,
    pub document_page_end: PageNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeral_type: Option<NumeralType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_canonical_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbitrary_sequence: Option<Vec<String>>,
}

impl CanonicalPageRule {
    /// Positive rule numbering `start..=end` with `numeral_type` from `first_label`
    pub fn positive(
        id: impl Into<String>,
        start: PageNumber,
        end: PageNumber,
        numeral_type: NumeralType,
        first_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rule_type: RuleType::Positive,
            document_page_start: start,
            document_page_end: end,
            label: None,
            numeral_type: Some(numeral_type),
            starting_canonical_page: Some(first_label.into()),
            arbitrary_sequence: None,
        }
    }

    /// Positive rule assigning `sequence` to `start..`
    pub fn arbitrary(id: impl Into<String>, start: PageNumber, sequence: Vec<String>) -> Self {
        let end = start + sequence.len() as PageNumber - 1;
        Self {
            id: id.into(),
            rule_type: RuleType::Positive,
            document_page_start: start,
            document_page_end: end,
            label: None,
            numeral_type: Some(NumeralType::Arbitrary),
            starting_canonical_page: None,
            arbitrary_sequence: Some(sequence),
        }
    }

    /// Negative rule excluding `start..=end`
    pub fn negative(id: impl Into<String>, start: PageNumber, end: PageNumber) -> Self {
        Self {
            id: id.into(),
            rule_type: RuleType::Negative,
            document_page_start: start,
            document_page_end: end,
            label: None,
            numeral_type: None,
            starting_canonical_page: None,
            arbitrary_sequence: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Number of document pages covered; zero for an inverted range
    pub fn page_count(&self) -> usize {
        let count = i128::from(self.document_page_end) - i128::from(self.document_page_start) + 1;
        usize::try_from(count.max(0)).unwrap_or(usize::MAX)
    }

    pub fn overlaps(&self, start: PageNumber, end: PageNumber) -> bool {
        start <= self.document_page_end && end >= self.document_page_start
    }

    /// Check the rule is well-formed before it is stored or applied
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(CanonicalPageError::invalid_rule(&self.id, reason));

        if self.document_page_start < 1 {
            return invalid("documentPageStart must be >= 1");
        }
        if self.document_page_start > self.document_page_end {
            return invalid("documentPageStart must be <= documentPageEnd");
        }
        if self.rule_type == RuleType::Negative {
            return Ok(());
        }

        match self.numeral_type {
            None => invalid("numeralType is required for positive rules"),
            Some(NumeralType::Arabic | NumeralType::Roman)
                if self.starting_canonical_page.is_none() =>
            {
                invalid("startingCanonicalPage is required for arabic and roman numeral types")
            }
            Some(NumeralType::Arbitrary) => match &self.arbitrary_sequence {
                None => invalid("arbitrarySequence is required for arbitrary numeral type"),
                Some(seq) if seq.len() != self.page_count() => invalid(
                    "arbitrarySequence length must match document page range (documentPageEnd - documentPageStart + 1)",
                ),
                Some(_) => Ok(()),
            },
            Some(_) => Ok(()),
        }
    }

    /// Labels this rule assigns, first page first. `None` for negative or
    /// incomplete rules and for starting labels that cannot be continued.
    ///
    /// Allocates one label per page of the rule; use
    /// [`labels_within`](Self::labels_within) when only part of it matters.
    pub fn generate_sequence(&self) -> Option<Vec<String>> {
        self.labels_within(self.document_page_start, self.document_page_end)
            .map(|labels| labels.into_iter().map(|(_, label)| label).collect())
    }

    /// Labels for the rule's pages inside `first_page..=last_page`, keyed by
    /// document page. Only that window is generated.
    pub fn labels_within(
        &self,
        first_page: PageNumber,
        last_page: PageNumber,
    ) -> Option<Vec<(PageNumber, String)>> {
        if self.rule_type == RuleType::Negative {
            return None;
        }
        let numeral_type = self.numeral_type?;

        let lo = first_page.max(self.document_page_start);
        let hi = last_page.min(self.document_page_end);
        if lo > hi {
            return Some(Vec::new());
        }
        let offset = lo.checked_sub(self.document_page_start)?;
        let pages = lo..=hi;

        match (numeral_type, self.starting_canonical_page.as_deref()) {
            (NumeralType::Arabic, Some(start)) => {
                let first = start.trim().parse::<i64>().ok()?.checked_add(offset)?;
                pages
                    .zip(0i64..)
                    .map(|(page, step)| Some((page, first.checked_add(step)?.to_string())))
                    .collect()
            }
            (NumeralType::Roman, Some(start)) => {
                let first = roman_to_number(start).ok()?.checked_add(offset)?;
                pages
                    .zip(0i64..)
                    .map(|(page, step)| {
                        let label = number_to_roman(first.checked_add(step)?).ok()?;
                        Some((page, label))
                    })
                    .collect()
            }
            (NumeralType::Arbitrary, _) => {
                let skip = usize::try_from(offset).ok()?;
                let sequence = self.arbitrary_sequence.as_ref()?;
                Some(pages.zip(sequence.iter().skip(skip).cloned()).collect())
            }
            _ => None,
        }
    }

    /// First and last number of an arabic or roman rule whose every label
    /// reads back as its own numeral type
    fn numeric_bounds(&self) -> Option<(i64, i64)> {
        let start = self.starting_canonical_page.as_deref()?;
        let span = self
            .document_page_end
            .checked_sub(self.document_page_start)
            .filter(|span| *span >= 0)?;

        match self.numeral_type? {
            NumeralType::Arabic => {
                let first = start.trim().parse::<i64>().ok().filter(|n| *n >= 0)?;
                Some((first, first.checked_add(span)?))
            }
            NumeralType::Roman => {
                let first = roman_to_number(start).ok().filter(|n| *n >= 1)?;
                let last = first.checked_add(span).filter(|n| *n <= MAX_ROMAN)?;
                Some((first, last))
            }
            NumeralType::Arbitrary => None,
        }
    }
}

/// Existing rules that overlap a candidate range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConflicts {
    /// Overlapping document pages, ascending
    pub document_pages: Vec<PageNumber>,
    pub rule_ids: Vec<String>,
}

impl RuleConflicts {
    pub fn is_empty(&self) -> bool {
        self.rule_ids.is_empty()
    }
}

/// Find rules overlapping `start..=end`, skipping `exclude_id` (the rule being edited)
pub fn find_rule_conflicts(
    start: PageNumber,
    end: PageNumber,
    rules: &[CanonicalPageRule],
    exclude_id: Option<&str>,
) -> RuleConflicts {
    let mut pages = BTreeSet::new();
    let mut rule_ids = Vec::new();

    for rule in rules {
        if exclude_id == Some(rule.id.as_str()) || !rule.overlaps(start, end) {
            continue;
        }
        let overlap_start = start.max(rule.document_page_start);
        let overlap_end = end.min(rule.document_page_end);
        pages.extend(overlap_start..=overlap_end);
        rule_ids.push(rule.id.clone());
    }

    RuleConflicts {
        document_pages: pages.into_iter().collect(),
        rule_ids,
    }
}

/// Merge neighbouring rules that continue one another.
///
/// Two rules join when they are contiguous in document pages, share rule
/// and numeral type, and (for positive rules) their generated labels form
/// one continuous progression. The longer rule survives, the earlier one
/// on ties. The merged rule renders the same labels the pair did.
/// Surviving rules keep their input order.
pub fn join_contiguous_rules(mut rules: Vec<CanonicalPageRule>) -> Vec<CanonicalPageRule> {
    while let Some((keep, drop, merged)) = find_joinable_pair(&rules) {
        log::debug!(
            "Joining rule {} into {} ({}-{})",
            rules[drop].id,
            rules[keep].id,
            merged.document_page_start,
            merged.document_page_end
        );
        rules[keep] = merged;
        rules.remove(drop);
    }
    rules
}

fn find_joinable_pair(
    rules: &[CanonicalPageRule],
) -> Option<(usize, usize, CanonicalPageRule)> {
    let mut order: Vec<usize> = (0..rules.len()).collect();
    order.sort_by_key(|&i| rules[i].document_page_start);

    order.windows(2).find_map(|pair| {
        let (first_idx, second_idx) = (pair[0], pair[1]);
        let first = &rules[first_idx];
        let second = &rules[second_idx];

        if first.document_page_end.checked_add(1) != Some(second.document_page_start)
            || first.numeral_type != second.numeral_type
            || first.rule_type != second.rule_type
        {
            return None;
        }

        if first.rule_type == RuleType::Positive && !labels_continue(first, second) {
            return None;
        }

        let keep_idx = match first.page_count().cmp(&second.page_count()) {
            std::cmp::Ordering::Greater => first_idx,
            std::cmp::Ordering::Less => second_idx,
            std::cmp::Ordering::Equal => first_idx.min(second_idx),
        };
        let drop_idx = if keep_idx == first_idx { second_idx } else { first_idx };

        let mut merged = rules[keep_idx].clone();
        merged.document_page_start = first.document_page_start;
        merged.document_page_end = second.document_page_end;
        merged.starting_canonical_page = first.starting_canonical_page.clone();
        if let (Some(head), Some(tail)) = (&first.arbitrary_sequence, &second.arbitrary_sequence) {
            merged.arbitrary_sequence = Some(head.iter().chain(tail).cloned().collect());
        }

        Some((keep_idx, drop_idx, merged))
    })
}

/// Whether `second` picks up numbering exactly where `first` stops
fn labels_continue(first: &CanonicalPageRule, second: &CanonicalPageRule) -> bool {
    match first.numeral_type {
        Some(NumeralType::Arbitrary) => {
            let (Some(mut combined), Some(tail)) =
                (first.generate_sequence(), second.generate_sequence())
            else {
                return false;
            };
            if combined.is_empty() || tail.is_empty() {
                return false;
            }
            combined.extend(tail);
            detect_sequence_continuity(&combined)
        }
        Some(_) => match (first.numeric_bounds(), second.numeric_bounds()) {
            (Some((_, last)), Some((next, _))) => last.checked_add(1) == Some(next),
            _ => false,
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn validates_positive_rules() {
        let ok = CanonicalPageRule::positive("r1", 1, 10, NumeralType::Roman, "i");
        assert!(ok.validate().is_ok());

        let mut missing_type = ok.clone();
        missing_type.numeral_type = None;
        assert!(matches!(
            missing_type.validate(),
            Err(CanonicalPageError::InvalidRule { .. })
        ));

        let mut missing_start = ok.clone();
        missing_start.starting_canonical_page = None;
        assert!(missing_start.validate().is_err());

        let reversed = CanonicalPageRule::positive("r2", 5, 4, NumeralType::Arabic, "1");
        assert_eq!(
            reversed.validate(),
            Err(CanonicalPageError::invalid_rule(
                "r2",
                "documentPageStart must be <= documentPageEnd"
            ))
        );

        let zero = CanonicalPageRule::negative("r3", 0, 4);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn validates_arbitrary_sequence_length() {
        let ok = CanonicalPageRule::arbitrary("a", 3, labels(&["A", "B", "C"]));
        assert_eq!(ok.document_page_end, 5);
        assert!(ok.validate().is_ok());

        let mut short = ok.clone();
        short.document_page_end = 6;
        assert!(short.validate().is_err());

        let mut missing = ok;
        missing.arbitrary_sequence = None;
        assert!(missing.validate().is_err());
    }

    #[test]
    fn generates_sequences_per_numeral_type() {
        assert_eq!(
            CanonicalPageRule::positive("r", 1, 3, NumeralType::Roman, "iv").generate_sequence(),
            Some(labels(&["iv", "v", "vi"]))
        );
        assert_eq!(
            CanonicalPageRule::positive("r", 10, 12, NumeralType::Arabic, "99").generate_sequence(),
            Some(labels(&["99", "100", "101"]))
        );
        assert_eq!(
            CanonicalPageRule::positive("r", 1, 3, NumeralType::Arabic, "x").generate_sequence(),
            None
        );
        assert_eq!(
            CanonicalPageRule::positive("r", 1, 3, NumeralType::Roman, "q").generate_sequence(),
            None
        );
        assert_eq!(CanonicalPageRule::negative("n", 1, 3).generate_sequence(), None);
    }

    #[test]
    fn labels_within_generates_only_the_window() {
        let huge = CanonicalPageRule::positive("body", 1, i64::MAX - 1, NumeralType::Arabic, "10");
        assert_eq!(
            huge.labels_within(2, 3),
            Some(vec![(2, "11".to_string()), (3, "12".to_string())])
        );

        let roman = CanonicalPageRule::positive("front", 1, 10, NumeralType::Roman, "i");
        assert_eq!(
            roman.labels_within(-5, 2),
            Some(vec![(1, "i".to_string()), (2, "ii".to_string())])
        );
        assert_eq!(roman.labels_within(11, 20), Some(Vec::new()));

        let plates = CanonicalPageRule::arbitrary("plates", 3, labels(&["A", "B", "C"]));
        assert_eq!(
            plates.labels_within(4, 100),
            Some(vec![(4, "B".to_string()), (5, "C".to_string())])
        );
        assert_eq!(CanonicalPageRule::negative("n", 1, 3).labels_within(1, 3), None);
    }

    #[test]
    fn finds_overlapping_rules() {
        let rules = vec![
            CanonicalPageRule::negative("a", 1, 5),
            CanonicalPageRule::positive("b", 8, 12, NumeralType::Arabic, "1"),
            CanonicalPageRule::negative("c", 20, 30),
        ];

        let conflicts = find_rule_conflicts(4, 9, &rules, None);
        assert_eq!(conflicts.document_pages, vec![4, 5, 8, 9]);
        assert_eq!(conflicts.rule_ids, vec!["a", "b"]);

        let excluded = find_rule_conflicts(4, 9, &rules, Some("a"));
        assert_eq!(excluded.rule_ids, vec!["b"]);

        assert!(find_rule_conflicts(13, 19, &rules, None).is_empty());
    }

    #[test]
    fn joins_continuous_positive_rules() {
        let rules = vec![
            CanonicalPageRule::positive("short", 1, 2, NumeralType::Roman, "i"),
            CanonicalPageRule::positive("long", 3, 6, NumeralType::Roman, "iii"),
        ];

        let joined = join_contiguous_rules(rules);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].id, "long");
        assert_eq!(joined[0].document_page_start, 1);
        assert_eq!(joined[0].document_page_end, 6);
        assert_eq!(
            joined[0].generate_sequence(),
            Some(labels(&["i", "ii", "iii", "iv", "v", "vi"]))
        );
    }

    #[test]
    fn joins_rule_reaching_far_past_any_document() {
        let rules = vec![
            CanonicalPageRule::positive("a", 1, 2, NumeralType::Arabic, "1"),
            CanonicalPageRule::positive("b", 3, i64::MAX - 1, NumeralType::Arabic, "3"),
        ];

        let joined = join_contiguous_rules(rules);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].id, "b");
        assert_eq!(joined[0].document_page_start, 1);
        assert_eq!(joined[0].document_page_end, i64::MAX - 1);
        assert_eq!(joined[0].starting_canonical_page.as_deref(), Some("1"));
    }

    #[test]
    fn roman_rules_past_mmmcmxcix_do_not_join() {
        let rules = vec![
            CanonicalPageRule::positive("a", 1, 2, NumeralType::Roman, "mmmcmxcviii"),
            CanonicalPageRule::positive("b", 3, 4, NumeralType::Roman, "mmmm"),
        ];
        assert_eq!(join_contiguous_rules(rules.clone()), rules);
    }

    #[test]
    fn keeps_discontinuous_or_mismatched_rules() {
        let restart = vec![
            CanonicalPageRule::positive("a", 1, 4, NumeralType::Arabic, "1"),
            CanonicalPageRule::positive("b", 5, 8, NumeralType::Arabic, "1"),
        ];
        assert_eq!(join_contiguous_rules(restart.clone()), restart);

        let mixed = vec![
            CanonicalPageRule::positive("a", 1, 4, NumeralType::Roman, "i"),
            CanonicalPageRule::positive("b", 5, 8, NumeralType::Arabic, "5"),
        ];
        assert_eq!(join_contiguous_rules(mixed.clone()), mixed);

        let gap = vec![
            CanonicalPageRule::negative("a", 1, 4),
            CanonicalPageRule::negative("b", 6, 8),
        ];
        assert_eq!(join_contiguous_rules(gap.clone()), gap);
    }

    #[test]
    fn joins_chains_of_negative_rules() {
        let rules = vec![
            CanonicalPageRule::negative("c", 7, 9),
            CanonicalPageRule::negative("a", 1, 3),
            CanonicalPageRule::negative("b", 4, 6),
            CanonicalPageRule::positive("p", 10, 12, NumeralType::Arabic, "1"),
        ];

        let joined = join_contiguous_rules(rules);
        assert_eq!(joined.len(), 2);
        // a absorbs b on a length tie, then outgrows c
        assert_eq!(joined[0].id, "a");
        assert_eq!(joined[0].document_page_start, 1);
        assert_eq!(joined[0].document_page_end, 9);
        assert_eq!(joined[1].id, "p");
    }
}
