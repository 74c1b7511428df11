use pubint_page_range::{LabelLookup, PageNumber, PageSpan};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{CanonicalPageError, Result};
use crate::rule::{CanonicalPageRule, RuleType};
use crate::types::{
    CanonicalPageInfo, CanonicalPageSource, ContextDerivedPageNumber, PageColor,
    PageNumberConflict,
};

/// Pages on which two or more different contexts detected a page number
pub fn detect_page_number_conflicts(
    derived: &[ContextDerivedPageNumber],
) -> Vec<PageNumberConflict> {
    let mut by_page: BTreeMap<PageNumber, Vec<String>> = BTreeMap::new();
    for entry in derived {
        let ids = by_page.entry(entry.document_page).or_default();
        if !ids.contains(&entry.context_id) {
            ids.push(entry.context_id.clone());
        }
    }

    by_page
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(document_page, context_ids)| PageNumberConflict {
            document_page,
            context_ids,
        })
        .collect()
}

/// Compute the canonical label of every page in `1..=document_page_count`.
///
/// Precedence, lowest first: the document page number itself, labels
/// derived from page-number contexts, then rules in the order given.
/// Rules only affect pages inside both their own range and the document.
pub fn compute_canonical_pages(
    document_page_count: PageNumber,
    rules: &[CanonicalPageRule],
    derived: &[ContextDerivedPageNumber],
) -> Result<CanonicalPages> {
    let conflicts = detect_page_number_conflicts(derived);
    if !conflicts.is_empty() {
        return Err(CanonicalPageError::ContextConflicts(conflicts));
    }

    let in_document = |page: PageNumber| (1..=document_page_count).contains(&page);
    let mut pages = BTreeMap::new();

    for page in 1..=document_page_count {
        pages.insert(
            page,
            CanonicalPageInfo::new(Some(page.to_string()), CanonicalPageSource::Unaccounted, None),
        );
    }

    let mut context_names = HashMap::new();
    for entry in derived {
        if let Some(name) = &entry.context_name {
            context_names.insert(entry.context_id.clone(), name.clone());
        }
        if !in_document(entry.document_page) {
            log::debug!(
                "Ignoring context {} label on page {} outside document",
                entry.context_id,
                entry.document_page
            );
            continue;
        }
        pages.insert(
            entry.document_page,
            CanonicalPageInfo::new(
                Some(entry.canonical_page.clone()),
                CanonicalPageSource::Context,
                Some(entry.context_id.clone()),
            ),
        );
    }

    for rule in rules {
        match rule.rule_type {
            RuleType::Negative => {
                let start = rule.document_page_start.max(1);
                let end = rule.document_page_end.min(document_page_count);
                for page in start..=end {
                    pages.insert(
                        page,
                        CanonicalPageInfo::new(
                            None,
                            CanonicalPageSource::RuleNegative,
                            Some(rule.id.clone()),
                        ),
                    );
                }
            }
            RuleType::Positive => {
                let Some(labelled) = rule.labels_within(1, document_page_count) else {
                    log::debug!("Rule {} generates no labels; skipping", rule.id);
                    continue;
                };
                for (page, label) in labelled {
                    if label.is_empty() {
                        continue;
                    }
                    pages.insert(
                        page,
                        CanonicalPageInfo::new(
                            Some(label),
                            CanonicalPageSource::RulePositive,
                            Some(rule.id.clone()),
                        ),
                    );
                }
            }
        }
    }

    Ok(CanonicalPages {
        pages,
        context_names,
    })
}

/// Canonical labels for a whole document, keyed by document page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalPages {
    pages: BTreeMap<PageNumber, CanonicalPageInfo>,
    context_names: HashMap<String, String>,
}

/// Page counts per label source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPageStatistics {
    pub total_pages: usize,
    pub unaccounted_pages: usize,
    pub context_derived_pages: usize,
    pub user_defined_positive_pages: usize,
    pub user_defined_negative_pages: usize,
}

/// Inclusive range of canonical labels; `None` bounds for excluded pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalLabelRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Run of document pages sharing a label source, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPageSegment {
    pub document_page_range: PageSpan,
    pub canonical_page_range: CanonicalLabelRange,
    pub source: CanonicalPageSource,
    pub color: PageColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// Contexts merged into this segment, in page order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CanonicalPages {
    pub fn get(&self, document_page: PageNumber) -> Option<&CanonicalPageInfo> {
        self.pages.get(&document_page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &BTreeMap<PageNumber, CanonicalPageInfo> {
        &self.pages
    }

    pub fn iter(&self) -> impl Iterator<Item = (PageNumber, &CanonicalPageInfo)> + '_ {
        self.pages.iter().map(|(&page, info)| (page, info))
    }

    /// Page → label for every page that has one (excluded pages are left out)
    pub fn labels(&self) -> BTreeMap<PageNumber, String> {
        self.iter()
            .filter_map(|(page, info)| info.canonical_page.clone().map(|label| (page, label)))
            .collect()
    }

    pub fn statistics(&self) -> CanonicalPageStatistics {
        let mut stats = CanonicalPageStatistics {
            total_pages: self.pages.len(),
            ..Default::default()
        };
        for info in self.pages.values() {
            match info.source {
                CanonicalPageSource::Unaccounted => stats.unaccounted_pages += 1,
                CanonicalPageSource::Context => stats.context_derived_pages += 1,
                CanonicalPageSource::RulePositive => stats.user_defined_positive_pages += 1,
                CanonicalPageSource::RuleNegative => stats.user_defined_negative_pages += 1,
            }
        }
        stats
    }

    /// Group pages into display segments with rule and context metadata.
    ///
    /// Rule segments split on rule id; context segments run across
    /// different contexts as long as pages stay contiguous.
    pub fn segments(&self, rules: &[CanonicalPageRule]) -> Vec<CanonicalPageSegment> {
        let rule_labels: HashMap<&str, Option<&str>> = rules
            .iter()
            .map(|rule| (rule.id.as_str(), rule.label.as_deref()))
            .collect();

        let mut segments: Vec<CanonicalPageSegment> = Vec::new();
        for (page, info) in self.iter() {
            if let Some(current) = segments.last_mut() {
                if extends_segment(current, page, info) {
                    current.document_page_range.end = page;
                    current.canonical_page_range.end = info.canonical_page.clone();
                    if info.source == CanonicalPageSource::Context {
                        self.add_context(current, info.source_id.as_deref());
                    }
                    continue;
                }
            }

            let mut segment = CanonicalPageSegment {
                document_page_range: PageSpan::single(page),
                canonical_page_range: CanonicalLabelRange {
                    start: info.canonical_page.clone(),
                    end: info.canonical_page.clone(),
                },
                source: info.source,
                color: info.color,
                rule_id: None,
                context_ids: Vec::new(),
                context_names: Vec::new(),
                label: None,
            };
            if info.source.is_rule() {
                segment.rule_id = info.source_id.clone();
                segment.label = info
                    .source_id
                    .as_deref()
                    .and_then(|id| rule_labels.get(id).copied().flatten())
                    .filter(|label| !label.is_empty())
                    .map(str::to_string);
            } else if info.source == CanonicalPageSource::Context {
                self.add_context(&mut segment, info.source_id.as_deref());
            }
            segments.push(segment);
        }
        segments
    }

    fn add_context(&self, segment: &mut CanonicalPageSegment, context_id: Option<&str>) {
        let Some(id) = context_id else {
            return;
        };
        if segment.context_ids.iter().any(|existing| existing == id) {
            return;
        }
        segment.context_ids.push(id.to_string());
        if let Some(name) = self.context_names.get(id) {
            segment.context_names.push(name.clone());
        }
    }

    /// Compact one-line summary, e.g. `"1-19 🔴  i-x 🔵  20 ⚪ (ignored)"`
    pub fn display(&self) -> String {
        if self.pages.is_empty() {
            return "(No pages)".to_string();
        }

        struct Run<'a> {
            first_page: PageNumber,
            last_page: PageNumber,
            first_label: Option<&'a str>,
            last_label: Option<&'a str>,
            source: CanonicalPageSource,
            color: PageColor,
        }

        let mut runs: Vec<Run<'_>> = Vec::new();
        for (page, info) in self.iter() {
            let label = info.canonical_page.as_deref();
            match runs.last_mut() {
                Some(run)
                    if run.source == info.source
                        && run.last_page.checked_add(1) == Some(page) =>
                {
                    run.last_page = page;
                    run.last_label = label;
                }
                _ => runs.push(Run {
                    first_page: page,
                    last_page: page,
                    first_label: label,
                    last_label: label,
                    source: info.source,
                    color: info.color,
                }),
            }
        }

        runs.iter()
            .map(|run| {
                let emoji = run.color.emoji();
                if run.source == CanonicalPageSource::RuleNegative {
                    let range = if run.first_page == run.last_page {
                        run.first_page.to_string()
                    } else {
                        format!("{}-{}", run.first_page, run.last_page)
                    };
                    return format!("{range} {emoji} (ignored)");
                }
                let first = run.first_label.unwrap_or_default();
                let last = run.last_label.unwrap_or_default();
                if first == last {
                    format!("{first} {emoji}")
                } else {
                    format!("{first}-{last} {emoji}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

fn extends_segment(
    current: &CanonicalPageSegment,
    page: PageNumber,
    info: &CanonicalPageInfo,
) -> bool {
    if current.document_page_range.end.checked_add(1) != Some(page) {
        return false;
    }
    if info.source == CanonicalPageSource::Context {
        return current.source == CanonicalPageSource::Context;
    }
    info.source == current.source && info.source_id == current.rule_id
}

impl LabelLookup for CanonicalPages {
    fn label_for(&self, page: PageNumber) -> Option<&str> {
        self.pages
            .get(&page)
            .and_then(|info| info.canonical_page.as_deref())
    }
}
