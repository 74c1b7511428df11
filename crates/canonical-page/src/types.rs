use pubint_page_range::PageNumber;
use serde::{Deserialize, Serialize};

/// Kind of numbering a canonical label uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumeralType {
    /// 1, 2, 3
    Arabic,
    /// i, ii, iii
    Roman,
    /// Anything else (plates, letters, custom markers)
    Arbitrary,
}

impl NumeralType {
    pub const fn as_str(self) -> &'static str {
        match self {
            NumeralType::Arabic => "arabic",
            NumeralType::Roman => "roman",
            NumeralType::Arbitrary => "arbitrary",
        }
    }
}

/// Label read off a page by a page-number context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDerivedPageNumber {
    pub document_page: PageNumber,
    pub canonical_page: String,
    pub context_id: String,
    #[serde(default)]
    pub context_name: Option<String>,
}

/// Where a page's canonical label came from, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalPageSource {
    Unaccounted,
    Context,
    RulePositive,
    RuleNegative,
}

impl CanonicalPageSource {
    pub const fn color(self) -> PageColor {
        match self {
            CanonicalPageSource::Unaccounted => PageColor::Red,
            CanonicalPageSource::Context => PageColor::Green,
            CanonicalPageSource::RulePositive => PageColor::Blue,
            CanonicalPageSource::RuleNegative => PageColor::Gray,
        }
    }

    pub const fn is_rule(self) -> bool {
        matches!(
            self,
            CanonicalPageSource::RulePositive | CanonicalPageSource::RuleNegative
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageColor {
    Red,
    Green,
    Blue,
    Gray,
}

impl PageColor {
    pub const fn emoji(self) -> &'static str {
        match self {
            PageColor::Red => "🔴",
            PageColor::Green => "🟢",
            PageColor::Blue => "🔵",
            PageColor::Gray => "⚪",
        }
    }
}

/// Canonical label of one document page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPageInfo {
    /// `None` for pages excluded by a negative rule
    pub canonical_page: Option<String>,
    pub source: CanonicalPageSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub color: PageColor,
}

impl CanonicalPageInfo {
    pub fn new(
        canonical_page: Option<String>,
        source: CanonicalPageSource,
        source_id: Option<String>,
    ) -> Self {
        Self {
            canonical_page,
            source,
            source_id,
            color: source.color(),
        }
    }
}

/// A document page on which more than one context detected a page number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNumberConflict {
    pub document_page: PageNumber,
    pub context_ids: Vec<String>,
}
