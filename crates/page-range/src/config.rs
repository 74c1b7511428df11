use serde::{Deserialize, Serialize};

use crate::parse::MAX_EXPANDED_PAGES;

/// Configuration for range formatting and parsing behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// How malformed mention spans are treated before merging
    #[serde(default)]
    pub span_policy: SpanPolicy,

    /// Upper bound on the number of pages a range string may expand to
    #[serde(default = "default_max_expanded_pages")]
    pub max_expanded_pages: usize,
}

fn default_max_expanded_pages() -> usize {
    MAX_EXPANDED_PAGES
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            span_policy: SpanPolicy::Propagate,
            max_expanded_pages: MAX_EXPANDED_PAGES,
        }
    }
}

impl RangeConfig {
    /// Reject inverted spans and non-positive pages
    pub fn strict() -> Self {
        Self {
            span_policy: SpanPolicy::Strict,
            ..Default::default()
        }
    }

    /// Swap inverted spans instead of rendering them backwards
    pub fn lenient() -> Self {
        Self {
            span_policy: SpanPolicy::Repair,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_expanded_pages == 0 {
            return Err("max_expanded_pages must be > 0".to_string());
        }

        Ok(())
    }
}

/// Treatment of spans with `end < start` or pages below 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanPolicy {
    /// Pass spans through uninterpreted
    #[default]
    Propagate,

    /// Swap inverted bounds; non-positive pages pass through
    Repair,

    /// Fail on inverted spans or pages below 1
    Strict,
}

impl SpanPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            SpanPolicy::Propagate => "propagate",
            SpanPolicy::Repair => "repair",
            SpanPolicy::Strict => "strict",
        }
    }
}
