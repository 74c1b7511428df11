use thiserror::Error;

use crate::types::PageNumber;

/// Result type for page-range operations
pub type Result<T> = std::result::Result<T, PageRangeError>;

/// Errors that can occur while parsing, validating or formatting page ranges
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageRangeError {
    /// A `start-end` part whose bounds are not integers
    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    /// A single-page part that is not an integer
    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    /// A `start-end` part with start after end
    #[error("Invalid range: start ({start}) > end ({end})")]
    ReversedRange { start: PageNumber, end: PageNumber },

    /// Expansion would exceed the page cap
    #[error("Page range expands to more than {limit} pages")]
    RangeTooLarge { limit: usize },

    /// The range parsed to zero pages
    #[error("Page range must contain at least one page")]
    EmptyRange,

    /// Pages below 1 or above the document's last page
    #[error("Pages out of range: {} (max: {})", join_pages(.pages), format_max(.max))]
    PagesOutOfRange {
        pages: Vec<PageNumber>,
        max: Option<PageNumber>,
    },

    /// A mention span whose end precedes its start
    #[error("Inverted page span: end ({end}) < start ({start})")]
    InvertedSpan { start: PageNumber, end: PageNumber },

    /// A mention on page zero or below
    #[error("Page number must be >= 1, got {0}")]
    NonPositivePage(PageNumber),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PageRangeError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

fn join_pages(pages: &[PageNumber]) -> String {
    pages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_max(max: &Option<PageNumber>) -> String {
    max.map_or_else(|| "none".to_string(), |m| m.to_string())
}
