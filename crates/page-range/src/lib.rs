//! # Pubint Page Range
//!
//! Page-range handling for index entries: merge the pages an entry is
//! mentioned on into a compact display string, parse such strings back, and
//! re-express them in a document's canonical page labels.
//!
//! ## Architecture
//!
//! ```text
//! Mention[]
//!     │
//!     ├──> Normalizer      pageNumber / pageNumberEnd → [start, end]
//!     │
//!     ├──> Merger          sort by start, coalesce overlapping + adjacent
//!     │
//!     └──> Formatter       "1–3, 5, 7, 10–12"
//!
//! "1–3, 5"
//!     │
//!     ├──> Parser          en-dash → hyphen, expand to [1, 2, 3, 5]
//!     │
//!     └──> Canonical Mapper
//!          ├─> group runs of consecutive document pages
//!          └─> substitute labels at run boundaries  → "i–iii, 1"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pubint_page_range::{merge_and_format_page_ranges, Mention};
//!
//! let mentions = [
//!     Mention::page(1),
//!     Mention::page(2),
//!     Mention::page(3),
//!     Mention::page(5),
//!     Mention::page(7),
//!     Mention::span(10, 12),
//! ];
//! assert_eq!(merge_and_format_page_ranges(&mentions), "1–3, 5, 7, 10–12");
//! ```

mod canonical;
mod config;
mod error;
mod merge;
mod parse;
mod types;

pub use canonical::{
    document_page_range_to_canonical_range_string, normalize_range_string,
    try_document_page_range_to_canonical_range_string,
};
pub use config::{RangeConfig, SpanPolicy};
pub use error::{PageRangeError, Result};
pub use merge::{
    covered_page_count, format_page_ranges_by_entry, format_spans, merge_and_format_page_ranges,
    merge_spans, normalize_mentions, RangeFormatter,
};
pub use parse::{
    parse_page_range, parse_page_range_with_limit, validate_page_range, MAX_EXPANDED_PAGES,
};
pub use types::{LabelLookup, Mention, PageNumber, PageSpan, EN_DASH, SPAN_SEPARATOR};
