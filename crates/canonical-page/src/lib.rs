//! # Pubint Canonical Page
//!
//! Canonical page numbering for PDF documents: the labels a book prints on
//! its pages (`i`, `ii`, ..., `1`, `2`, ..., plates) as opposed to the
//! physical page order.
//!
//! ## Architecture
//!
//! ```text
//! document page count
//!     │
//!     ├──> Unaccounted        every page labelled with its own number (red)
//!     │
//!     ├──> Context-derived    labels read off page-number regions (green)
//!     │      └─ two contexts on one page → ContextConflicts
//!     │
//!     └──> Rules              user-defined, in order (blue / gray)
//!            ├─ positive: arabic | roman | arbitrary sequences
//!            └─ negative: page excluded from numbering
//!
//! CanonicalPages
//!     ├─> labels() / LabelLookup  → feeds the page-range canonical mapper
//!     ├─> segments()              → rule and context metadata per run
//!     ├─> statistics()
//!     └─> display()               → "i-x 🔵  1-480 🔵  481 ⚪ (ignored)"
//! ```

mod compute;
mod error;
mod numeral;
mod rule;
mod types;

pub use compute::{
    compute_canonical_pages, detect_page_number_conflicts, CanonicalLabelRange, CanonicalPageSegment,
    CanonicalPageStatistics, CanonicalPages,
};
pub use error::{CanonicalPageError, Result};
pub use numeral::{
    detect_numeral_type, detect_sequence_continuity, generate_arabic_numerals,
    generate_roman_numerals, number_to_roman, page_label_from_text, parse_arbitrary_sequence,
    roman_to_number,
};
pub use rule::{find_rule_conflicts, join_contiguous_rules, CanonicalPageRule, RuleConflicts, RuleType};
pub use types::{
    CanonicalPageInfo, CanonicalPageSource, ContextDerivedPageNumber, NumeralType, PageColor,
    PageNumberConflict,
};
