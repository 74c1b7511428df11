use std::collections::BTreeSet;

use crate::error::{PageRangeError, Result};
use crate::types::PageNumber;

/// Default cap on how many pages a single range string may expand to
pub const MAX_EXPANDED_PAGES: usize = 1_000_000;

/// Expand a hyphen-separated range string into ascending, de-duplicated pages.
///
/// ```
/// use pubint_page_range::parse_page_range;
///
/// assert_eq!(parse_page_range("1-2, 5-6,8").unwrap(), vec![1, 2, 5, 6, 8]);
/// assert_eq!(parse_page_range("10").unwrap(), vec![10]);
/// assert!(parse_page_range("3-1").is_err());
/// ```
pub fn parse_page_range(range_str: &str) -> Result<Vec<PageNumber>> {
    parse_page_range_with_limit(range_str, MAX_EXPANDED_PAGES)
}

/// [`parse_page_range`] with an explicit expansion cap
pub fn parse_page_range_with_limit(range_str: &str, limit: usize) -> Result<Vec<PageNumber>> {
    let mut pages = BTreeSet::new();

    for part in range_str.split(',').map(str::trim) {
        let (start, end) = parse_part(part)?;

        // i128 so that extreme bounds cannot overflow the length computation
        let len = i128::from(end) - i128::from(start) + 1;
        if len + pages.len() as i128 > limit as i128 {
            // Only pages not already collected count towards the cap
            let known = pages.range(start..=end).count() as i128;
            if len - known + pages.len() as i128 > limit as i128 {
                return Err(PageRangeError::RangeTooLarge { limit });
            }
        }

        pages.extend(start..=end);
    }

    Ok(pages.into_iter().collect())
}

fn parse_part(part: &str) -> Result<(PageNumber, PageNumber)> {
    if let Some((start_str, end_str)) = part.split_once('-') {
        let (Ok(start), Ok(end)) = (
            start_str.trim().parse::<PageNumber>(),
            end_str.trim().parse::<PageNumber>(),
        ) else {
            return Err(PageRangeError::InvalidRange(part.to_string()));
        };

        if start > end {
            return Err(PageRangeError::ReversedRange { start, end });
        }

        return Ok((start, end));
    }

    part.parse::<PageNumber>()
        .map(|page| (page, page))
        .map_err(|_| PageRangeError::InvalidPage(part.to_string()))
}

/// Check that `range_str` parses to at least one page, all within `1..=max_page`
pub fn validate_page_range(range_str: &str, max_page: Option<PageNumber>) -> Result<()> {
    let pages = parse_page_range(range_str)?;

    if pages.is_empty() {
        return Err(PageRangeError::EmptyRange);
    }

    if let Some(max) = max_page {
        let invalid: Vec<PageNumber> = pages
            .into_iter()
            .filter(|&p| p < 1 || p > max)
            .collect();
        if !invalid.is_empty() {
            return Err(PageRangeError::PagesOutOfRange {
                pages: invalid,
                max: Some(max),
            });
        }
    }

    Ok(())
}
