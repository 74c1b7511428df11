use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CanonicalPageError, Result};
use crate::types::NumeralType;

static ARABIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid arabic regex"));
static ROMAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[ivxlcdm]+$").expect("valid roman regex"));
static ALPHA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z]+$").expect("valid alphabetic regex"));

/// Largest value [`number_to_roman`] can render
pub(crate) const MAX_ROMAN: i64 = 3999;

const ROMAN_TABLE: [(i64, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Classify a canonical label
pub fn detect_numeral_type(page: &str) -> NumeralType {
    if ARABIC_RE.is_match(page) {
        NumeralType::Arabic
    } else if ROMAN_RE.is_match(page) {
        NumeralType::Roman
    } else {
        NumeralType::Arbitrary
    }
}

fn roman_digit(c: char) -> Option<i64> {
    match c.to_ascii_uppercase() {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    }
}

/// Parse a Roman numeral with subtractive notation; case-insensitive.
///
/// Non-canonical forms such as `iiii` are accepted and summed.
pub fn roman_to_number(roman: &str) -> Result<i64> {
    if roman.is_empty() {
        return Err(CanonicalPageError::InvalidRoman(roman.to_string()));
    }

    let digits = roman
        .chars()
        .map(|c| roman_digit(c).ok_or_else(|| CanonicalPageError::InvalidRoman(roman.to_string())))
        .collect::<Result<Vec<_>>>()?;

    let mut total = 0;
    for (i, &current) in digits.iter().enumerate() {
        match digits.get(i + 1) {
            Some(&next) if current < next => total -= current,
            _ => total += current,
        }
    }
    Ok(total)
}

/// Lowercase Roman numeral for `1..=3999`
pub fn number_to_roman(num: i64) -> Result<String> {
    if !(1..=MAX_ROMAN).contains(&num) {
        return Err(CanonicalPageError::RomanOutOfRange(num));
    }

    let mut remaining = num;
    let mut out = String::new();
    for (value, numeral) in ROMAN_TABLE {
        while remaining >= value {
            out.push_str(numeral);
            remaining -= value;
        }
    }
    Ok(out)
}

/// `count` consecutive Roman numerals starting at `start`
pub fn generate_roman_numerals(start: &str, count: usize) -> Result<Vec<String>> {
    let first = roman_to_number(start)?;
    (0..count as i64)
        .map(|offset| number_to_roman(first.saturating_add(offset)))
        .collect()
}

/// `count` consecutive Arabic numerals starting at `start`
pub fn generate_arabic_numerals(start: i64, count: usize) -> Vec<String> {
    (0..count as i64)
        .map(|offset| start.saturating_add(offset).to_string())
        .collect()
}

/// Split comma-separated user input into labels, dropping blanks
pub fn parse_arbitrary_sequence(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether labels form one unbroken Arabic or Roman progression
pub fn detect_sequence_continuity<S: AsRef<str>>(values: &[S]) -> bool {
    if values.len() < 2 {
        return true;
    }

    let first_type = detect_numeral_type(values[0].as_ref());
    if values
        .iter()
        .any(|v| detect_numeral_type(v.as_ref()) != first_type)
    {
        return false;
    }

    let numbers: Option<Vec<i64>> = match first_type {
        NumeralType::Arbitrary => return false,
        NumeralType::Arabic => values.iter().map(|v| v.as_ref().parse().ok()).collect(),
        NumeralType::Roman => values
            .iter()
            .map(|v| roman_to_number(v.as_ref()).ok())
            .collect(),
    };

    numbers.is_some_and(|numbers| {
        numbers
            .windows(2)
            .all(|pair| pair[0].checked_add(1) == Some(pair[1]))
    })
}

/// Accept text detected in a page-number region if it looks like a page label
pub fn page_label_from_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    (ARABIC_RE.is_match(trimmed) || ROMAN_RE.is_match(trimmed) || ALPHA_RE.is_match(trimmed))
        .then(|| trimmed.to_string())
}
