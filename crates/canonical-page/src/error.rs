use thiserror::Error;

use crate::types::PageNumberConflict;

pub type Result<T> = std::result::Result<T, CanonicalPageError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalPageError {
    #[error("Invalid Roman numeral: {0}")]
    InvalidRoman(String),

    #[error("Number out of range for Roman numerals: {0}")]
    RomanOutOfRange(i64),

    #[error("Invalid rule {id}: {reason}")]
    InvalidRule { id: String, reason: String },

    #[error("Conflicting page number contexts on pages: {}", conflict_pages(.0))]
    ContextConflicts(Vec<PageNumberConflict>),
}

impl CanonicalPageError {
    pub fn invalid_rule(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

fn conflict_pages(conflicts: &[PageNumberConflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.document_page.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            CanonicalPageError::invalid_rule("body", "numeralType is required").to_string(),
            "Invalid rule body: numeralType is required"
        );
        assert_eq!(
            CanonicalPageError::RomanOutOfRange(4000).to_string(),
            "Number out of range for Roman numerals: 4000"
        );
        let conflicts = vec![
            PageNumberConflict {
                document_page: 3,
                context_ids: vec!["a".to_string(), "b".to_string()],
            },
            PageNumberConflict {
                document_page: 9,
                context_ids: vec!["a".to_string(), "c".to_string()],
            },
        ];
        assert_eq!(
            CanonicalPageError::ContextConflicts(conflicts).to_string(),
            "Conflicting page number contexts on pages: 3, 9"
        );
    }
}
