use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use pubint_canonical_page::{
    compute_canonical_pages, CanonicalPageRule, CanonicalPages, ContextDerivedPageNumber,
};
use pubint_page_range::PageNumber;
use serde::{Deserialize, Serialize};

/// Page layout of one document, loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub document_page_count: PageNumber,
    #[serde(default)]
    pub rules: Vec<CanonicalPageRule>,
    #[serde(default)]
    pub context_pages: Vec<ContextDerivedPageNumber>,
}

impl DocumentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse document file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.document_page_count < 0 {
            bail!(
                "document_page_count must not be negative (got {})",
                self.document_page_count
            );
        }
        for rule in &self.rules {
            rule.validate()
                .with_context(|| format!("Rule '{}' is not usable", rule.id))?;
        }
        Ok(())
    }

    pub fn compute(&self) -> Result<CanonicalPages> {
        let pages =
            compute_canonical_pages(self.document_page_count, &self.rules, &self.context_pages)?;
        log::debug!(
            "Computed {} canonical pages from {} rules and {} context pages",
            pages.len(),
            self.rules.len(),
            self.context_pages.len()
        );
        Ok(pages)
    }
}

/// Read a `{ "<page>": "<label>" }` JSON object
pub fn load_labels(path: &Path) -> Result<BTreeMap<PageNumber, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read label file {}", path.display()))?;
    let labels: BTreeMap<PageNumber, String> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse label file {}", path.display()))?;
    log::debug!("Loaded {} page labels from {}", labels.len(), path.display());
    Ok(labels)
}
