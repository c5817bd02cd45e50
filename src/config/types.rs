//! Deck description type definitions.
//!
//! These types are pure data - no I/O or complex logic.

use serde::{Deserialize, Deserializer, Serialize};

use super::Metadata;

/// One raw section value.
///
/// YAML formats:
/// ```yaml
/// slides:
///   # Plain list of pages
///   intro:
///     - Title Slide
///     - intro.md
///   # Object with section metadata
///   details:
///     metadata:
///       id: deep-dive
///     pages:
///       - details.yaml
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionConfig {
    /// A bare list of page references
    Pages(Vec<PageEntry>),
    /// Section metadata plus page references
    Detailed(DetailedSection),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedSection {
    #[serde(default)]
    pub metadata: Metadata,
    pub pages: Vec<PageEntry>,
}

impl SectionConfig {
    /// Normalize to the detailed shape.
    pub fn into_detailed(self) -> DetailedSection {
        match self {
            SectionConfig::Pages(pages) => DetailedSection {
                metadata: Metadata::new(),
                pages,
            },
            SectionConfig::Detailed(detailed) => detailed,
        }
    }
}

/// A raw page reference as written in the deck.
///
/// Numbers and booleans are accepted and read as their literal text, so a
/// slide that just says `2024` does not need quoting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageEntry(String);

impl PageEntry {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PageEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = serde_yaml::Value::deserialize(deserializer)?;
        super::scalar_to_string(&value)
            .map(PageEntry)
            .ok_or_else(|| D::Error::custom("page reference must be a plain string"))
    }
}
