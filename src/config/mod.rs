//! Deck description loading and types for cadeau.
//!
//! This module handles everything the deck file declares:
//! - Type definitions for the deck structure (`types`)
//! - Option values and their override chain (`metadata`)
//! - Reading and parsing the deck file (`load`)

mod load;
mod metadata;
mod types;

use serde::{Deserialize, Deserializer, Serialize};

pub use load::base_path_from_deck;
pub use metadata::Metadata;
pub use types::{DetailedSection, PageEntry, SectionConfig};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read deck file {0}: {1}")]
    Read(std::path::PathBuf, std::io::Error),

    #[error("failed to parse deck file {0}: {1}")]
    Parse(std::path::PathBuf, serde_yaml::Error),
}

// =============================================================================
// Top-level deck description
// =============================================================================

/// The deck description: optional deck-wide metadata plus the ordered
/// mapping of section names to page references.
#[derive(Debug, Clone, Serialize)]
pub struct DeckConfig {
    pub metadata: Metadata,
    /// Section name -> section value, in declaration order.
    pub slides: Vec<(String, SectionConfig)>,
}

impl<'de> Deserialize<'de> for DeckConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        // First deserialize into a generic Value to inspect the structure
        let value = serde_yaml::Value::deserialize(deserializer)?;

        let obj = value.as_mapping().ok_or_else(|| {
            D::Error::custom("deck description must be a YAML mapping, not a scalar or list")
        })?;

        let metadata = match obj.get("metadata") {
            None | Some(serde_yaml::Value::Null) => Metadata::new(),
            Some(meta) => serde_yaml::from_value::<Metadata>(meta.clone())
                .map_err(|e| D::Error::custom(format!("invalid deck metadata: {e}")))?,
        };

        let slides = obj.get("slides").ok_or_else(|| {
            D::Error::custom(
                "invalid deck: 'slides' is required\n\nExample:\n  slides:\n    intro:\n      - Title Slide\n      - intro.md",
            )
        })?;
        let slides = slides
            .as_mapping()
            .ok_or_else(|| D::Error::custom("invalid deck: 'slides' must map section names to pages"))?;

        let mut sections = Vec::with_capacity(slides.len());
        for (key, section) in slides {
            let name = scalar_to_string(key).ok_or_else(|| {
                D::Error::custom(format!("invalid deck: section name {key:?} is not a scalar"))
            })?;
            let section = serde_yaml::from_value::<SectionConfig>(section.clone())
                .map_err(|_| D::Error::custom(format_section_error(&name, section)))?;
            sections.push((name, section));
        }

        Ok(DeckConfig {
            metadata,
            slides: sections,
        })
    }
}

/// Render a YAML scalar the way it reads in the source document.
pub(crate) fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Format a section deserialization error with helpful context
fn format_section_error(name: &str, value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => {
            format!("invalid section '{name}': it declares no pages")
        }
        serde_yaml::Value::Mapping(map) if !map.contains_key("pages") => format!(
            "invalid section '{name}': a section object needs a 'pages' list\n\nExample:\n  {name}:\n    metadata:\n      class: dark\n    pages:\n      - intro.md"
        ),
        _ => format!(
            "invalid section '{name}': expected a list of pages or an object with 'metadata' and 'pages', and every page must be a plain string"
        ),
    }
}
