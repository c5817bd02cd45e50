//! The assembled deck handed to rendering backends.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Metadata;

/// A fully resolved deck.
#[derive(Debug, Clone, Serialize)]
pub struct Deck {
    pub sections: Vec<Section>,
    /// Deck-level options over the built-in defaults
    pub metadata: Metadata,
}

/// A named, ordered group of pages.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// The section's `metadata.id`, or its key in the deck
    pub id: String,
    pub pages: Vec<Page>,
    /// Section-level options as written
    pub metadata: Metadata,
}

/// One resolved slide.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub id: String,
    /// Normalized HTML fragment
    pub html: String,
    /// Options resolved through defaults, deck, section and front matter
    pub metadata: Metadata,
    /// Position within the section, from 0
    pub page_number: usize,
    /// File the page was read from; `None` for literal pages
    pub source_file: Option<PathBuf>,
}

impl Deck {
    /// Total number of pages across all sections.
    pub fn page_count(&self) -> usize {
        self.sections.iter().map(|s| s.pages.len()).sum()
    }

    /// Iterate every page in document order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.sections.iter().flat_map(|s| s.pages.iter())
    }
}
