//! Page type for pipeline processing.

use std::path::PathBuf;

use crate::build::format::SourceKind;
use crate::config::Metadata;

/// A page being processed through the pipeline.
///
/// `content` evolves through the stages:
///
/// 1. Initially: the page body (front matter removed), or the reference text
///    for literal pages
/// 2. After render: an HTML fragment
/// 3. After normalize: the normalized fragment that ends up in the deck
#[derive(Debug)]
pub struct ProcessingPage {
    /// Index of the owning section in the deck
    pub section: usize,

    /// Unique page id
    pub id: String,

    /// Reference as written in the deck or a list file, resolved against
    /// the list file's directory
    pub reference: String,

    /// File the page was read from; `None` for literal pages
    pub source_file: Option<PathBuf>,

    pub kind: SourceKind,

    /// Front matter of the page alone
    pub front_matter: Metadata,

    /// Options resolved through defaults, deck, section and front matter
    pub metadata: Metadata,

    /// Body as read, kept for the render fallback
    pub body: String,

    /// Content being processed
    pub content: String,
}
