//! Page format dispatch.
//!
//! A page reference that names an existing file is rendered according to its
//! suffix. The registry maps suffixes to a [`SourceKind`]; references that do
//! not name a file are always [`SourceKind::Literal`].

use std::path::Path;

use serde::Serialize;

use super::paths::extension_of;

/// Suffix of list files that splice their entries into a section.
pub const LIST_EXTENSION: &str = "yaml";

/// How a page body is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Raw reference text, rendered through the template language
    Literal,
    /// HTML with template directives, composed with extends/include
    Html,
    /// Markdown, converted directly
    Markdown,
    /// Indentation markup, compiled to HTML then composed like `Html`
    TerseMarkup,
}

/// A registered page format.
struct PageFormat {
    kind: SourceKind,
    extensions: &'static [&'static str],
}

/// Registry of page formats keyed by file suffix.
pub struct FormatRegistry {
    formats: Vec<PageFormat>,
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Create a registry with the default formats.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SourceKind::Html, &["html"]);
        registry.register(SourceKind::Markdown, &["md", "markdown"]);
        registry.register(SourceKind::TerseMarkup, &["jade", "pug"]);
        registry
    }

    /// Register suffixes (lowercase, without dot) for a kind.
    ///
    /// Later registrations take precedence for overlapping suffixes.
    pub fn register(&mut self, kind: SourceKind, extensions: &'static [&'static str]) {
        self.formats.push(PageFormat { kind, extensions });
    }

    /// Find the kind for a file suffix.
    pub fn for_extension(&self, ext: &str) -> Option<SourceKind> {
        let ext_lower = ext.to_lowercase();
        // Search in reverse so later registrations take precedence
        self.formats
            .iter()
            .rev()
            .find(|f| f.extensions.iter().any(|e| *e == ext_lower))
            .map(|f| f.kind)
    }

    /// Find the kind for a page reference based on its suffix.
    pub fn for_reference(&self, reference: &str) -> Option<SourceKind> {
        extension_of(reference).and_then(|ext| self.for_extension(&ext))
    }

    /// Whether a reference carries a suffix this tool knows about, list files
    /// included. Used to flag references that look like missing files.
    pub fn is_known_suffix(&self, reference: &str) -> bool {
        is_list_reference(reference) || self.for_reference(reference).is_some()
    }

    /// Whether the reference names a terse-markup file.
    pub fn is_terse(&self, path: &Path) -> bool {
        path.to_str()
            .and_then(|p| self.for_reference(p))
            .is_some_and(|kind| kind == SourceKind::TerseMarkup)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Whether a reference names a list file.
pub fn is_list_reference(reference: &str) -> bool {
    extension_of(reference).is_some_and(|ext| ext == LIST_EXTENSION)
}
