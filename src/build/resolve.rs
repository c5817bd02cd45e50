//! Page resolution.
//!
//! Turns each expanded page reference into a [`ProcessingPage`]: reads the
//! file (or takes the reference as literal text), splits off front matter,
//! picks the source kind and assigns the page id.

use std::collections::HashSet;
use std::path::Path;

use serde_yaml::Value;

use super::format::SourceKind;
use super::paths::{auto_page_id, page_id, resolve_against};
use super::pipeline::{PipelineContext, PipelineError, ProcessingPage};
use super::tree::PageRef;
use crate::config::Metadata;

/// Line separating front matter from the page body.
const FRONT_MATTER_DELIMITER: &str = "\n---\n";

/// Resolves pages in document order.
///
/// Owns the build-wide state: the literal page counter and the set of ids
/// handed out so far.
pub struct PageResolver<'d> {
    deck_metadata: &'d Metadata,
    literal_pages: usize,
    ids: HashSet<String>,
}

impl<'d> PageResolver<'d> {
    /// `deck_metadata` is the deck-level layer as written, without defaults.
    pub fn new(deck_metadata: &'d Metadata) -> Self {
        Self {
            deck_metadata,
            literal_pages: 0,
            ids: HashSet::new(),
        }
    }

    /// Resolve one page of section `section`.
    ///
    /// Returns `Ok(None)` when the page is skipped; the reason is reported
    /// through the context's diagnostics.
    pub fn resolve(
        &mut self,
        section: usize,
        section_metadata: &Metadata,
        page: &PageRef,
        ctx: &mut PipelineContext,
    ) -> Result<Option<ProcessingPage>, PipelineError> {
        let reference = match page {
            PageRef::Unexpanded(reference) => {
                return Ok(Some(self.literal(section, section_metadata, reference, ctx)));
            }
            PageRef::Entry(reference) => reference,
        };

        let path = resolve_against(ctx.base_path, reference);
        if !path.is_file() {
            if ctx.formats.is_known_suffix(reference) {
                ctx.diagnostics.advisory(
                    Some(&path),
                    "file not found; treating the reference as literal text",
                );
            }
            return Ok(Some(self.literal(section, section_metadata, reference, ctx)));
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                ctx.diagnostics
                    .error(Some(&path), format!("failed to read page, skipped: {e}"));
                return Ok(None);
            }
        };
        ctx.watch.register(&path);

        let (front_matter, body) = split_front_matter(&content, &path)?;
        let Some(kind) = ctx.formats.for_reference(reference) else {
            ctx.diagnostics
                .error(Some(&path), "no renderer for this file type; page skipped");
            return Ok(None);
        };
        let front_matter = match front_matter {
            Some(text) => parse_front_matter(&text).unwrap_or_else(|message| {
                ctx.diagnostics.error(
                    Some(&path),
                    format!("{message}; continuing without front matter"),
                );
                Metadata::new()
            }),
            None => Metadata::new(),
        };

        let id = self.unique_id(page_id(reference), Some(&path), ctx);
        let metadata = Metadata::resolve([self.deck_metadata, section_metadata, &front_matter]);
        log::debug!("resolved {} as {:?} page '{}'", reference, kind, id);

        Ok(Some(ProcessingPage {
            section,
            id,
            reference: reference.clone(),
            source_file: Some(path),
            kind,
            front_matter,
            metadata,
            content: body.clone(),
            body,
        }))
    }

    fn literal(
        &mut self,
        section: usize,
        section_metadata: &Metadata,
        text: &str,
        ctx: &mut PipelineContext,
    ) -> ProcessingPage {
        let id = self.unique_id(auto_page_id(self.literal_pages), None, ctx);
        self.literal_pages += 1;

        ProcessingPage {
            section,
            id,
            reference: text.to_string(),
            source_file: None,
            kind: SourceKind::Literal,
            front_matter: Metadata::new(),
            metadata: Metadata::resolve([self.deck_metadata, section_metadata]),
            body: text.to_string(),
            content: text.to_string(),
        }
    }

    /// Suffix `-1`, `-2`... onto an id that is already taken.
    fn unique_id(&mut self, id: String, path: Option<&Path>, ctx: &mut PipelineContext) -> String {
        if self.ids.insert(id.clone()) {
            return id;
        }
        let mut n = 1;
        let unique = loop {
            let candidate = format!("{id}-{n}");
            if self.ids.insert(candidate.clone()) {
                break candidate;
            }
            n += 1;
        };
        ctx.diagnostics.warning(
            path,
            format!("page id '{id}' is already in use; using '{unique}'"),
        );
        unique
    }
}

/// Split page content into optional front matter and body.
///
/// Line endings are normalized to `\n` first. More than one delimiter is a
/// fatal error.
pub fn split_front_matter(
    content: &str,
    path: &Path,
) -> Result<(Option<String>, String), PipelineError> {
    let content = content.replace("\r\n", "\n");
    let parts: Vec<&str> = content.split(FRONT_MATTER_DELIMITER).collect();
    match parts.as_slice() {
        [body] => Ok((None, body.to_string())),
        [front_matter, body] => Ok((Some(front_matter.to_string()), body.to_string())),
        _ => Err(PipelineError::FrontMatter {
            path: path.to_path_buf(),
            count: parts.len() - 1,
        }),
    }
}

/// Parse a front-matter block. An empty block is empty metadata.
pub fn parse_front_matter(text: &str) -> Result<Metadata, String> {
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Null) => Ok(Metadata::new()),
        Ok(Value::Mapping(mapping)) => Ok(Metadata::from(mapping)),
        Ok(other) => Err(format!("front matter must be a mapping, found {other:?}")),
        Err(e) => Err(format!("invalid front matter: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::diagnostics::{Diagnostics, Severity};
    use crate::build::format::FormatRegistry;
    use crate::build::watch::WatchRegistry;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn entry(r: &str) -> PageRef {
        PageRef::Entry(r.to_string())
    }

    struct Resolution {
        pages: Vec<Option<ProcessingPage>>,
        diagnostics: Diagnostics,
        watched: usize,
    }

    fn resolve_all(dir: &Path, deck: &Metadata, refs: &[PageRef]) -> Resolution {
        let formats = FormatRegistry::with_defaults();
        let resolved = Metadata::resolve([deck]);
        let mut ctx = PipelineContext::new(dir, &formats, &resolved, WatchRegistry::new());
        let mut resolver = PageResolver::new(deck);
        let section = Metadata::new();
        let pages = refs
            .iter()
            .map(|r| resolver.resolve(0, &section, r, &mut ctx).unwrap())
            .collect();
        Resolution {
            pages,
            diagnostics: ctx.diagnostics,
            watched: ctx.watch.into_paths().len(),
        }
    }

    #[test]
    fn test_split_without_delimiter() {
        let (front, body) = split_front_matter("Hello\n", Path::new("a.md")).unwrap();
        assert_eq!(front, None);
        assert_eq!(body, "Hello\n");
    }

    #[test]
    fn test_split_with_front_matter() {
        let (front, body) = split_front_matter("meta: 1\n---\nHello", Path::new("a.md")).unwrap();
        assert_eq!(front.as_deref(), Some("meta: 1"));
        assert_eq!(body, "Hello");

        let metadata = parse_front_matter(&front.unwrap()).unwrap();
        assert_eq!(metadata.get("meta"), Some(&Value::from(1)));
    }

    #[test]
    fn test_split_normalizes_crlf() {
        let (front, body) =
            split_front_matter("title: x\r\n---\r\nBody\r\n", Path::new("a.md")).unwrap();
        assert_eq!(front.as_deref(), Some("title: x"));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_two_delimiters_are_fatal() {
        let err = split_front_matter("a: 1\n---\nb\n---\nc", Path::new("a.md")).unwrap_err();
        assert!(matches!(err, PipelineError::FrontMatter { count: 2, .. }));
    }

    #[test]
    fn test_parse_empty_front_matter() {
        assert_eq!(parse_front_matter("").unwrap(), Metadata::new());
        assert!(parse_front_matter("[1, 2]").is_err());
    }

    #[test]
    fn test_literal_ids_count_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let deck = Metadata::new();
        let out = resolve_all(
            dir.path(),
            &deck,
            &[entry("One"), PageRef::Unexpanded("map.yaml".into()), entry("Two")],
        );
        let ids: Vec<_> = out.pages.iter().flatten().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["auto-page-0", "auto-page-1", "auto-page-2"]);
        let first = out.pages[0].as_ref().unwrap();
        assert_eq!(first.kind, SourceKind::Literal);
        assert_eq!(first.content, "One");
        assert!(first.source_file.is_none());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_file_with_known_suffix_is_advisory() {
        let dir = tempfile::tempdir().unwrap();
        let out = resolve_all(dir.path(), &Metadata::new(), &[entry("missing.md")]);
        let page = out.pages[0].as_ref().unwrap();
        assert_eq!(page.kind, SourceKind::Literal);
        assert_eq!(page.content, "missing.md");
        assert_eq!(out.diagnostics.count(Severity::Advisory), 1);
    }

    #[test]
    fn test_file_page() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "intro.md", "title: Intro\nclass: dark\n---\n# Hi\n");
        let mut deck = Metadata::new();
        deck.insert("class", "light");

        let out = resolve_all(dir.path(), &deck, &[entry("intro.md")]);
        let page = out.pages[0].as_ref().unwrap();
        assert_eq!(page.id, "intro");
        assert_eq!(page.kind, SourceKind::Markdown);
        assert_eq!(page.content, "# Hi\n");
        assert_eq!(page.front_matter.get_str("title"), Some("Intro"));
        assert_eq!(page.metadata.get_str("class"), Some("dark"));
        assert_eq!(page.metadata.engine(), "flowtime");
        assert_eq!(page.source_file.as_deref(), Some(dir.path().join("intro.md").as_path()));
        assert_eq!(out.watched, 1);
    }

    #[test]
    fn test_unknown_format_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "hello");
        let out = resolve_all(dir.path(), &Metadata::new(), &[entry("notes.txt"), entry("Next")]);
        assert!(out.pages[0].is_none());
        assert_eq!(out.pages[1].as_ref().unwrap().id, "auto-page-0");
        assert_eq!(out.diagnostics.count(Severity::Error), 1);
        assert_eq!(out.watched, 1);
    }

    #[test]
    fn test_unknown_format_still_checks_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "a: 1\n---\nb\n---\nc");
        let formats = FormatRegistry::with_defaults();
        let deck = Metadata::defaults();
        let mut ctx = PipelineContext::new(dir.path(), &formats, &deck, WatchRegistry::new());

        let err = PageResolver::new(&deck)
            .resolve(0, &Metadata::new(), &entry("notes.txt"), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, PipelineError::FrontMatter { count: 2, .. }));
    }

    #[test]
    fn test_literal_id_taken_by_file_page_is_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "auto-page-1.md", "File");
        let out = resolve_all(
            dir.path(),
            &Metadata::new(),
            &[entry("auto-page-1.md"), entry("one"), entry("two")],
        );
        let ids: Vec<_> = out.pages.iter().flatten().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["auto-page-1", "auto-page-0", "auto-page-1-1"]);
        assert_eq!(out.diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn test_bad_front_matter_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.html", "title: [unclosed\n---\n<p>x</p>");
        let out = resolve_all(dir.path(), &Metadata::new(), &[entry("a.html")]);
        let page = out.pages[0].as_ref().unwrap();
        assert_eq!(page.front_matter, Metadata::new());
        assert_eq!(page.content, "<p>x</p>");
        assert_eq!(out.diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn test_duplicate_ids_are_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "A");
        write(dir.path(), "a.html", "B");
        write(dir.path(), "a.jade", "p C");
        let out = resolve_all(
            dir.path(),
            &Metadata::new(),
            &[entry("a.md"), entry("a.html"), entry("a.jade")],
        );
        let ids: Vec<_> = out.pages.iter().flatten().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "a-1", "a-2"]);
        assert_eq!(out.diagnostics.count(Severity::Warning), 2);
    }
}
