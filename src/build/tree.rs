//! Section page-list expansion.
//!
//! A page reference ending in `.yaml` names a list file whose entries are
//! spliced into the section in its place. Entries resolve relative to the list
//! file's own directory, and lists may name further lists.

use std::path::Path;

use serde_yaml::Value;

use super::format::is_list_reference;
use super::paths::{join_reference, resolve_against};
use super::pipeline::PipelineContext;
use crate::config::{PageEntry, scalar_to_string};

/// A page reference after list expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    /// A reference to resolve as a page
    Entry(String),
    /// A list file that could not be expanded; rendered as literal text
    Unexpanded(String),
}

/// Expand every list file reference in a section's page entries.
pub fn expand_pages(entries: &[PageEntry], ctx: &mut PipelineContext) -> Vec<PageRef> {
    let references = entries.iter().map(|e| e.as_str().to_string()).collect();
    let mut chain = Vec::new();
    expand(references, &mut chain, ctx)
}

/// Build a new sequence with each list reference replaced by its expansion.
///
/// `chain` holds the list files currently being expanded, outermost first.
fn expand(
    references: Vec<String>,
    chain: &mut Vec<String>,
    ctx: &mut PipelineContext,
) -> Vec<PageRef> {
    let mut expanded = Vec::with_capacity(references.len());

    for reference in references {
        if !is_list_reference(&reference) {
            expanded.push(PageRef::Entry(reference));
            continue;
        }

        let path = resolve_against(ctx.base_path, &reference);
        if !path.is_file() {
            // Resolved later as literal text, with an advisory.
            expanded.push(PageRef::Entry(reference));
            continue;
        }

        if chain.contains(&reference) {
            ctx.diagnostics.error(
                Some(&path),
                format!(
                    "list file includes itself through {}; leaving it unexpanded",
                    chain.join(" -> ")
                ),
            );
            expanded.push(PageRef::Unexpanded(reference));
            continue;
        }

        ctx.watch.register(&path);
        match load_list(&path) {
            Ok(entries) => {
                log::debug!("expanding {} ({} entries)", reference, entries.len());
                let children = entries
                    .iter()
                    .map(|entry| join_reference(&reference, entry))
                    .collect();
                chain.push(reference);
                expanded.extend(expand(children, chain, ctx));
                chain.pop();
            }
            Err(message) => {
                ctx.diagnostics.warning(
                    Some(&path),
                    format!("{message}; treating the reference as literal text"),
                );
                expanded.push(PageRef::Unexpanded(reference));
            }
        }
    }

    expanded
}

/// Read a list file, which must hold a plain list of page references.
fn load_list(path: &Path) -> Result<Vec<String>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read list file: {e}"))?;
    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| format!("failed to parse list file: {e}"))?;

    let Value::Sequence(items) = value else {
        return Err("list file must contain a plain list of page references".to_string());
    };
    items
        .iter()
        .map(|item| {
            scalar_to_string(item)
                .ok_or_else(|| format!("list file entry {item:?} is not a page reference"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::build::diagnostics::{Diagnostics, Severity};
    use crate::build::format::FormatRegistry;
    use crate::build::watch::WatchRegistry;
    use crate::config::Metadata;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn entries(refs: &[&str]) -> Vec<PageEntry> {
        refs.iter()
            .map(|r| serde_yaml::from_value(serde_yaml::Value::from(*r)).unwrap())
            .collect()
    }

    fn entry(r: &str) -> PageRef {
        PageRef::Entry(r.to_string())
    }

    struct Expansion {
        pages: Vec<PageRef>,
        diagnostics: Diagnostics,
        watched: Vec<PathBuf>,
    }

    fn run(dir: &Path, refs: &[&str]) -> Expansion {
        let formats = FormatRegistry::with_defaults();
        let deck = Metadata::defaults();
        let mut ctx = PipelineContext::new(dir, &formats, &deck, WatchRegistry::new());
        let pages = expand_pages(&entries(refs), &mut ctx);
        let PipelineContext {
            diagnostics, watch, ..
        } = ctx;
        Expansion {
            pages,
            diagnostics,
            watched: watch.into_paths(),
        }
    }

    #[test]
    fn test_plain_references_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(dir.path(), &["Title Slide", "intro.md"]);
        assert_eq!(out.pages, [entry("Title Slide"), entry("intro.md")]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_list_is_spliced_in_place() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "parts/list.yaml", "- a.md\n- b.md\n");

        let out = run(dir.path(), &["first", "parts/list.yaml", "last"]);
        assert_eq!(
            out.pages,
            [entry("first"), entry("parts/a.md"), entry("parts/b.md"), entry("last")]
        );
        assert_eq!(out.watched, [dir.path().join("parts/list.yaml")]);
    }

    #[test]
    fn test_nested_lists_resolve_from_their_own_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "outer.yaml", "- one.md\n- inner/list.yaml\n- ../up.md\n");
        write(dir.path(), "inner/list.yaml", "- two.md\n- ../three.md\n");

        let out = run(dir.path(), &["outer.yaml"]);
        assert_eq!(
            out.pages,
            [entry("one.md"), entry("inner/two.md"), entry("three.md"), entry("../up.md")]
        );
        assert_eq!(out.watched.len(), 2);
    }

    #[test]
    fn test_non_list_is_left_unexpanded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "map.yaml", "a: b\n");

        let out = run(dir.path(), &["map.yaml", "x.md"]);
        assert_eq!(out.pages, [PageRef::Unexpanded("map.yaml".into()), entry("x.md")]);
        assert_eq!(out.diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn test_nested_list_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.yaml", "- a.md\n- [b.md]\n");

        let out = run(dir.path(), &["bad.yaml"]);
        assert_eq!(out.pages, [PageRef::Unexpanded("bad.yaml".into())]);
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_missing_list_is_kept_for_the_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(dir.path(), &["gone.yaml"]);
        assert_eq!(out.pages, [entry("gone.yaml")]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_cyclic_list_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.yaml", "- a.md\n- b.yaml\n");
        write(dir.path(), "b.yaml", "- b.md\n- a.yaml\n");

        let out = run(dir.path(), &["a.yaml"]);
        assert_eq!(
            out.pages,
            [entry("a.md"), entry("b.md"), PageRef::Unexpanded("a.yaml".into())]
        );
        assert_eq!(out.diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn test_empty_list_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "empty.yaml", "[]\n");

        let out = run(dir.path(), &["empty.yaml", "x"]);
        assert_eq!(out.pages, [entry("x")]);
    }
}
