//! Page reference and id conversion utilities.
//!
//! This module handles conversions between:
//! - Page references (strings as written in the deck or a list file)
//! - Filesystem paths (references resolved against the deck directory)
//! - Page ids (references with their format suffix removed)

use std::path::{Path, PathBuf};

use crate::util::{clean_path, slash_path};

/// Character that replaces path separators in derived page ids.
pub const ID_JOINER: char = '-';

/// Prefix of the ids given to literal pages.
pub const AUTO_PAGE_PREFIX: &str = "auto-page-";

/// Resolve an entry of a list file relative to the list file's own directory.
///
/// # Examples
/// ```ignore
/// join_reference("parts/list.yaml", "a.md") => "parts/a.md"
/// join_reference("list.yaml", "./a.md") => "a.md"
/// join_reference("parts/list.yaml", "../b.md") => "b.md"
/// ```
pub fn join_reference(list_ref: &str, entry: &str) -> String {
    let joined = reference_dir(list_ref).join(entry);
    slash_path(&clean_path(&joined))
}

/// The directory a reference lives in (empty for top-level references).
pub fn reference_dir(reference: &str) -> PathBuf {
    Path::new(reference)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Resolve a reference against the deck directory.
pub fn resolve_against(base_path: &Path, reference: &str) -> PathBuf {
    base_path.join(reference)
}

/// The lowercased suffix of a reference, if it has one.
pub fn extension_of(reference: &str) -> Option<String> {
    Path::new(reference)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Derive a page id from a file reference.
///
/// # Examples
/// ```ignore
/// page_id("intro.md") => "intro"
/// page_id("parts/deep/dive.html") => "parts-deep-dive"
/// page_id("./cover.jade") => "cover"
/// ```
pub fn page_id(reference: &str) -> String {
    let stem = clean_path(&Path::new(reference).with_extension(""));
    slash_path(&stem).replace('/', &ID_JOINER.to_string())
}

/// Id of the `n`-th literal page of a build.
pub fn auto_page_id(n: usize) -> String {
    format!("{AUTO_PAGE_PREFIX}{n}")
}
