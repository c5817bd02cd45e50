//! Copying presentation resources into the output directory.
//!
//! Engine resources are written while the engine generates its document. Deck
//! resources (`static_path`, `scripts`, `styles`) are copied afterwards so
//! they can replace files the engine provides.

use std::path::{Component, Path, PathBuf};

use crate::config::Metadata;
use crate::util::{clean_path, copy_dir_all};

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a deck resource copy did.
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Number of files written
    pub copied: usize,
    /// Declared sources that do not exist
    pub missing: Vec<PathBuf>,
}

/// Write an engine's bundled resource files into `dst`, each at its
/// relative path.
pub fn copy_engine_resources(
    files: &[(&str, &[u8])],
    dst: &Path,
) -> Result<usize, AssetError> {
    for (name, contents) in files {
        let path = dst.join(name);
        path.parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| std::fs::write(&path, contents))
            .map_err(|source| AssetError::Write { path, source })?;
    }
    Ok(files.len())
}

/// Copy the deck's own resources into `dst`.
///
/// Everything inside `static_path` lands at the top of `dst`; each script and
/// style keeps its path relative to the deck directory.
pub fn copy_deck_resources(
    metadata: &Metadata,
    base_path: &Path,
    dst: &Path,
) -> Result<CopyReport, AssetError> {
    let mut report = CopyReport::default();

    if let Some(static_path) = metadata.get_text("static_path") {
        let src = base_path.join(&static_path);
        if src.is_dir() {
            report.copied += copy_dir_contents(&src, dst)?;
        } else {
            log::debug!("no static directory at {}", src.display());
        }
    }

    for key in ["scripts", "styles"] {
        let names = match metadata.names(key) {
            Ok(names) => names,
            Err(message) => {
                log::warn!("{message}; nothing copied for '{key}'");
                continue;
            }
        };
        for name in names {
            let src = base_path.join(&name);
            if !src.exists() {
                log::warn!("Unable to copy {} since it doesn't exist", src.display());
                report.missing.push(src);
                continue;
            }
            report.copied += copy_entry(&src, &dst.join(output_relative(&name)))?;
        }
    }

    Ok(report)
}

fn copy_dir_contents(src: &Path, dst: &Path) -> Result<usize, AssetError> {
    let entries = std::fs::read_dir(src).map_err(|source| AssetError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    })?;

    let mut copied = 0;
    for entry in entries {
        let entry = entry.map_err(|source| AssetError::Copy {
            from: src.to_path_buf(),
            to: dst.to_path_buf(),
            source,
        })?;
        copied += copy_entry(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(copied)
}

/// Copy a file or a directory tree.
fn copy_entry(src: &Path, dst: &Path) -> Result<usize, AssetError> {
    let result = if src.is_dir() {
        copy_dir_all(src, dst)
    } else {
        dst.parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| std::fs::copy(src, dst))
            .map(|_| 1)
    };
    result.map_err(|source| AssetError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    })
}

/// Where a deck-relative resource lands in the output. References that climb
/// out of the deck directory keep only their file name.
fn output_relative(name: &str) -> PathBuf {
    let cleaned = clean_path(Path::new(name));
    let escapes = cleaned
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        cleaned.file_name().map(PathBuf::from).unwrap_or_default()
    } else {
        cleaned
    }
}
