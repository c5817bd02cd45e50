//! Registration of files that take part in incremental rebuilds.
//!
//! The build calls [`WatchRegistry::register`] for every file it reads whose
//! change should trigger a rebuild: pages, list files, extends and include
//! targets. A driver that watches the filesystem hooks in with a callback.

use std::path::{Path, PathBuf};

/// Collects watched paths and forwards each one, once, to an optional callback.
#[derive(Default)]
pub struct WatchRegistry<'a> {
    callback: Option<Box<dyn FnMut(&Path) + 'a>>,
    watched: Vec<PathBuf>,
}

impl<'a> WatchRegistry<'a> {
    pub fn new() -> Self {
        Self {
            callback: None,
            watched: Vec::new(),
        }
    }

    pub fn with_callback(callback: impl FnMut(&Path) + 'a) -> Self {
        Self {
            callback: Some(Box::new(callback)),
            watched: Vec::new(),
        }
    }

    /// Register a file. Repeat registrations of the same path are ignored.
    pub fn register(&mut self, path: &Path) {
        if self.watched.iter().any(|p| p == path) {
            return;
        }
        log::debug!("watching {}", path.display());
        self.watched.push(path.to_path_buf());
        if let Some(callback) = self.callback.as_mut() {
            callback(path);
        }
    }

    /// Registered paths, in first-registration order.
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.watched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_invokes_callback_once_per_path() {
        let mut seen = Vec::new();
        {
            let mut registry = WatchRegistry::with_callback(|p: &Path| seen.push(p.to_path_buf()));
            registry.register(Path::new("a.md"));
            registry.register(Path::new("b.yaml"));
            registry.register(Path::new("a.md"));
            assert_eq!(registry.into_paths().len(), 2);
        }
        assert_eq!(seen, [PathBuf::from("a.md"), PathBuf::from("b.yaml")]);
    }

    #[test]
    fn test_register_without_callback() {
        let mut registry = WatchRegistry::new();
        registry.register(Path::new("x.html"));
        assert_eq!(registry.into_paths(), [PathBuf::from("x.html")]);
    }
}
