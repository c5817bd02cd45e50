//! Rendering backends.
//!
//! A backend turns the assembled deck into the final presentation document.
//! Backends are looked up by the deck's `engine` option in an
//! [`EngineRegistry`].

mod bundled;
mod templated;

use std::path::{Path, PathBuf};

pub use templated::TemplatedEngine;

use crate::build::Deck;
use crate::config::Metadata;

/// Name of the outline document written for drafts.
pub const OUTLINE_FILE: &str = "outline.html";

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("unknown engine '{name}' (available: {available})")]
    Unknown { name: String, available: String },

    #[error("template error in engine '{engine}': {source}")]
    Template {
        engine: &'static str,
        #[source]
        source: tera::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Assets(#[from] crate::assets::AssetError),
}

/// A presentation backend.
pub trait Engine: Send + Sync {
    /// Display name.
    fn name(&self) -> &'static str;

    /// Package location of the backend's templates and static resources.
    fn resources(&self) -> PathBuf;

    /// Write the presentation for `deck` into `dst` as `filename`, plus an
    /// outline when `metadata` has `draft` set. The deck is read-only.
    fn generate(
        &self,
        deck: &Deck,
        metadata: &Metadata,
        filename: &str,
        dst: &Path,
    ) -> Result<(), EngineError>;
}

/// Registry of backends keyed by engine name.
pub struct EngineRegistry {
    engines: Vec<(&'static str, Box<dyn Engine>)>,
}

impl EngineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            engines: Vec::new(),
        }
    }

    /// Create a registry with the built-in backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            "flowtime",
            TemplatedEngine::new("flowtime", "Flowtime Engine", &bundled::FLOWTIME),
        );
        registry.register(
            "reveal",
            TemplatedEngine::new("reveal", "Reveal Engine", &bundled::REVEAL),
        );
        registry.register(
            "scrolldeck",
            TemplatedEngine::new("scrolldeck", "Scrolldeck Engine", &bundled::SCROLLDECK),
        );
        registry
    }

    /// Register a backend under `key`. Later registrations take precedence.
    pub fn register<E: Engine + 'static>(&mut self, key: &'static str, engine: E) {
        self.engines.push((key, Box::new(engine)));
    }

    /// Look up a backend by name.
    pub fn get(&self, name: &str) -> Result<&dyn Engine, EngineError> {
        self.engines
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, engine)| engine.as_ref())
            .ok_or_else(|| EngineError::Unknown {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for (key, _) in &self.engines {
            if !names.contains(key) {
                names.push(*key);
            }
        }
        names
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
