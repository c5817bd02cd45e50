//! Presentation options and their override chain.
//!
//! Options resolve as `defaults < deck < section < page`. Each level replaces
//! a key wholesale; nested values are never merged.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Backend used when the deck does not name one.
pub const DEFAULT_ENGINE: &str = "flowtime";

/// An ordered option map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Mapping);

impl Metadata {
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    /// The built-in option values. Every recognised option has an entry.
    pub fn defaults() -> Self {
        let mut defaults = Self::new();
        defaults.insert("engine", DEFAULT_ENGINE);
        defaults.insert("draft", false);
        defaults.insert("animation", false);
        defaults.insert("math", true);
        defaults.insert("static_path", "static");
        defaults.insert("scripts", Value::Sequence(Vec::new()));
        defaults.insert("styles", Value::Sequence(Vec::new()));
        defaults.insert("includes", Value::Sequence(Vec::new()));
        defaults
    }

    /// Resolve the built-in defaults followed by each layer in order, later
    /// layers overriding earlier ones.
    pub fn resolve<'a>(layers: impl IntoIterator<Item = &'a Metadata>) -> Self {
        layers
            .into_iter()
            .fold(Self::defaults(), |acc, layer| acc.overlay(layer))
    }

    /// Return a copy of `self` with every key from `other` replacing ours.
    pub fn overlay(&self, other: &Metadata) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in &other.0 {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(Value::from(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }


    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Read a flag. Absent and non-boolean values are `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Read a scalar option as text (`id: 3` reads as `"3"`).
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(crate::config::scalar_to_string)
    }

    /// Read an option that accepts a single name or a list of names.
    ///
    /// Returns `Err` with a description of the offending shape otherwise.
    pub fn names(&self, key: &str) -> Result<Vec<String>, String> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(name)) => Ok(vec![name.clone()]),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        format!("'{key}' entries must be strings, found {item:?}")
                    })
                })
                .collect(),
            Some(other) => Err(format!(
                "'{key}' must be a name or a list of names, found {other:?}"
            )),
        }
    }

    pub fn engine(&self) -> &str {
        self.get_str("engine").unwrap_or(DEFAULT_ENGINE)
    }

    pub fn draft(&self) -> bool {
        self.flag("draft")
    }

    pub fn animation(&self) -> bool {
        self.flag("animation")
    }

}

impl From<Mapping> for Metadata {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}
