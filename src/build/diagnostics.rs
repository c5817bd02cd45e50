//! Non-fatal build findings.
//!
//! Problems confined to one page never abort a build. They are recorded here,
//! logged as they happen, and handed back to the caller with the result.

use std::fmt;
use std::path::Path;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Probably an authoring mistake; behavior is unchanged.
    Advisory,
    /// Something was degraded or dropped.
    Warning,
    /// Something failed and a fallback or skip took its place.
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The file or page reference the finding is about
    pub path: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advisory(&mut self, path: Option<&Path>, message: impl Into<String>) {
        self.push(Severity::Advisory, path, message.into());
    }

    pub fn warning(&mut self, path: Option<&Path>, message: impl Into<String>) {
        self.push(Severity::Warning, path, message.into());
    }

    pub fn error(&mut self, path: Option<&Path>, message: impl Into<String>) {
        self.push(Severity::Error, path, message.into());
    }

    fn push(&mut self, severity: Severity, path: Option<&Path>, message: String) {
        let diagnostic = Diagnostic {
            severity,
            path: path.map(|p| p.display().to_string()),
            message,
        };
        match severity {
            Severity::Advisory | Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Error => log::error!("{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.iter().filter(|d| d.severity == severity).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
