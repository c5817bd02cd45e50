//! Pipeline error types.

use std::path::PathBuf;

/// Errors that abort a build while pages are resolved and processed.
///
/// Everything recoverable is reported through `Diagnostics` instead.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(
        "{path}: found {count} '---' delimiters; a page may carry at most one front-matter block"
    )]
    FrontMatter { path: PathBuf, count: usize },

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl PipelineError {
    /// Create a stage-specific error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
