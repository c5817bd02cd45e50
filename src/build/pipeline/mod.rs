//! Page processing pipeline.
//!
//! Resolved pages pass through a series of stages:
//! 1. Render (format dispatch, template composition)
//! 2. Normalize (structural rewrite rules)
//!
//! Stages see every page of the deck at once, in document order.

mod context;
mod error;
mod page;
mod stages;

pub use context::PipelineContext;
pub use error::PipelineError;
pub use page::ProcessingPage;

use stages::{NormalizeStage, RenderStage};

/// A stage in the page processing pipeline.
///
/// Stages transform pages sequentially. Each stage receives all pages
/// and can modify them in place before passing to the next stage.
pub trait Stage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// Process pages through this stage.
    ///
    /// Recoverable problems are reported through `ctx.diagnostics`; an `Err`
    /// aborts the build.
    fn process(
        &self,
        pages: &mut [ProcessingPage],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// The page processing pipeline.
///
/// The default pipeline is: render → normalize.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Create the default pipeline with standard stages.
    pub fn default_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(RenderStage);
        pipeline.add_stage(NormalizeStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run the pipeline on a set of pages.
    pub fn run(
        &self,
        pages: &mut [ProcessingPage],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for stage in &self.stages {
            log::debug!("running stage '{}' on {} pages", stage.name(), pages.len());
            stage.process(pages, ctx)?;
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_order() {
        let pipeline = Pipeline::default_pipeline();
        let names: Vec<_> = pipeline.stages.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["render", "normalize"]);
    }
}
