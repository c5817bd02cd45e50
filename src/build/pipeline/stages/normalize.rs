//! Fragment normalization stage.

use crate::build::normalize::{NormalizeOptions, normalize_fragment};
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingPage, Stage};

/// Stage that applies the fragment rewrite rules to every rendered page.
///
/// The page's own front matter supplies `id` and `class`. Fragment classes
/// follow the deck-level `animation` option, so section and page overrides
/// do not change them.
pub struct NormalizeStage;

impl Stage for NormalizeStage {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn process(
        &self,
        pages: &mut [ProcessingPage],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        let animation = ctx.deck_metadata.animation();
        for page in pages {
            let id = page.front_matter.get_text("id");
            let class = page.front_matter.get_text("class");
            let options = NormalizeOptions {
                id: id.as_deref(),
                class: class.as_deref(),
                animation,
            };
            page.content = normalize_fragment(&page.content, &options).map_err(|e| {
                PipelineError::stage("normalize", format!("failed to normalize {}: {e}", page.id))
            })?;
        }
        Ok(())
    }
}
