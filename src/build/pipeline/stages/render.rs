//! Page rendering stage.
//!
//! Dispatches on the page's source kind: literal text goes through the
//! template language, HTML and terse markup are composed with extends and
//! includes, markdown is converted directly.

use std::path::Path;

use crate::build::compose::{self, ComposeInput};
use crate::build::format::SourceKind;
use crate::build::markdown::render_markdown;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingPage, Stage};
use crate::build::terse;

/// Stage that renders page content to an HTML fragment.
///
/// Failures are reported per page and replaced by the escaped source, so
/// this stage never fails the build.
pub struct RenderStage;

impl Stage for RenderStage {
    fn name(&self) -> &'static str {
        "render"
    }

    fn process(
        &self,
        pages: &mut [ProcessingPage],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for page in pages {
            page.content = match page.kind {
                SourceKind::Literal => compose::render_literal(
                    &page.id,
                    &page.content,
                    &page.metadata,
                    &mut ctx.diagnostics,
                ),
                SourceKind::Markdown => render_markdown(&page.content),
                SourceKind::Html => compose_page(page, &page.content, ctx),
                SourceKind::TerseMarkup => match terse::compile(&page.content) {
                    Ok(html) => compose_page(page, &html, ctx),
                    Err(e) => {
                        ctx.diagnostics.error(
                            Some(Path::new(&page.reference)),
                            format!("failed to compile page, showing its source instead: {e}"),
                        );
                        compose::fallback_html(&page.body)
                    }
                },
            };
            log::debug!("rendered {} ({:?})", page.id, page.kind);
        }
        Ok(())
    }
}

fn compose_page(page: &ProcessingPage, body: &str, ctx: &mut PipelineContext) -> String {
    let input = ComposeInput {
        reference: &page.reference,
        body,
        raw_body: &page.body,
        metadata: &page.metadata,
    };
    compose::compose_page(&input, &mut ctx.compose_env())
}
