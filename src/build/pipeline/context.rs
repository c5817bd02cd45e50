//! Pipeline context for sharing state across stages.

use std::path::Path;

use crate::build::compose::ComposeEnv;
use crate::build::diagnostics::Diagnostics;
use crate::build::format::FormatRegistry;
use crate::build::watch::WatchRegistry;
use crate::config::Metadata;

/// Shared context for the whole build.
///
/// The tree loader, the page resolver and every stage read from and report
/// into the same context, so diagnostics and watched files come out in
/// document order.
pub struct PipelineContext<'a, 'w> {
    /// Directory of the deck file; every reference resolves against it
    pub base_path: &'a Path,

    /// Page format registry
    pub formats: &'a FormatRegistry,

    /// Deck-level options resolved over the defaults
    pub deck_metadata: &'a Metadata,

    /// Everything non-fatal that happened during the build
    pub diagnostics: Diagnostics,

    /// Files whose change should trigger a rebuild
    pub watch: WatchRegistry<'w>,
}

impl<'a, 'w> PipelineContext<'a, 'w> {
    pub fn new(
        base_path: &'a Path,
        formats: &'a FormatRegistry,
        deck_metadata: &'a Metadata,
        watch: WatchRegistry<'w>,
    ) -> Self {
        Self {
            base_path,
            formats,
            deck_metadata,
            diagnostics: Diagnostics::new(),
            watch,
        }
    }

    /// Borrow the services the template composer needs.
    pub fn compose_env(&mut self) -> ComposeEnv<'_, 'w> {
        ComposeEnv {
            base_path: self.base_path,
            formats: self.formats,
            diagnostics: &mut self.diagnostics,
            watch: &mut self.watch,
        }
    }
}
