//! Backends driven by a pair of Tera templates.
//!
//! Each backend ships `document.html`, `outline.html` and the static
//! resources the document links to, all compiled into the binary.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use super::bundled::Bundle;
use super::{Engine, EngineError, OUTLINE_FILE};
use crate::assets;
use crate::build::{Deck, Section};
use crate::config::Metadata;

const DOCUMENT_TEMPLATE: &str = "document.html";
const OUTLINE_TEMPLATE: &str = "outline.html";

/// Values visible to backend templates.
#[derive(Debug, Serialize)]
struct DocumentContext<'a> {
    slides: &'a [Section],
    metadata: &'a Metadata,
    /// Name of the primary document, for links from the outline
    filename: &'a str,
    scripts: Vec<String>,
    styles: Vec<String>,
}

/// A backend rendered from a bundle of templates and resources.
pub struct TemplatedEngine {
    key: &'static str,
    name: &'static str,
    bundle: &'static Bundle,
}

impl TemplatedEngine {
    pub fn new(key: &'static str, name: &'static str, bundle: &'static Bundle) -> Self {
        Self { key, name, bundle }
    }

    fn load_templates(&self) -> Result<Tera, EngineError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (DOCUMENT_TEMPLATE, self.bundle.document),
            (OUTLINE_TEMPLATE, self.bundle.outline),
        ])
        .map_err(|source| EngineError::Template {
            engine: self.name,
            source,
        })?;
        Ok(tera)
    }

    fn render(&self, tera: &Tera, template: &str, context: &Context) -> Result<String, EngineError> {
        tera.render(template, context).map_err(|source| EngineError::Template {
            engine: self.name,
            source,
        })
    }
}

impl Engine for TemplatedEngine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn resources(&self) -> PathBuf {
        Path::new("engines").join(self.key)
    }

    fn generate(
        &self,
        deck: &Deck,
        metadata: &Metadata,
        filename: &str,
        dst: &Path,
    ) -> Result<(), EngineError> {
        let copied = assets::copy_engine_resources(self.bundle.resources, dst)?;
        log::debug!("copied {} {} resource file(s)", copied, self.name);

        let tera = self.load_templates()?;
        let context = Context::from_serialize(DocumentContext {
            slides: &deck.sections,
            metadata,
            filename,
            scripts: names_or_empty(metadata, "scripts"),
            styles: names_or_empty(metadata, "styles"),
        })
        .map_err(|source| EngineError::Template {
            engine: self.name,
            source,
        })?;

        let document = self.render(&tera, DOCUMENT_TEMPLATE, &context)?;
        write_output(&dst.join(filename), &document)?;

        if metadata.draft() {
            let outline = self.render(&tera, OUTLINE_TEMPLATE, &context)?;
            write_output(&dst.join(OUTLINE_FILE), &outline)?;
        }

        Ok(())
    }
}

/// A `scripts`/`styles` option as a list; a malformed value links nothing.
fn names_or_empty(metadata: &Metadata, key: &str) -> Vec<String> {
    metadata.names(key).unwrap_or_else(|message| {
        log::warn!("{message}; no {key} linked");
        Vec::new()
    })
}

fn write_output(path: &Path, content: &str) -> Result<(), EngineError> {
    log::debug!("writing {}", path.display());
    std::fs::write(path, content).map_err(|source| EngineError::Write {
        path: path.to_path_buf(),
        source,
    })
}
