//! Template composition for page bodies.
//!
//! HTML and terse-markup pages are rendered through Tera. Before compiling,
//! a preamble of `{% extends %}` / `{% include %}` directives is assembled from
//! the page metadata, and every target that exists is registered as a named
//! template next to the page. Literal pages use the same renderer without a
//! preamble.
//!
//! A page that fails to compile or render is replaced by its escaped source in
//! a `<pre>` block and the failure is reported. One bad page never stops a
//! build.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use super::diagnostics::Diagnostics;
use super::format::FormatRegistry;
use super::paths::{reference_dir, resolve_against};
use super::terse;
use super::watch::WatchRegistry;
use crate::config::Metadata;
use crate::util::{clean_path, slash_path};

#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("failed to read template {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("failed to compile {0}: {1}")]
    Terse(PathBuf, terse::TerseError),
}

/// Values visible to page templates.
#[derive(Debug, Serialize)]
struct PageTemplateContext<'a> {
    metadata: &'a Metadata,
}

/// A page handed to the composer.
pub struct ComposeInput<'a> {
    /// Reference of the page, relative to the deck directory
    pub reference: &'a str,
    /// Template source, after any terse-markup compilation
    pub body: &'a str,
    /// Unprocessed page body, shown if rendering fails
    pub raw_body: &'a str,
    /// Resolved page metadata
    pub metadata: &'a Metadata,
}

/// Shared services the composer reports to.
pub struct ComposeEnv<'a, 'w> {
    pub base_path: &'a Path,
    pub formats: &'a FormatRegistry,
    pub diagnostics: &'a mut Diagnostics,
    pub watch: &'a mut WatchRegistry<'w>,
}

/// A named template registered alongside the page.
struct Target {
    name: String,
    source: String,
}

/// Compose and render an HTML or terse-markup page.
pub fn compose_page(page: &ComposeInput, env: &mut ComposeEnv) -> String {
    let path = Path::new(page.reference);
    let extends = page.metadata.get_text("extends");
    let includes = collect_includes(page.metadata, path, env.diagnostics);

    let mut preamble = String::new();
    let mut targets = Vec::new();

    if let Some(extends) = extends {
        match resolve_target(&extends, page.reference, false, env) {
            Some(target) => {
                preamble.push_str(&format!("{{% extends \"{}\" %}}\n", target.name));
                targets.push(target);
            }
            None => env.diagnostics.error(
                Some(path),
                format!("extends target '{extends}' not found; rendering without it"),
            ),
        }
    }

    let includes = if targets.is_empty() || includes.is_empty() {
        includes
    } else {
        env.diagnostics.warning(
            Some(path),
            "both 'extends' and includes are declared; includes are ignored while 'extends' applies",
        );
        Vec::new()
    };

    for include in &includes {
        match resolve_target(include, page.reference, true, env) {
            Some(target) => {
                preamble.push_str(&format!("{{% include \"{}\" %}}\n", target.name));
                if !targets.iter().any(|t: &Target| t.name == target.name) {
                    targets.push(target);
                }
            }
            None => env.diagnostics.error(
                Some(path),
                format!("include target '{include}' not found; skipping it"),
            ),
        }
    }

    let source = format!("{preamble}{}", page.body);
    render_or_fallback(page.reference, &source, targets, page, env.diagnostics)
}

/// Render a literal page through the template language, without composition.
pub fn render_literal(
    name: &str,
    text: &str,
    metadata: &Metadata,
    diagnostics: &mut Diagnostics,
) -> String {
    let page = ComposeInput {
        reference: name,
        body: text,
        raw_body: text,
        metadata,
    };
    render_or_fallback(name, text, Vec::new(), &page, diagnostics)
}

/// The escaped source shown in place of a page that failed to render.
pub fn fallback_html(raw_body: &str) -> String {
    format!(
        "<pre class=\"render-error\">{}</pre>",
        tera::escape_html(raw_body)
    )
}

fn render_or_fallback(
    name: &str,
    source: &str,
    targets: Vec<Target>,
    page: &ComposeInput,
    diagnostics: &mut Diagnostics,
) -> String {
    match render(name, source, targets, page.metadata) {
        Ok(html) => html,
        Err(e) => {
            diagnostics.error(
                Some(Path::new(page.reference)),
                format!("failed to render page, showing its source instead: {}", error_chain(&e)),
            );
            fallback_html(page.raw_body)
        }
    }
}

fn render(
    name: &str,
    source: &str,
    targets: Vec<Target>,
    metadata: &Metadata,
) -> Result<String, ComposeError> {
    let mut tera = Tera::default();
    // Escape interpolated values in every page template, whatever its suffix.
    tera.autoescape_on(vec![""]);

    let mut templates: Vec<(String, String)> = targets
        .into_iter()
        .map(|target| (target.name, target.source))
        .collect();
    templates.push((name.to_string(), source.to_string()));
    tera.add_raw_templates(templates)?;

    let context = Context::from_serialize(PageTemplateContext { metadata })?;
    Ok(tera.render(name, &context)?)
}

/// Deck-level `includes` followed by the page's own `include`.
fn collect_includes(metadata: &Metadata, path: &Path, diagnostics: &mut Diagnostics) -> Vec<String> {
    let mut includes = Vec::new();
    for key in ["includes", "include"] {
        match metadata.names(key) {
            Ok(names) => includes.extend(names),
            Err(message) => diagnostics.error(Some(path), message),
        }
    }
    includes
}

/// Find an extends/include target relative to the page. Deck-wide includes
/// may also be written relative to the deck itself.
fn resolve_target(
    name: &str,
    page_reference: &str,
    deck_fallback: bool,
    env: &mut ComposeEnv,
) -> Option<Target> {
    let mut candidates = vec![clean_path(&reference_dir(page_reference).join(name))];
    if deck_fallback {
        candidates.push(clean_path(Path::new(name)));
    }

    let reference = candidates
        .into_iter()
        .find(|candidate| resolve_against(env.base_path, &slash_path(candidate)).is_file())?;
    let name = slash_path(&reference);
    let full_path = resolve_against(env.base_path, &name);

    env.watch.register(&full_path);

    match load_target(&full_path, env.formats) {
        Ok(source) => Some(Target { name, source }),
        Err(e) => {
            env.diagnostics.error(Some(&full_path), e.to_string());
            None
        }
    }
}

fn load_target(path: &Path, formats: &FormatRegistry) -> Result<String, ComposeError> {
    let source =
        std::fs::read_to_string(path).map_err(|e| ComposeError::Read(path.to_path_buf(), e))?;
    if formats.is_terse(path) {
        return terse::compile(&source).map_err(|e| ComposeError::Terse(path.to_path_buf(), e));
    }
    Ok(source)
}

/// Tera nests the useful part of an error in its source chain.
fn error_chain(error: &ComposeError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
