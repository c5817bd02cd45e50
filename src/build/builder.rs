use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{DeckConfig, DetailedSection, Metadata, SectionConfig};

use super::deck::{Deck, Page, Section};
use super::diagnostics::Diagnostics;
use super::format::FormatRegistry;
use super::pipeline::{Pipeline, PipelineContext, PipelineError, ProcessingPage};
use super::resolve::PageResolver;
use super::tree::expand_pages;
use super::watch::WatchRegistry;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("section id '{0}' is used by more than one section")]
    DuplicateSection(String),
}

#[derive(Debug)]
pub struct BuildResult {
    pub deck: Deck,
    /// Every non-fatal problem, in the order it was found
    pub diagnostics: Diagnostics,
    /// Files that take part in incremental rebuilds
    pub watched: Vec<PathBuf>,
}

pub struct Builder<'w> {
    config: DeckConfig,
    /// Base path for resolving relative references (the deck file's directory)
    base_path: PathBuf,
    formats: FormatRegistry,
    pipeline: Pipeline,
    on_watch: Option<Box<dyn FnMut(&Path) + 'w>>,
}

impl<'w> Builder<'w> {
    pub fn new(config: DeckConfig, base_path: PathBuf) -> Self {
        Self {
            config,
            base_path,
            formats: FormatRegistry::with_defaults(),
            pipeline: Pipeline::default_pipeline(),
            on_watch: None,
        }
    }

    /// Call `callback` once for every file the build reads that should
    /// trigger a rebuild when it changes.
    pub fn on_watch(mut self, callback: impl FnMut(&Path) + 'w) -> Self {
        self.on_watch = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<BuildResult, BuildError> {
        // Build pipeline:
        // 1. Normalize sections and check their ids
        // 2. Expand list files and resolve pages, in document order
        // 3. Run the stages (render, normalize)
        // 4. Assemble the deck
        let Builder {
            config,
            base_path,
            formats,
            pipeline,
            on_watch,
        } = self;

        let sections = section_layout(config.slides)?;
        let deck_metadata = Metadata::resolve([&config.metadata]);
        let watch = match on_watch {
            Some(callback) => WatchRegistry::with_callback(callback),
            None => WatchRegistry::new(),
        };
        let mut ctx = PipelineContext::new(&base_path, &formats, &deck_metadata, watch);

        let mut pages = Vec::new();
        let mut resolver = PageResolver::new(&config.metadata);
        for (index, (id, section)) in sections.iter().enumerate() {
            let refs = expand_pages(&section.pages, &mut ctx);
            log::debug!("section '{}': {} page(s)", id, refs.len());
            for page_ref in &refs {
                let page = resolver.resolve(index, &section.metadata, page_ref, &mut ctx)?;
                pages.extend(page);
            }
        }

        pipeline.run(&mut pages, &mut ctx)?;

        let deck = assemble(sections, pages, deck_metadata.clone());
        log::info!(
            "Built {} page(s) in {} section(s)",
            deck.page_count(),
            deck.sections.len()
        );

        Ok(BuildResult {
            deck,
            diagnostics: ctx.diagnostics,
            watched: ctx.watch.into_paths(),
        })
    }
}

/// Normalize every section to its detailed shape and derive its id.
fn section_layout(
    slides: Vec<(String, SectionConfig)>,
) -> Result<Vec<(String, DetailedSection)>, BuildError> {
    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(slides.len());
    for (key, section) in slides {
        let section = section.into_detailed();
        let id = section.metadata.get_text("id").unwrap_or(key);
        if !seen.insert(id.clone()) {
            return Err(BuildError::DuplicateSection(id));
        }
        sections.push((id, section));
    }
    Ok(sections)
}

fn assemble(
    sections: Vec<(String, DetailedSection)>,
    pages: Vec<ProcessingPage>,
    metadata: Metadata,
) -> Deck {
    let mut sections: Vec<Section> = sections
        .into_iter()
        .map(|(id, section)| Section {
            id,
            pages: Vec::new(),
            metadata: section.metadata,
        })
        .collect();

    for page in pages {
        let Some(section) = sections.get_mut(page.section) else {
            continue;
        };
        let page_number = section.pages.len();
        section.pages.push(Page {
            id: page.id,
            html: page.content,
            metadata: page.metadata,
            page_number,
            source_file: page.source_file,
        });
    }

    Deck { sections, metadata }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::diagnostics::Severity;

    struct DeckDir {
        dir: tempfile::TempDir,
    }

    impl DeckDir {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn write(&self, name: &str, content: &str) -> &Self {
            let path = self.dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
            self
        }

        fn build(&self, deck: &str) -> Result<BuildResult, BuildError> {
            let config: DeckConfig = serde_yaml::from_str(deck).unwrap();
            Builder::new(config, self.dir.path().to_path_buf()).build()
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }
    }

    fn ids(section: &Section) -> Vec<&str> {
        section.pages.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_title_slide_and_markdown_page() {
        let deck = DeckDir::new();
        deck.write("intro.md", "# Hi");

        let result = deck.build("slides:\n  main:\n    - Title Slide\n    - intro.md\n").unwrap();
        let section = &result.deck.sections[0];
        assert_eq!(section.id, "main");
        assert_eq!(section.pages.len(), 2);

        assert_eq!(section.pages[0].id, "auto-page-0");
        assert_eq!(section.pages[0].html, "Title Slide");
        assert_eq!(section.pages[0].page_number, 0);
        assert_eq!(section.pages[0].source_file, None);

        assert_eq!(section.pages[1].id, "intro");
        assert_eq!(section.pages[1].html.trim(), "<h1>Hi</h1>");
        assert_eq!(section.pages[1].page_number, 1);
        assert_eq!(section.pages[1].source_file, Some(deck.path("intro.md")));

        assert!(result.diagnostics.is_empty());
        assert_eq!(result.watched, [deck.path("intro.md")]);
    }

    #[test]
    fn test_literal_ids_follow_document_order() {
        let deck = DeckDir::new();
        let yaml = "slides:\n  a: [one, two]\n  b: [three, four]\n  c: [five, six]\n";

        let result = deck.build(yaml).unwrap();
        let sections = &result.deck.sections;
        assert_eq!(sections.len(), 3);
        assert_eq!(ids(&sections[0]), ["auto-page-0", "auto-page-1"]);
        assert_eq!(ids(&sections[1]), ["auto-page-2", "auto-page-3"]);
        assert_eq!(ids(&sections[2]), ["auto-page-4", "auto-page-5"]);
        assert_eq!(sections[2].pages[1].page_number, 1);
        assert_eq!(sections[2].pages[1].html, "six");
    }

    #[test]
    fn test_two_front_matter_blocks_abort_the_build() {
        let deck = DeckDir::new();
        deck.write("bad.md", "a: 1\n---\nbody\n---\nmore");

        let err = deck.build("slides:\n  s: [ok, bad.md]\n").unwrap_err();
        assert!(matches!(
            err,
            BuildError::Pipeline(PipelineError::FrontMatter { count: 2, .. })
        ));
    }

    #[test]
    fn test_list_file_is_spliced() {
        let deck = DeckDir::new();
        deck.write("parts/list.yaml", "[\"a.md\", \"b.md\"]")
            .write("parts/a.md", "A")
            .write("parts/b.md", "B");

        let result = deck.build("slides:\n  s: [cover, parts/list.yaml, end]\n").unwrap();
        let section = &result.deck.sections[0];
        assert_eq!(ids(section), ["auto-page-0", "parts-a", "parts-b", "auto-page-1"]);
        assert!(result.watched.contains(&deck.path("parts/list.yaml")));
    }

    #[test]
    fn test_metadata_precedence() {
        let deck = DeckDir::new();
        deck.write("loud.md", "animation: true\n---\nLoud");
        let yaml = r#"
metadata:
  animation: true
  title: Talk
slides:
  first: [plain]
  second:
    metadata:
      animation: false
    pages: [quiet, loud.md]
"#;
        let result = deck.build(yaml).unwrap();
        let sections = &result.deck.sections;
        assert!(sections[0].pages[0].metadata.animation());
        assert!(!sections[1].pages[0].metadata.animation());
        assert!(sections[1].pages[1].metadata.animation());
        assert_eq!(sections[1].pages[0].metadata.get_str("title"), Some("Talk"));
        assert!(result.deck.metadata.animation());
        assert_eq!(result.deck.metadata.engine(), "flowtime");
    }

    #[test]
    fn test_deck_override_beats_default() {
        let deck = DeckDir::new();
        let result = deck
            .build("metadata:\n  animation: false\n  draft: true\nslides:\n  s: [x]\n")
            .unwrap();
        assert!(!result.deck.metadata.animation());
        assert!(result.deck.metadata.draft());
    }

    #[test]
    fn test_section_id_override_and_duplicates() {
        let deck = DeckDir::new();
        let result = deck
            .build("slides:\n  s:\n    metadata:\n      id: opening\n    pages: [x]\n")
            .unwrap();
        assert_eq!(result.deck.sections[0].id, "opening");

        let err = deck
            .build("slides:\n  a: [x]\n  b:\n    metadata:\n      id: a\n    pages: [y]\n")
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateSection(id) if id == "a"));
    }

    #[test]
    fn test_bad_pages_do_not_stop_siblings() {
        let deck = DeckDir::new();
        deck.write("notes.txt", "skip me")
            .write("broken.html", "{% if %}<b>")
            .write("fine.html", "<p>{{ metadata.title }}</p>");
        let yaml = "metadata:\n  title: T\nslides:\n  s: [notes.txt, broken.html, fine.html, missing.md]\n";

        let result = deck.build(yaml).unwrap();
        let section = &result.deck.sections[0];
        assert_eq!(ids(section), ["broken", "fine", "auto-page-0"]);
        assert!(section.pages[0].html.starts_with("<pre class=\"render-error\">"));
        assert_eq!(section.pages[1].html, "<p>T</p>");
        assert_eq!(section.pages[2].html, "missing.md");
        assert_eq!(section.pages[2].page_number, 2);

        assert_eq!(result.diagnostics.count(Severity::Error), 2);
        assert_eq!(result.diagnostics.count(Severity::Advisory), 1);
    }

    #[test]
    fn test_composed_and_normalized_page() {
        let deck = DeckDir::new();
        deck.write("layout.html", "<section>{% block body %}{% endblock body %}</section>")
            .write(
                "steps.html",
                "id: steps\nclass: dark\nextends: layout.html\n---\n\
                 {% block body %}<steplist><ul><li>a</li><li>b</li></ul></steplist>{% endblock body %}",
            );

        let result = deck
            .build("metadata:\n  animation: true\nslides:\n  s: [steps.html]\n")
            .unwrap();
        let page = &result.deck.sections[0].pages[0];
        assert_eq!(
            page.html,
            "<section class=\"dark\" data-id=\"steps\"><ul>\
             <li class=\"ft-fragment\">a</li><li class=\"ft-fragment\">b</li></ul></section>"
        );
        assert_eq!(
            result.watched,
            [deck.path("steps.html"), deck.path("layout.html")]
        );
    }

    #[test]
    fn test_deck_animation_rewrites_every_page() {
        let deck = DeckDir::new();
        deck.write("calm.html", "animation: false\n---\n<p class=\"c-step\">x</p>");
        let yaml = r#"
metadata:
  animation: true
slides:
  s:
    metadata:
      animation: false
    pages: [calm.html]
"#;
        let result = deck.build(yaml).unwrap();
        let page = &result.deck.sections[0].pages[0];
        assert!(!page.metadata.animation());
        assert_eq!(page.html, "<p class=\"ft-fragment\">x</p>");
    }

    #[test]
    fn test_literal_ids_skip_file_ids() {
        let deck = DeckDir::new();
        deck.write("auto-page-1.md", "File");

        let result = deck.build("slides:\n  s: [auto-page-1.md, one, two]\n").unwrap();
        let section = &result.deck.sections[0];
        assert_eq!(ids(section), ["auto-page-1", "auto-page-0", "auto-page-1-1"]);
        assert_eq!(section.pages[2].html, "two");
        assert_eq!(result.diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn test_terse_page() {
        let deck = DeckDir::new();
        deck.write("cover.jade", "hero\n  h1 {{ metadata.title }}");

        let result = deck
            .build("metadata:\n  title: Welcome\nslides:\n  s: [cover.jade]\n")
            .unwrap();
        let page = &result.deck.sections[0].pages[0];
        assert_eq!(page.id, "cover");
        assert_eq!(
            page.html,
            "<div class=\"stack-center\"><div class=\"stacked-center\">\n<h1>Welcome</h1>\n</div></div>"
        );
    }

    #[test]
    fn test_watch_callback_sees_every_file() {
        let deck = DeckDir::new();
        deck.write("list.yaml", "- a.md\n").write("a.md", "A");
        let config: DeckConfig = serde_yaml::from_str("slides:\n  s: [list.yaml]\n").unwrap();

        let mut seen = Vec::new();
        let result = Builder::new(config, deck.dir.path().to_path_buf())
            .on_watch(|path| seen.push(path.to_path_buf()))
            .build()
            .unwrap();
        assert_eq!(seen, [deck.path("list.yaml"), deck.path("a.md")]);
        assert_eq!(result.watched, seen);
    }
}
