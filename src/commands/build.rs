use anyhow::Context;

use crate::{
    Args, assets,
    build::{Builder, Severity},
    config::{DeckConfig, Metadata, base_path_from_deck},
    engine::EngineRegistry,
};

/// Name of the primary document written to the output directory.
const OUTPUT_FILE: &str = "index.html";

pub fn run(args: &Args) -> Result<(), anyhow::Error> {
    let config = DeckConfig::load_from_file(&args.deck)?;
    let base_path = base_path_from_deck(&args.deck);

    // Fail on an unknown engine before doing any page work
    let engines = EngineRegistry::with_defaults();
    let engine_name = Metadata::resolve([&config.metadata]).engine().to_string();
    let engine = engines.get(&engine_name)?;

    let result = Builder::new(config, base_path.clone())
        .on_watch(|path| log::trace!("watching {}", path.display()))
        .build()?;

    log::debug!("{} file(s) registered for rebuilds", result.watched.len());
    if !result.diagnostics.is_empty() {
        log::warn!(
            "{} problem(s): {} error(s), {} warning(s), {} advisory note(s)",
            result.diagnostics.len(),
            result.diagnostics.count(Severity::Error),
            result.diagnostics.count(Severity::Warning),
            result.diagnostics.count(Severity::Advisory),
        );
    }

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("failed to create output directory {}", args.output_dir.display())
    })?;

    let deck = &result.deck;
    for page in deck.pages() {
        let source = page.source_file.as_deref().map(|p| p.display().to_string());
        log::debug!("page '{}' from {}", page.id, source.as_deref().unwrap_or("literal"));
    }

    log::debug!("{} from {}", engine.name(), engine.resources().display());
    engine.generate(deck, &deck.metadata, OUTPUT_FILE, &args.output_dir)?;

    let report = assets::copy_deck_resources(&deck.metadata, &base_path, &args.output_dir)?;

    log::info!(
        "Built {} with {} ({} page(s), {} resource file(s))",
        args.output_dir.join(OUTPUT_FILE).display(),
        engine.name(),
        deck.page_count(),
        report.copied
    );

    Ok(())
}
