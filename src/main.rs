use std::path::PathBuf;

use clap::Parser;

mod assets;
mod build;
mod commands;
mod config;
mod engine;
mod util;

/// Build a slide deck from a YAML deck description
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The deck description file
    deck: PathBuf,

    /// The directory the presentation is written to
    output_dir: PathBuf,

    /// Log every build step
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    commands::build::run(&args)
}
