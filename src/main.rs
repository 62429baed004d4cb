//! Tagsmith CLI application entry point
//!
//! Batch tag editing for image/caption training datasets: every image in a
//! folder has a sibling `.txt` (or `.caption`) file holding its comma-separated
//! tags, and each command rewrites or inspects those files in bulk.
//!
//! # Usage
//!
//! ```bash
//! # Remove, replace and append tags across a folder
//! tagsmith apply data --remove "blurry, lowres" --append masterpiece
//! tagsmith apply data --replace-from "dog, cat" --replace-to animal --dry-run
//!
//! # Several steps in their fixed order
//! tagsmith process data --renumber --consolidate --remove-redundant -y
//!
//! # Most frequent tags as CSV
//! tagsmith frequency data --limit 50 --format csv
//!
//! # 500 prompts of 15 dataset tags each, written to data/generatedPrompts.txt
//! tagsmith prompts data --tags 15 --count 500
//!
//! # Quiet mode (only output results)
//! tagsmith -q filter data "long hair"
//! ```
//!
//! # Configuration
//!
//! Defaults live in the user's config directory (`~/.config/tagsmith/config.toml`
//! on Linux) and are created on first run. Diagnostics go to stderr through
//! `tracing`; set `TAGSMITH_LOG` (e.g. `TAGSMITH_LOG=debug`) or pass `-v`.

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tagsmith::{
    Result,
    cli::{Cli, Commands},
    commands::{self, process::StepFlags},
    config::TagsmithConfig,
    rules::TagTransform,
};

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "TAGSMITH_LOG";

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration and dispatch to the command handler
///
/// # Errors
///
/// Returns `TagsmithError` if configuration loading fails or any command handler
/// returns an error.
fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let config = TagsmithConfig::load(config_path)?;
    let quiet = cli.quiet || config.quiet;
    let ext = cli.ext;

    match &cli.command {
        Commands::Apply {
            folder,
            rules,
            batch,
            dry_run,
        } => commands::apply(&config, folder, rules, *batch, *dry_run, ext, quiet),
        Commands::Process {
            folder,
            apply_rules,
            randomize,
            renumber,
            consolidate,
            remove_redundant,
            replace,
            start,
            rules,
            batch,
        } => {
            let flags = StepFlags {
                apply_rules: *apply_rules,
                randomize: *randomize,
                renumber: *renumber,
                consolidate: *consolidate,
                remove_redundant: *remove_redundant,
                replace: *replace,
            };
            commands::process(&config, folder, flags, *start, rules, *batch, ext, quiet)
        }
        Commands::Frequency {
            folder,
            limit,
            format,
            output,
        } => commands::frequency(&config, folder, *limit, *format, output.as_ref(), ext, quiet),
        Commands::Renumber { folder, start, yes } => {
            commands::renumber(&config, folder, *start, *yes, ext, quiet)
        }
        Commands::Redundancy { folder, batch } => commands::transform(
            &config,
            folder,
            TagTransform::RemoveRedundant,
            *batch,
            ext,
            quiet,
        ),
        Commands::Randomize { folder, batch } => {
            commands::transform(&config, folder, TagTransform::Randomize, *batch, ext, quiet)
        }
        Commands::Consolidate { folder, batch } => commands::transform(
            &config,
            folder,
            TagTransform::Consolidate,
            *batch,
            ext,
            quiet,
        ),
        Commands::Filter {
            folder,
            words,
            exact,
        } => commands::filter(&config, folder, words, *exact, ext, quiet),
        Commands::Prompts { folder, options } => {
            commands::prompts(&config, folder, options, ext, quiet)
        }
        Commands::Config { command } => commands::config(config, config_path, command, quiet),
    }
}

/// Main entry point for the tagsmith application
fn main() {
    let cli = Cli::parse_args();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}
