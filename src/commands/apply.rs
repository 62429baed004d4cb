//! Apply command - rule-based edits over a whole folder

use std::path::Path;

use colored::Colorize;

use crate::batch::{BatchResult, Operation};
use crate::cli::{BatchArgs, RuleArgs};
use crate::config::TagsmithConfig;
use crate::dataset::{DatasetSource, TagExtension};
use crate::{Result, TagsmithError, output};

/// Execute the apply command
///
/// # Errors
/// Returns an error if the rules are invalid, the folder cannot be read, the
/// user declines, or the run is cancelled.
pub fn execute(
    config: &TagsmithConfig,
    folder: &Path,
    rule_args: &RuleArgs,
    batch: BatchArgs,
    dry_run: bool,
    ext: Option<TagExtension>,
    quiet: bool,
) -> Result<()> {
    let rules = rule_args.to_rules()?;
    rules.validate()?;
    if rules.is_empty() {
        return Err(TagsmithError::Validation(
            "No rules given. Use --remove, --replace-from/--replace-to, --append, --emphasize, --prepend or --rules".into(),
        ));
    }

    let source = config.source(ext);
    let count = source.discover(folder)?.len();
    if !dry_run
        && !super::confirm(
            &format!("Apply rules to {count} file(s) in {}?", folder.display()),
            batch.yes || quiet,
        )?
    {
        if !quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    let processor = super::processor(source, config.execution_mode(batch.parallel), quiet)
        .dry_run(dry_run);
    let result = super::run_with_progress(processor, folder, Operation::ApplyRules(rules), quiet)?;

    if dry_run {
        print_dry_run(&result, quiet);
    } else if !quiet {
        result.print("Apply Rules");
    }
    result.ensure_complete()
}

fn print_dry_run(result: &BatchResult, quiet: bool) {
    let changed: Vec<_> = result.outcomes.iter().filter(|o| o.modified).collect();
    if quiet {
        for outcome in changed {
            println!("{}", outcome.path.display());
        }
        return;
    }
    println!("{}", "=== Dry Run Mode ===".yellow().bold());
    println!(
        "Would modify {} of {} file(s)",
        changed.len(),
        result.total
    );
    for (i, outcome) in changed.iter().enumerate().take(10) {
        println!("  {}. {}", i + 1, output::file_name(&outcome.path));
    }
    if changed.len() > 10 {
        println!("  ... and {} more", changed.len() - 10);
    }
    println!("\n{}", "Run without --dry-run to apply changes.".yellow());
}
