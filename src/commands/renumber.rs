//! Renumber command - rename image/tag pairs into a numeric sequence

use std::path::Path;

use colored::Colorize;

use crate::config::TagsmithConfig;
use crate::dataset::{self, DatasetSource, TagExtension};
use crate::{Result, output};

/// Execute the renumber command
///
/// # Errors
/// Returns an error if the folder cannot be read, a name is not numeric, a
/// target name collides with another file, or a rename fails.
pub fn execute(
    config: &TagsmithConfig,
    folder: &Path,
    start: Option<u64>,
    yes: bool,
    ext: Option<TagExtension>,
    quiet: bool,
) -> Result<()> {
    let start = start.unwrap_or(config.start_number);
    let source = config.source(ext);
    let count = source.discover(folder)?.len();
    let prompt = format!(
        "Renumber {count} image(s) in {} starting at {start}?",
        folder.display()
    );
    if !super::confirm(&prompt, yes || quiet)? {
        if !quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    let bar = output::BarProgress::new(output::progress_bar("Renumber", quiet));
    let report = dataset::renumber(&source, folder, start, &bar)?;
    bar.finish();

    if quiet {
        return Ok(());
    }
    if report.already_numbered() {
        println!(
            "{} Already numbered from {start}; nothing renamed",
            "⊘".yellow()
        );
    } else {
        println!(
            "{} Renumbered {} pair(s), {} file(s) renamed",
            "✓".green(),
            report.pairs,
            report.renamed_files
        );
    }
    Ok(())
}
