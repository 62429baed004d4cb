//! Whole-set transform commands: redundancy removal, randomize, consolidate

use std::path::Path;

use crate::Result;
use crate::batch::Operation;
use crate::cli::BatchArgs;
use crate::config::TagsmithConfig;
use crate::dataset::{DatasetSource, TagExtension};
use crate::rules::TagTransform;

/// Execute a transform over every tag file in `folder`
///
/// # Errors
/// Returns an error if the folder cannot be read or the run is cancelled.
pub fn execute(
    config: &TagsmithConfig,
    folder: &Path,
    transform: TagTransform,
    batch: BatchArgs,
    ext: Option<TagExtension>,
    quiet: bool,
) -> Result<()> {
    let source = config.source(ext);
    let count = source.discover(folder)?.len();
    let prompt = format!(
        "Run {} on {count} file(s) in {}?",
        transform.name(),
        folder.display()
    );
    if !super::confirm(&prompt, batch.yes || quiet)? {
        if !quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    let processor = super::processor(source, config.execution_mode(batch.parallel), quiet);
    let result =
        super::run_with_progress(processor, folder, Operation::Transform(transform), quiet)?;
    if !quiet {
        result.print(transform.name());
    }
    result.ensure_complete()
}
