//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and runs the operation against a dataset folder.

pub mod apply;
pub mod config;
pub mod filter;
pub mod frequency;
pub mod process;
pub mod prompts;
pub mod renumber;
pub mod transform;

// Re-export execute functions for convenience
pub use apply::execute as apply;
pub use config::execute as config;
pub use filter::execute as filter;
pub use frequency::execute as frequency;
pub use process::execute as process;
pub use prompts::execute as prompts;
pub use renumber::execute as renumber;
pub use transform::execute as transform;

use std::path::Path;
use std::sync::Arc;

use dialoguer::Confirm;

use crate::batch::{self, BatchProcessor, BatchResult, ExecutionMode, Operation};
use crate::dataset::FolderSource;
use crate::status::ConsoleLog;
use crate::{Result, TagsmithError, output};

/// Ask for confirmation unless `skip` is set
///
/// # Errors
/// Returns `Validation` if the prompt cannot be shown.
pub fn confirm(prompt: &str, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| TagsmithError::Validation(format!("Failed to get confirmation: {e}")))
}

/// Run `operation` on a background worker while showing a progress bar
///
/// # Errors
/// Returns validation and discovery errors of the batch.
pub fn run_with_progress(
    processor: BatchProcessor<FolderSource>,
    folder: &Path,
    operation: Operation,
    quiet: bool,
) -> Result<BatchResult> {
    let bar = output::progress_bar(operation.name(), quiet);
    let handle = batch::spawn(processor, folder.to_path_buf(), operation);
    output::follow(handle, &bar)
}

/// Processor with console status output
#[must_use]
pub fn processor(source: FolderSource, mode: ExecutionMode, quiet: bool) -> BatchProcessor<FolderSource> {
    BatchProcessor::new(source)
        .with_mode(mode)
        .with_log(Arc::new(ConsoleLog::new(quiet)))
}
