use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::core::{BatchResult, FileOutcome};
use super::progress::{CancelToken, ProgressSink};
use crate::Result;
use crate::dataset::{DatasetItem, DatasetSource};
use crate::rules::{EditRules, RuleEngine, TagTransform};
use crate::status::StatusLog;

/// What a batch does to every tag file
#[derive(Debug, Clone)]
pub enum Operation {
    /// Run the remove / replace / append / emphasize / prepend rules
    ApplyRules(EditRules),
    /// Replacement only, paired by position with broadcast of a single value
    Replace { from: Vec<String>, to: Vec<String> },
    /// Whole-set rewrite
    Transform(TagTransform),
}

impl Operation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ApplyRules(_) => "Apply Rules",
            Self::Replace { .. } => "Replace Tags",
            Self::Transform(t) => t.name(),
        }
    }

    /// Validate the operation and compile it for per-file use
    fn prepare(&self) -> Result<Prepared> {
        match self {
            Self::ApplyRules(rules) => {
                rules.validate()?;
                Ok(Prepared::Rules(RuleEngine::new(rules)))
            }
            Self::Replace { from, to } => {
                let rules = EditRules {
                    replace_from: from.clone(),
                    replace_to: to.clone(),
                    ..EditRules::default()
                };
                rules.validate()?;
                Ok(Prepared::Rules(RuleEngine::new(&rules)))
            }
            Self::Transform(t) => Ok(Prepared::Transform(*t)),
        }
    }
}

enum Prepared {
    Rules(RuleEngine),
    Transform(TagTransform),
}

/// How files of a batch are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One file after another on the calling thread
    #[default]
    Sequential,
    /// Files spread over the rayon thread pool
    Parallel,
}

/// Applies one [`Operation`] to every item of a dataset.
///
/// A failure on one file is recorded in the [`BatchResult`] and the batch moves on.
pub struct BatchProcessor<S> {
    source: S,
    mode: ExecutionMode,
    dry_run: bool,
    log: Option<Arc<dyn StatusLog>>,
}

impl<S: DatasetSource> BatchProcessor<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            mode: ExecutionMode::default(),
            dry_run: false,
            log: None,
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Compute outcomes without writing any file
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn StatusLog>) -> Self {
        self.log = Some(log);
        self
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Discover the items of `folder` and apply `operation` to each.
    ///
    /// The operation is validated before the folder is touched. Cancellation is
    /// checked between files; a cancelled run still returns `Ok` with
    /// `cancelled` set (see [`BatchResult::ensure_complete`]).
    ///
    /// # Errors
    /// Returns `Validation` for invalid rules and the discovery errors of the
    /// dataset source. Per-file failures are recorded, not returned.
    pub fn run(
        &self,
        folder: &Path,
        operation: &Operation,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<BatchResult> {
        let prepared = operation.prepare()?;
        let items = self.source.discover(folder)?;
        Ok(self.process(&items, operation.name(), &prepared, progress, cancel))
    }

    /// Apply `operation` to an already discovered list of items
    ///
    /// # Errors
    /// Returns `Validation` for invalid rules.
    pub fn run_items(
        &self,
        items: &[DatasetItem],
        operation: &Operation,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<BatchResult> {
        let prepared = operation.prepare()?;
        Ok(self.process(items, operation.name(), &prepared, progress, cancel))
    }

    fn process(
        &self,
        items: &[DatasetItem],
        name: &str,
        prepared: &Prepared,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> BatchResult {
        progress.on_total(items.len());
        debug!(operation = name, files = items.len(), mode = ?self.mode, "batch started");

        let (outcomes, cancelled) = match self.mode {
            ExecutionMode::Sequential => {
                let mut outcomes = Vec::with_capacity(items.len());
                let mut cancelled = false;
                for item in items {
                    if cancel.is_cancelled() {
                        cancelled = true;
                        break;
                    }
                    outcomes.push(self.process_one(item, prepared));
                    progress.on_step();
                }
                (outcomes, cancelled)
            }
            ExecutionMode::Parallel => {
                let results: Vec<Option<FileOutcome>> = items
                    .par_iter()
                    .map(|item| {
                        if cancel.is_cancelled() {
                            return None;
                        }
                        let outcome = self.process_one(item, prepared);
                        progress.on_step();
                        Some(outcome)
                    })
                    .collect();
                let cancelled = results.iter().any(Option::is_none);
                (results.into_iter().flatten().collect(), cancelled)
            }
        };

        let result = BatchResult {
            total: items.len(),
            outcomes,
            cancelled,
        };
        self.report(name, &result);
        result
    }

    fn process_one(&self, item: &DatasetItem, prepared: &Prepared) -> FileOutcome {
        let path = item.tags_path.clone();
        let tags = match self.source.read_tags(item) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "read failed");
                return FileOutcome::failed(path, &e);
            }
        };

        let (new_tags, modified) = match prepared {
            Prepared::Rules(engine) => {
                if engine.skips(&tags) {
                    return FileOutcome::skipped(path);
                }
                let applied = engine.apply(&tags);
                (applied.tags, applied.modified)
            }
            Prepared::Transform(transform) => {
                if tags.is_empty() {
                    return FileOutcome::skipped(path);
                }
                let out = transform.apply(&tags);
                let modified = !out.is_identical(&tags);
                (out, modified)
            }
        };

        if !modified {
            return FileOutcome::unchanged(path);
        }
        if !self.dry_run
            && let Err(e) = self.source.write_tags(item, &new_tags)
        {
            warn!(file = %path.display(), error = %e, "write failed");
            return FileOutcome::failed(path, &e);
        }
        FileOutcome::modified(path)
    }

    fn report(&self, name: &str, result: &BatchResult) {
        let Some(log) = &self.log else {
            return;
        };
        for (path, failure) in result.errors() {
            let file = path.file_name().map_or_else(
                || path.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            );
            log.error(&format!("Error processing file {file}: {}", failure.message));
        }
        if result.cancelled {
            log.warning(&format!(
                "Cancelled {name} after {} of {} file(s)",
                result.processed(),
                result.total
            ));
        } else {
            log.info(&format!(
                "{name} completed: {} of {} file(s) modified",
                result.modified(),
                result.total
            ));
        }
    }
}
