//! Process command - several processing steps in one run
//!
//! Steps always run in the same order, whatever order they were selected in:
//! rules, randomize, renumber, consolidate, redundancy removal, replacement.
//! The folder is rediscovered for every step, so steps after a renumbering see
//! the new names. A cancelled step ends the pipeline.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use colored::Colorize;
use tracing::info;

use crate::batch::{BatchProcessor, BatchResult, CancelToken, Operation, ProgressSink};
use crate::cli::{BatchArgs, RuleArgs};
use crate::config::{ProcessDefaults, TagsmithConfig};
use crate::dataset::{self, DatasetSource, FolderSource, RenumberReport, TagExtension};
use crate::rules::{EditRules, TagTransform};
use crate::{Result, TagsmithError, output};

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStep {
    ApplyRules,
    Randomize,
    Renumber,
    Consolidate,
    RemoveRedundant,
    Replace,
}

impl ProcessStep {
    /// Execution order
    pub const ORDER: [Self; 6] = [
        Self::ApplyRules,
        Self::Randomize,
        Self::Renumber,
        Self::Consolidate,
        Self::RemoveRedundant,
        Self::Replace,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ApplyRules => "Apply Rules",
            Self::Randomize => TagTransform::Randomize.name(),
            Self::Renumber => "Renumber",
            Self::Consolidate => TagTransform::Consolidate.name(),
            Self::RemoveRedundant => TagTransform::RemoveRedundant.name(),
            Self::Replace => "Replace Tags",
        }
    }

    const fn selected(self, steps: &ProcessDefaults) -> bool {
        match self {
            Self::ApplyRules => steps.apply_rules,
            Self::Randomize => steps.randomize,
            Self::Renumber => steps.renumber,
            Self::Consolidate => steps.consolidate,
            Self::RemoveRedundant => steps.remove_redundant,
            Self::Replace => steps.replace,
        }
    }
}

impl fmt::Display for ProcessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a single step
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Batch(BatchResult),
    Renumber(RenumberReport),
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: ProcessStep,
    pub outcome: StepOutcome,
}

/// Result of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Steps that ran, in order
    pub steps: Vec<StepReport>,
    pub elapsed: Duration,
    /// A step was cancelled and the remaining ones did not run
    pub cancelled: bool,
}

impl PipelineReport {
    /// Batch result of `step`, if it ran
    #[must_use]
    pub fn batch(&self, step: ProcessStep) -> Option<&BatchResult> {
        self.steps.iter().find_map(|s| match &s.outcome {
            StepOutcome::Batch(result) if s.step == step => Some(result),
            _ => None,
        })
    }

    pub fn print(&self) {
        println!("\n{}", "=== Process Summary ===".bold());
        for report in &self.steps {
            match &report.outcome {
                StepOutcome::Batch(result) => {
                    let mark = if result.error_count() > 0 {
                        "✗".red()
                    } else {
                        "✓".green()
                    };
                    println!(
                        "  {mark} {}: {} of {} file(s) modified",
                        report.step,
                        result.modified(),
                        result.total
                    );
                    for (path, failure) in result.errors() {
                        println!("      - {}: {}", output::file_name(path), failure.message);
                    }
                }
                StepOutcome::Renumber(r) if r.already_numbered() => {
                    println!("  {} {}: already numbered", "⊘".yellow(), report.step);
                }
                StepOutcome::Renumber(r) => {
                    println!(
                        "  {} {}: {} pair(s), {} file(s) renamed",
                        "✓".green(),
                        report.step,
                        r.pairs,
                        r.renamed_files
                    );
                }
            }
        }
        if self.cancelled {
            println!("  {}", "⊘ Cancelled".yellow());
        }
        println!("Processing completed in {:.2?}", self.elapsed);
    }
}

/// A selection of steps with the settings they need
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: ProcessDefaults,
    rules: EditRules,
    start: u64,
}

impl Pipeline {
    #[must_use]
    pub const fn new(steps: ProcessDefaults, rules: EditRules, start: u64) -> Self {
        Self {
            steps,
            rules,
            start,
        }
    }

    /// Selected steps in execution order
    #[must_use]
    pub fn steps(&self) -> Vec<ProcessStep> {
        ProcessStep::ORDER
            .into_iter()
            .filter(|s| s.selected(&self.steps))
            .collect()
    }

    /// Rules for the rules step; replacement is left to its own step when selected
    fn step_rules(&self) -> EditRules {
        if self.steps.replace {
            EditRules {
                replace_from: Vec::new(),
                replace_to: Vec::new(),
                ..self.rules.clone()
            }
        } else {
            self.rules.clone()
        }
    }

    /// Check the selection before anything is touched
    ///
    /// # Errors
    /// Returns `Validation` when no step is selected, a selected step lacks its
    /// input, the rules are malformed or the start number is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.steps.any() {
            return Err(TagsmithError::Validation(
                "No processing steps selected".into(),
            ));
        }
        self.rules.validate()?;
        if self.steps.apply_rules && self.step_rules().is_empty() {
            return Err(TagsmithError::Validation(
                "Rule step selected but no rules given".into(),
            ));
        }
        if self.steps.replace && self.rules.replace_from.is_empty() {
            return Err(TagsmithError::Validation(
                "Replacement step selected but no tags to replace".into(),
            ));
        }
        if self.steps.renumber && self.start == 0 {
            return Err(TagsmithError::Validation(
                "Starting number must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn operation(&self, step: ProcessStep) -> Option<Operation> {
        match step {
            ProcessStep::ApplyRules => Some(Operation::ApplyRules(self.step_rules())),
            ProcessStep::Randomize => Some(Operation::Transform(TagTransform::Randomize)),
            ProcessStep::Consolidate => Some(Operation::Transform(TagTransform::Consolidate)),
            ProcessStep::RemoveRedundant => {
                Some(Operation::Transform(TagTransform::RemoveRedundant))
            }
            ProcessStep::Replace => Some(Operation::Replace {
                from: self.rules.replace_from.clone(),
                to: self.rules.replace_to.clone(),
            }),
            ProcessStep::Renumber => None,
        }
    }

    /// Run the selected steps over `folder`.
    ///
    /// # Errors
    /// Returns validation errors before any step runs, and the first
    /// whole-step error (discovery, renumbering) after that. Per-file failures
    /// are recorded in the step's [`BatchResult`].
    pub fn run(
        &self,
        processor: &BatchProcessor<FolderSource>,
        folder: &Path,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<PipelineReport> {
        self.validate()?;
        let started = Instant::now();
        let mut report = PipelineReport::default();

        for step in self.steps() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            info!(step = step.name(), "process step started");
            let outcome = match self.operation(step) {
                Some(operation) => {
                    StepOutcome::Batch(processor.run(folder, &operation, progress, cancel)?)
                }
                None => StepOutcome::Renumber(dataset::renumber(
                    processor.source(),
                    folder,
                    self.start,
                    progress,
                )?),
            };
            let cancelled = matches!(&outcome, StepOutcome::Batch(r) if r.cancelled);
            report.steps.push(StepReport { step, outcome });
            if cancelled {
                report.cancelled = true;
                break;
            }
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }
}

/// Step flags given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct StepFlags {
    pub apply_rules: bool,
    pub randomize: bool,
    pub renumber: bool,
    pub consolidate: bool,
    pub remove_redundant: bool,
    pub replace: bool,
}

impl From<StepFlags> for ProcessDefaults {
    fn from(f: StepFlags) -> Self {
        Self {
            apply_rules: f.apply_rules,
            randomize: f.randomize,
            renumber: f.renumber,
            consolidate: f.consolidate,
            remove_redundant: f.remove_redundant,
            replace: f.replace,
        }
    }
}

/// Execute the process command. Without step flags the `[process]` section of
/// the configuration decides which steps run.
///
/// # Errors
/// Returns an error if validation fails, a step fails as a whole, the user
/// declines, or the run is cancelled.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &TagsmithConfig,
    folder: &Path,
    flags: StepFlags,
    start: Option<u64>,
    rule_args: &RuleArgs,
    batch: BatchArgs,
    ext: Option<TagExtension>,
    quiet: bool,
) -> Result<()> {
    let mut steps = ProcessDefaults::from(flags);
    if !steps.any() {
        steps = config.process;
    }
    let pipeline = Pipeline::new(
        steps,
        rule_args.to_rules()?,
        start.unwrap_or(config.start_number),
    );
    pipeline.validate()?;

    let source = config.source(ext);
    let count = source.discover(folder)?.len();
    let names: Vec<&str> = pipeline.steps().iter().map(|s| s.name()).collect();
    let prompt = format!(
        "Run [{}] on {count} file(s) in {}?",
        names.join(", "),
        folder.display()
    );
    if !super::confirm(&prompt, batch.yes || quiet)? {
        if !quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    let processor = super::processor(source, config.execution_mode(batch.parallel), quiet);
    let bar = output::BarProgress::new(output::progress_bar("Processing", quiet));
    let report = pipeline.run(&processor, folder, &bar, &CancelToken::new())?;
    bar.finish();

    if !quiet {
        report.print();
    }
    if report.cancelled {
        let (processed, total) = report
            .steps
            .last()
            .and_then(|s| match &s.outcome {
                StepOutcome::Batch(r) => Some((r.processed(), r.total)),
                StepOutcome::Renumber(_) => None,
            })
            .unwrap_or((0, count));
        return Err(TagsmithError::Cancelled { processed, total });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::NoProgress;
    use crate::testing::TestDataset;

    fn steps(f: impl FnOnce(&mut ProcessDefaults)) -> ProcessDefaults {
        let mut s = ProcessDefaults::default();
        f(&mut s);
        s
    }

    fn processor() -> BatchProcessor<FolderSource> {
        BatchProcessor::new(FolderSource::default())
    }

    #[test]
    fn test_steps_follow_fixed_order() {
        let pipeline = Pipeline::new(
            steps(|s| {
                s.replace = true;
                s.randomize = true;
                s.renumber = true;
            }),
            EditRules::default(),
            1,
        );
        assert_eq!(
            pipeline.steps(),
            vec![
                ProcessStep::Randomize,
                ProcessStep::Renumber,
                ProcessStep::Replace
            ]
        );
    }

    #[test]
    fn test_validation() {
        let none = Pipeline::new(ProcessDefaults::default(), EditRules::default(), 1);
        assert!(none.validate().is_err());

        let zero = Pipeline::new(steps(|s| s.renumber = true), EditRules::default(), 0);
        assert!(matches!(zero.validate(), Err(TagsmithError::Validation(_))));

        let no_rules = Pipeline::new(steps(|s| s.apply_rules = true), EditRules::default(), 1);
        assert!(no_rules.validate().is_err());

        let no_replace = Pipeline::new(steps(|s| s.replace = true), EditRules::default(), 1);
        assert!(no_replace.validate().is_err());
    }

    #[test]
    fn test_validation_happens_before_any_step() {
        let ds = TestDataset::new();
        ds.add_item("b", "a");
        let pipeline = Pipeline::new(
            steps(|s| {
                s.consolidate = true;
                s.renumber = true;
            }),
            EditRules::default(),
            0,
        );
        assert!(
            pipeline
                .run(&processor(), ds.path(), &NoProgress, &CancelToken::new())
                .is_err()
        );
        assert_eq!(ds.file_names(), vec!["b.png", "b.txt"]);
    }

    #[test]
    fn test_full_pipeline() {
        let ds = TestDataset::new();
        ds.add_item("5", "cat, Cat, hair, long hair, blurry");
        ds.add_item("9", "dog, dog");
        let rules = EditRules {
            remove: vec!["blurry".into()],
            replace_from: vec!["dog".into()],
            replace_to: vec!["puppy".into()],
            ..EditRules::default()
        };
        let pipeline = Pipeline::new(
            steps(|s| {
                s.apply_rules = true;
                s.renumber = true;
                s.consolidate = true;
                s.remove_redundant = true;
                s.replace = true;
            }),
            rules,
            1,
        );
        let report = pipeline
            .run(&processor(), ds.path(), &NoProgress, &CancelToken::new())
            .unwrap();

        assert!(!report.cancelled);
        assert_eq!(report.steps.len(), 5);
        assert_eq!(
            ds.file_names(),
            vec!["1.png", "1.txt", "2.png", "2.txt"]
        );
        assert_eq!(ds.read_tags("1"), "cat, long hair");
        // Consolidation ran before replacement
        assert_eq!(ds.read_tags("2"), "puppy");
        assert_eq!(
            report.batch(ProcessStep::Replace).map(BatchResult::modified),
            Some(1)
        );
    }

    #[test]
    fn test_cancelled_pipeline_runs_nothing() {
        let ds = TestDataset::new();
        ds.add_item("1", "a, a");
        let token = CancelToken::new();
        token.cancel();
        let report = Pipeline::new(steps(|s| s.consolidate = true), EditRules::default(), 1)
            .run(&processor(), ds.path(), &NoProgress, &token)
            .unwrap();
        assert!(report.cancelled);
        assert!(report.steps.is_empty());
        assert_eq!(ds.read_tags("1"), "a, a");
    }

    #[test]
    fn test_renumber_failure_stops_pipeline() {
        let ds = TestDataset::new();
        ds.add_item("cover", "a, a");
        let pipeline = Pipeline::new(
            steps(|s| {
                s.renumber = true;
                s.consolidate = true;
            }),
            EditRules::default(),
            1,
        );
        let err = pipeline
            .run(&processor(), ds.path(), &NoProgress, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, TagsmithError::Validation(_)));
        assert_eq!(ds.read_tags("cover"), "a, a");
    }
}
