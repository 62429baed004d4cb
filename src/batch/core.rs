use std::path::PathBuf;

use colored::Colorize;

use crate::{ErrorKind, Result, TagsmithError};

/// Why a single file failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&TagsmithError> for FileFailure {
    fn from(err: &TagsmithError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// What happened to one file of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Tag file the outcome refers to
    pub path: PathBuf,
    pub modified: bool,
    /// Left alone without being rewritten (e.g. an empty tag file with nothing to append)
    pub skipped: bool,
    pub error: Option<FileFailure>,
}

impl FileOutcome {
    #[must_use]
    pub fn modified(path: PathBuf) -> Self {
        Self {
            path,
            modified: true,
            skipped: false,
            error: None,
        }
    }

    #[must_use]
    pub fn unchanged(path: PathBuf) -> Self {
        Self {
            path,
            modified: false,
            skipped: false,
            error: None,
        }
    }

    #[must_use]
    pub fn skipped(path: PathBuf) -> Self {
        Self {
            path,
            modified: false,
            skipped: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(path: PathBuf, err: &TagsmithError) -> Self {
        Self {
            path,
            modified: false,
            skipped: false,
            error: Some(err.into()),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Outcome of one batch run: a per-file record plus aggregate counts
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Files discovered for the batch
    pub total: usize,
    /// Outcomes of the files processed, in processing order
    pub outcomes: Vec<FileOutcome>,
    /// The caller cancelled before every file was processed
    pub cancelled: bool,
}

impl BatchResult {
    #[must_use]
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn modified(&self) -> usize {
        self.outcomes.iter().filter(|o| o.modified).count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped).count()
    }

    /// Files processed without error
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_error()).count()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_error()).count()
    }

    /// Failed files with their error
    pub fn errors(&self) -> impl Iterator<Item = (&PathBuf, &FileFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error.as_ref().map(|e| (&o.path, e)))
    }

    /// Turn a cancelled run into `TagsmithError::Cancelled`
    ///
    /// # Errors
    /// Returns `TagsmithError::Cancelled` with the processed/total counts when the run
    /// was cancelled.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.cancelled {
            return Err(TagsmithError::Cancelled {
                processed: self.processed(),
                total: self.total,
            });
        }
        Ok(())
    }

    pub fn print(&self, operation: &str) {
        println!("\n{}", format!("=== {operation} Summary ===").bold());
        println!("  {} {}", "✓ Modified:".green(), self.modified());
        let unchanged = self.succeeded() - self.modified() - self.skipped();
        if unchanged > 0 {
            println!("  {} {}", "· Unchanged:".normal(), unchanged);
        }
        if self.skipped() > 0 {
            println!("  {} {}", "⊘ Skipped:".yellow(), self.skipped());
        }
        if self.cancelled {
            println!(
                "  {} {} of {}",
                "⊘ Cancelled after:".yellow(),
                self.processed(),
                self.total
            );
        }
        let errors = self.error_count();
        if errors > 0 {
            println!("  {} {}", "✗ Errors:".red(), errors);
            println!("\n{}", "Error details:".red().bold());
            for (path, failure) in self.errors() {
                println!("  - {}: {}", path.display(), failure.message);
            }
        }
    }
}
