//! Tagsmith - batch tag editing for image/caption training datasets
//!
//! A dataset is a folder of images, each paired with a plain-text tag file of the
//! same base name (`.txt` or `.caption`) holding a `", "`-separated tag list. This
//! library rewrites those tag files in bulk: rule-based edits, redundancy removal,
//! randomization, consolidation, frequency ranking, numeric renumbering of the
//! image/tag pairs and random prompt generation from the dataset's tags.

use std::path::PathBuf;
use thiserror::Error;

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod frequency;
pub mod output;
pub mod prompts;
pub mod rules;
pub mod status;
pub mod tags;

#[cfg(test)]
pub mod testing;

pub use tags::TagSet;

/// Broad classification of a [`TagsmithError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or a violated precondition; nothing was mutated
    Validation,
    /// Folder or files missing
    NotFound,
    /// Read/write failure on a specific file
    Io,
    /// Operation stopped on caller request
    Cancelled,
    /// Settings, rule files or report serialization
    Config,
}

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum TagsmithError {
    /// Invalid rule input or batch precondition
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A rename target already exists and is not part of the batch
    #[error("Naming collision: {} already exists", .0.display())]
    NameCollision(PathBuf),

    /// The dataset folder does not exist
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// The dataset folder exists but contains no files at all
    #[error("Folder is empty: {}", .0.display())]
    EmptyFolder(PathBuf),

    /// The folder has files, but none of them are dataset images
    #[error("No image files found in {}", .0.display())]
    NoFilesFound(PathBuf),

    /// I/O failure tied to a path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The caller cancelled the operation
    #[error("Cancelled after {processed} of {total} file(s)")]
    Cancelled { processed: usize, total: usize },

    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TagsmithError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify the error for reporting
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::NameCollision(_) => ErrorKind::Validation,
            Self::FolderNotFound(_) | Self::EmptyFolder(_) | Self::NoFilesFound(_) => {
                ErrorKind::NotFound
            }
            Self::Io { .. } => ErrorKind::Io,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Config(_) | Self::Json(_) | Self::Csv(_) | Self::Toml(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, TagsmithError>;
