//! Batch processing over a dataset folder
//!
//! - `core`: per-file outcomes and the aggregate `BatchResult`
//! - `progress`: progress sinks and the cancellation token
//! - `processor`: the `BatchProcessor` and the operations it runs
//! - `worker`: running a batch on a background thread

mod core;
mod processor;
mod progress;
mod worker;

pub use core::{BatchResult, FileFailure, FileOutcome};
pub use processor::{BatchProcessor, ExecutionMode, Operation};
pub use progress::{CancelToken, ChannelProgress, NoProgress, ProgressEvent, ProgressSink};
pub use worker::{BatchHandle, spawn};
