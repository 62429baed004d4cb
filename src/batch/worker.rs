use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use super::core::BatchResult;
use super::processor::{BatchProcessor, Operation};
use super::progress::{CancelToken, ChannelProgress, ProgressEvent};
use crate::Result;
use crate::dataset::DatasetSource;

/// A batch running on a background thread
#[derive(Debug)]
pub struct BatchHandle {
    events: Receiver<ProgressEvent>,
    cancel: CancelToken,
    join: JoinHandle<Result<BatchResult>>,
}

impl BatchHandle {
    /// Progress notifications; the channel closes when the worker finishes
    #[must_use]
    pub const fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    /// Ask the worker to stop after the current file
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Block until the worker is done and return its result.
    ///
    /// # Errors
    /// Returns whatever the batch run returned.
    ///
    /// # Panics
    /// Re-raises a panic from the worker thread.
    pub fn wait(self) -> Result<BatchResult> {
        match self.join.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Run `operation` over `folder` on a new background thread.
///
/// Progress events are delivered through [`BatchHandle::events`], total first.
pub fn spawn<S>(processor: BatchProcessor<S>, folder: PathBuf, operation: Operation) -> BatchHandle
where
    S: DatasetSource + Send + 'static,
{
    let (sink, events) = ChannelProgress::new();
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let join = thread::spawn(move || processor.run(&folder, &operation, &sink, &token));
    BatchHandle {
        events,
        cancel,
        join,
    }
}
