use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

/// Receives progress notifications from a running batch.
///
/// `on_total` is always called once before any `on_step`, and `on_step` once per
/// completed file. Calls arrive on the worker thread(s).
pub trait ProgressSink: Send + Sync {
    fn on_total(&self, total: usize);
    fn on_step(&self);
}

/// Sink that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_total(&self, _total: usize) {}
    fn on_step(&self) {}
}

/// Progress notification sent through a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Total(usize),
    Step,
}

/// Sink forwarding notifications to an `mpsc` channel
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: Sender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create the sink together with its receiving end
    #[must_use]
    pub fn new() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn on_total(&self, total: usize) {
        // A dropped receiver only means nobody is watching
        let _ = self.tx.send(ProgressEvent::Total(total));
    }

    fn on_step(&self) {
        let _ = self.tx.send(ProgressEvent::Step);
    }
}

/// Cooperative cancellation flag shared between the caller and a worker.
///
/// Checked between files, never in the middle of one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_progress_order() {
        let (sink, rx) = ChannelProgress::new();
        sink.on_total(2);
        sink.on_step();
        sink.on_step();
        drop(sink);
        let events: Vec<ProgressEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                ProgressEvent::Total(2),
                ProgressEvent::Step,
                ProgressEvent::Step
            ]
        );
    }

    #[test]
    fn test_channel_progress_survives_dropped_receiver() {
        let (sink, rx) = ChannelProgress::new();
        drop(rx);
        sink.on_total(1);
        sink.on_step();
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
