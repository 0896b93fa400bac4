//! Host-side hooks: a progress channel and a cooperative cancellation token.
//!
//! The pipeline never blocks on either. Progress events are pushed into an
//! unbounded channel and dropped silently once the receiver is gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    pub current: Option<usize>,
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<Sender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn channel() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn message(
        &self,
        message: impl Into<String>,
    ) {
        self.send(ProgressEvent {
            message: message.into(),
            current: None,
            total: None,
        });
    }

    pub fn step(
        &self,
        message: impl Into<String>,
        current: usize,
        total: usize,
    ) {
        self.send(ProgressEvent {
            message: message.into(),
            current: Some(current),
            total: Some(total),
        });
    }

    fn send(
        &self,
        event: ProgressEvent,
    ) {
        if let Some(tx) = &self.tx {
            // receiver gone: caller stopped listening
            let _ = tx.send(event);
        }
    }
}

/// Cloneable flag polled at well-defined points of a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), crate::error::Cancelled> {
        if self.is_cancelled() {
            Err(crate::error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (sink, rx) = ProgressSink::channel();
        sink.message("first");
        sink.step("second", 1, 2);
        drop(sink);
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "first");
        assert_eq!(events[1].current, Some(1));
        assert_eq!(events[1].total, Some(2));
    }

    #[test]
    fn sending_after_receiver_drop_is_harmless() {
        let (sink, rx) = ProgressSink::channel();
        drop(rx);
        sink.message("nobody listening");
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert!(token.is_cancelled());
        assert!(token.check().is_err());
    }
}
