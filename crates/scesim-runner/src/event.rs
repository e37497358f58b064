//! Result delivery
//!
//! Results leave the service through an [`EventSource`]. Hosts with an
//! async side use [`ChannelEventSource`]; synchronous hosts and tests can
//! collect everything with [`RecordingEventSource`].

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Sink for fired events
pub trait EventSource<T>: Send + Sync {
    /// Deliver one event
    fn fire(&self, event: T);
}

/// Forwards events into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelEventSource<T> {
    sender: mpsc::UnboundedSender<T>,
}

impl<T> ChannelEventSource<T> {
    /// Create source and the receiving end of its channel
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Wrap an existing sender
    #[inline]
    #[must_use]
    pub fn from_sender(sender: mpsc::UnboundedSender<T>) -> Self {
        Self { sender }
    }
}

impl<T: Send> EventSource<T> for ChannelEventSource<T> {
    fn fire(&self, event: T) {
        if self.sender.send(event).is_err() {
            tracing::warn!("event receiver dropped, result discarded");
        }
    }
}

/// Keeps every fired event in memory
#[derive(Debug)]
pub struct RecordingEventSource<T> {
    events: Mutex<Vec<T>>,
}

impl<T> RecordingEventSource<T> {
    /// Create empty recorder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Number of events fired so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing was fired
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Remove and return all recorded events
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl<T: Clone> RecordingEventSource<T> {
    /// Copy of all recorded events
    #[must_use]
    pub fn events(&self) -> Vec<T> {
        self.events.lock().clone()
    }

    /// Most recent event
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.events.lock().last().cloned()
    }
}

impl<T> Default for RecordingEventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> EventSource<T> for RecordingEventSource<T> {
    fn fire(&self, event: T) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_keeps_order() {
        let source = RecordingEventSource::new();
        source.fire(1);
        source.fire(2);

        assert_eq!(source.len(), 2);
        assert_eq!(source.last(), Some(2));
        assert_eq!(source.take(), vec![1, 2]);
        assert!(source.is_empty());
    }

    #[tokio::test]
    async fn channel_delivers() {
        let (source, mut receiver) = ChannelEventSource::channel();
        source.fire("done");
        assert_eq!(receiver.recv().await, Some("done"));
    }

    #[test]
    fn channel_without_receiver_does_not_panic() {
        let (source, receiver) = ChannelEventSource::channel();
        drop(receiver);
        source.fire(1u8);
    }
}
