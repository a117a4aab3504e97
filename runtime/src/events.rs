//! One-shot event delivery.
//!
//! Events are transient notifications (errors, confirmations, prompts) that
//! must reach the observer at most once and must not be replayed to a late
//! subscriber. [`channel`] returns the sending half, which can be cloned into
//! any number of effects, and the single receiving half.

use tokio::sync::mpsc;

/// Create a connected emitter / stream pair
#[must_use]
pub fn channel<E>() -> (EventEmitter<E>, EventStream<E>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (EventEmitter { sender }, EventStream { receiver })
}

/// Sending half of an event channel
pub struct EventEmitter<E> {
    sender: mpsc::UnboundedSender<E>,
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E> std::fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl<E> EventEmitter<E> {
    /// Deliver an event to the observer
    ///
    /// Returns false when the stream has been dropped. The event is discarded
    /// in that case.
    pub fn emit(&self, event: E) -> bool {
        if self.sender.send(event).is_ok() {
            metrics::counter!("events.emitted").increment(1);
            true
        } else {
            tracing::debug!("Event dropped: no observer");
            metrics::counter!("events.dropped").increment(1);
            false
        }
    }
}

/// Receiving half of an event channel
#[derive(Debug)]
pub struct EventStream<E> {
    receiver: mpsc::UnboundedReceiver<E>,
}

impl<E> EventStream<E> {
    /// Wait for the next event
    ///
    /// Returns `None` once every emitter has been dropped and the buffer is empty.
    pub async fn next(&mut self) -> Option<E> {
        self.receiver.recv().await
    }

    /// Take the next buffered event without waiting
    pub fn try_next(&mut self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Take every buffered event without waiting
    pub fn drain(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
