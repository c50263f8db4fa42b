// Copyright 2025 Cowboy AI, LLC.

//! Message sinks
//!
//! Commands report progress through a [`Dispatcher`]; it is the only path
//! by which a collection store learns about remote calls.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// A sink accepting messages synchronously
pub trait Dispatcher<M>: Send + Sync {
    /// Deliver one message
    fn dispatch(&self, message: M);
}

impl<M: Send> Dispatcher<M> for UnboundedSender<M> {
    fn dispatch(&self, message: M) {
        if self.send(message).is_err() {
            warn!("message dropped: receiver closed");
        }
    }
}

impl<M, D: Dispatcher<M> + ?Sized> Dispatcher<M> for Arc<D> {
    fn dispatch(&self, message: M) {
        (**self).dispatch(message)
    }
}

/// Dispatcher that records every message, for tests and diagnostics
#[derive(Debug)]
pub struct MessageLog<M> {
    messages: Arc<Mutex<Vec<M>>>,
}

impl<M> Clone for MessageLog<M> {
    fn clone(&self) -> Self {
        Self {
            messages: Arc::clone(&self.messages),
        }
    }
}

impl<M> Default for MessageLog<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> MessageLog<M> {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of messages recorded
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M: Clone> MessageLog<M> {
    /// Recorded messages, in dispatch order
    pub fn messages(&self) -> Vec<M> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<M: Send> Dispatcher<M> for MessageLog<M> {
    fn dispatch(&self, message: M) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_log_keeps_order() {
        let log = MessageLog::new();
        log.dispatch(1);
        log.dispatch(2);
        let shared = Arc::new(log.clone());
        shared.dispatch(3);
        assert_eq!(log.messages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn channel_sender_forwards() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.dispatch("hello");
        assert_eq!(rx.recv().await, Some("hello"));
        drop(rx);
        tx.dispatch("dropped");
    }
}
