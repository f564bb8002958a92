//! Single-fire response sink.
//!
//! The request handler awaits the receiving half while validation errors or
//! the invocation task complete the sink. Only the first completion is
//! delivered; later ones (a remote answer arriving after the timeout fired,
//! for instance) are rejected.

use axum::response::Response;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Cloneable handle that delivers at most one response
#[derive(Clone)]
pub struct ResponseSink {
    sender: Arc<Mutex<Option<oneshot::Sender<Response>>>>,
}

impl ResponseSink {
    /// Create a sink and the receiver the handler waits on
    pub fn channel() -> (Self, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            sender: Arc::new(Mutex::new(Some(tx))),
        };
        (sink, rx)
    }

    /// Deliver `response`. Returns `false` if the sink already fired or the
    /// receiver is gone.
    pub fn complete(&self, response: Response) -> bool {
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match sender {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }

    /// Whether a response was already taken from this sink
    pub fn is_completed(&self) -> bool {
        match self.sender.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}
