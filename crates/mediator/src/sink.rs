//! Exactly-once completion handle for a caller's pending response.

use std::sync::{Arc, Mutex, PoisonError};

use domain::OrderReceipt;
use tokio::sync::oneshot;

use crate::error::{MediatorError, SinkError};

/// Terminal outcome delivered to the caller.
pub type Outcome = Result<OrderReceipt, MediatorError>;

/// Writer side of a caller's pending response.
///
/// Clones share the same slot: whichever clone completes first wins and
/// every later attempt returns [`SinkError::AlreadyCompleted`] without
/// touching the transport. Completion may happen on any task or thread.
#[derive(Debug, Clone)]
pub struct ResponseSink {
    slot: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

/// Reader side of a caller's pending response.
#[derive(Debug)]
pub struct PendingResponse {
    receiver: oneshot::Receiver<Outcome>,
}

impl ResponseSink {
    /// Creates a connected sink and pending response.
    pub fn channel() -> (ResponseSink, PendingResponse) {
        let (tx, rx) = oneshot::channel();
        (
            ResponseSink {
                slot: Arc::new(Mutex::new(Some(tx))),
            },
            PendingResponse { receiver: rx },
        )
    }

    /// Completes the response with the given outcome.
    ///
    /// Only the first call is delivered. A caller that has already gone away
    /// still consumes the completion.
    pub fn complete(&self, outcome: Outcome) -> Result<(), SinkError> {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(sender) = sender else {
            tracing::warn!(
                discarded_ok = outcome.is_ok(),
                "response already completed, discarding second outcome"
            );
            return Err(SinkError::AlreadyCompleted);
        };

        if let Err(undelivered) = sender.send(outcome) {
            tracing::debug!(
                ok = undelivered.is_ok(),
                "caller went away before the response was delivered"
            );
        }
        Ok(())
    }

    /// Completes the response with a success payload.
    pub fn succeed(&self, receipt: OrderReceipt) -> Result<(), SinkError> {
        self.complete(Ok(receipt))
    }

    /// Completes the response with an error.
    pub fn fail(&self, error: MediatorError) -> Result<(), SinkError> {
        self.complete(Err(error))
    }

    /// Returns true once any clone of this sink has been completed.
    pub fn is_completed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl PendingResponse {
    /// Waits for the terminal outcome.
    ///
    /// If every sink is dropped without completing, the caller receives an
    /// internal error instead of hanging.
    pub async fn wait(self) -> Outcome {
        match self.receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(MediatorError::Internal(
                "response abandoned without completion".to_string(),
            )),
        }
    }
}
