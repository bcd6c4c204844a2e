//! Per-request pipeline state machine.

/// Stage of a single order pipeline.
///
/// State transitions:
/// ```text
/// Received ──► Validating ──┬──► ValidationFailed ─────────────────────┐
///                           └──► Persisting ──┬──► PersistFailed ──────┤
///                                             └──► PersistSucceeded    │
///                                                   └──► Notifying ────┴──► Responded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineStage {
    /// The request has been handed to the mediator.
    #[default]
    Received,

    /// The order record is being built from the request.
    Validating,

    /// The request was rejected before persistence.
    ValidationFailed,

    /// The record has been submitted to the store.
    Persisting,

    /// The store failed or timed out.
    PersistFailed,

    /// The store accepted the record.
    PersistSucceeded,

    /// The customer notification has been dispatched.
    Notifying,

    /// The caller's response has been completed (terminal state).
    Responded,
}

impl PipelineStage {
    /// Returns true if `next` is a legal successor of this stage.
    pub fn can_advance_to(&self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, ValidationFailed)
                | (Validating, Persisting)
                | (Persisting, PersistFailed)
                | (Persisting, PersistSucceeded)
                | (PersistSucceeded, Notifying)
                | (ValidationFailed, Responded)
                | (PersistFailed, Responded)
                | (Notifying, Responded)
        )
    }

    /// Returns true if this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Responded)
    }

    /// Returns the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "Received",
            PipelineStage::Validating => "Validating",
            PipelineStage::ValidationFailed => "ValidationFailed",
            PipelineStage::Persisting => "Persisting",
            PipelineStage::PersistFailed => "PersistFailed",
            PipelineStage::PersistSucceeded => "PersistSucceeded",
            PipelineStage::Notifying => "Notifying",
            PipelineStage::Responded => "Responded",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
