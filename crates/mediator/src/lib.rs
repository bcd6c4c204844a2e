//! Order-processing mediator.
//!
//! Each creation request runs as its own pipeline task:
//! 1. Validate the request and build the order record
//! 2. Persist the record (bounded by a timeout)
//! 3. Dispatch a best-effort customer notification
//! 4. Complete the caller's response exactly once
//!
//! Persistence failures end the pipeline before any notification is sent.
//! Notification failures are logged and metered but never reach the caller.

pub mod clock;
pub mod config;
pub mod counter;
pub mod error;
pub mod mediator;
pub mod services;
pub mod sink;
pub mod stage;

pub use clock::MonotonicClock;
pub use config::MediatorConfig;
pub use counter::ProcessedCounter;
pub use error::{MediatorError, SinkError};
pub use mediator::{OrderMediator, notification_message};
pub use services::{
    InMemoryNotificationGateway, LogSmsGateway, NotificationError, NotificationGateway,
    SentNotification,
};
pub use sink::{Outcome, PendingResponse, ResponseSink};
pub use stage::PipelineStage;
