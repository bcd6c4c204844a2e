//! Notification gateway trait and implementations.

pub mod notification;

pub use notification::{
    InMemoryNotificationGateway, LogSmsGateway, NotificationError, NotificationGateway,
    SentNotification,
};
