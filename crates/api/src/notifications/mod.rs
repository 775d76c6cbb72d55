//! Notification dispatch infrastructure.
//!
//! The [`NotificationDispatcher`] subscribes to the event bus and delivers
//! booking notifications through the configured channels, settling every
//! attempt into `logs_notificacao`.

pub mod dispatcher;

pub use dispatcher::NotificationDispatcher;
