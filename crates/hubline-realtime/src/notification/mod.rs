//! Best-effort notification delivery.

pub mod dispatcher;

pub use dispatcher::NotificationDispatcher;
