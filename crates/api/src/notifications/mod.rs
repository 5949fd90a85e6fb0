//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the event bus and turns club
//! workflow events into templated emails for the club's officers.

pub mod router;

pub use router::NotificationRouter;
