//! Clubdeck event bus and notification delivery.
//!
//! Building blocks for everything that happens *after* a club save
//! commits:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] — the canonical domain event envelope
//!   (`club.submitted`, `club.approved`, `club.rejected`, ...).
//! - [`delivery`] — templated email delivery over SMTP.
//!
//! Delivery is strictly fire-and-forget from the saving request's point of
//! view: a failed or slow email never unwinds a committed transition.

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
