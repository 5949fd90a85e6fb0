//! Clubdeck domain core.
//!
//! Pure decision logic for the club directory: role comparison, membership
//! mutation guards, the club approval state machine, historical-snapshot
//! fallback resolution, notification policy, and field normalization.
//!
//! This crate has no storage, HTTP, or async dependencies. Every function
//! takes the state it needs as arguments and returns a value or a
//! [`error::CoreError`]; the db and api crates supply persistence and
//! transport around it.

pub mod approval;
pub mod error;
pub mod membership;
pub mod notify;
pub mod roles;
pub mod snapshot;
pub mod types;
pub mod validation;
