//! External delivery channels for club notifications.
//!
//! Currently a single channel: templated plain-text email over SMTP.

pub mod email;
