//! Reviewbot - a homework review status poller
//!
//! Polls the Practicum homework-status API on a fixed period, validates
//! the response shape defensively, translates status changes into verdict
//! messages, and forwards them to a Telegram chat.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod poll;
pub mod status;
pub mod validate;

pub use error::{ReviewbotError, Result};
