//! Core types and traits for the cadence trading bot.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, PriceSeries)
//! - Trading signals and order types
//! - Advisory types (news items, judgment requests and results)
//! - Collaborator traits for the broker, news, judgment, and
//!   notification services

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BotError, BotResult};
pub use traits::*;
pub use types::*;
