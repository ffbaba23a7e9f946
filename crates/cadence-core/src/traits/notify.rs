//! Notification collaborator trait.

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::types::TradeNote;

/// Fire-and-forget chat notifications.
///
/// Failures must never abort or roll back trading control flow; callers
/// log errors and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Startup or lifecycle message.
    async fn send_startup(&self, text: &str) -> Result<(), NotifyError>;

    /// Trade confirmation with optional advisory context.
    async fn send_trade(&self, note: &TradeNote) -> Result<(), NotifyError>;

    /// Error report for one symbol or the whole cycle.
    async fn send_error(&self, context: &str, error: &str) -> Result<(), NotifyError>;
}
