//! Broker collaborator trait.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::BrokerError;
use crate::types::{AccountSnapshot, OrderIntent, OrderReceipt, PositionSnapshot, PriceSeries};

/// The brokerage collaborator: bar history, positions, and order
/// submission.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Fetch recent daily bars for a symbol, covering at least
    /// `lookback_days` calendar days back from now.
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, BrokerError>;

    /// Get the open position for a symbol, or `None` when flat.
    async fn position(&self, symbol: &str) -> Result<Option<PositionSnapshot>, BrokerError>;

    /// Held quantity for a symbol; zero when flat.
    async fn position_qty(&self, symbol: &str) -> Result<Decimal, BrokerError> {
        Ok(self
            .position(symbol)
            .await?
            .map(|p| p.qty)
            .unwrap_or(Decimal::ZERO))
    }

    /// Submit a market order. Single attempt; the bot never retries a
    /// submission within a cycle.
    async fn submit_market_order(&self, intent: &OrderIntent) -> Result<OrderReceipt, BrokerError>;

    /// Point-in-time account state, used only for notification text.
    async fn account_snapshot(&self) -> Result<AccountSnapshot, BrokerError>;

    /// Whether this broker trades against the paper environment.
    fn is_paper(&self) -> bool;

    /// Broker name for logs.
    fn name(&self) -> &str;
}
