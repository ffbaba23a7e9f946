//! Order types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{JudgeUsage, NewsItem};

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Wire representation used by the brokerage API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Time in force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Valid for the trading day only
    #[default]
    Day,
    /// Good til canceled
    #[serde(rename = "gtc")]
    Gtc,
}

/// Order submission status, as reported by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Accepted,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
}

impl OrderStatus {
    /// Map a broker wire status onto the narrow set the bot cares about.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "filled" => OrderStatus::Filled,
            "partially_filled" => OrderStatus::PartiallyFilled,
            "canceled" | "expired" => OrderStatus::Canceled,
            "rejected" => OrderStatus::Rejected,
            _ => OrderStatus::Accepted,
        }
    }
}

/// A market order to submit, consumed immediately by the broker.
///
/// One attempt per cycle; the intent is not retried automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Symbol to trade
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Whole-share quantity
    pub qty: Decimal,
    /// Time in force
    pub time_in_force: TimeInForce,
}

impl OrderIntent {
    /// Create a day market order intent.
    pub fn market(symbol: impl Into<String>, side: Side, qty: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            qty,
            time_in_force: TimeInForce::Day,
        }
    }
}

/// Receipt returned by the broker for a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Broker order id
    pub id: Uuid,
    /// Submission status
    pub status: OrderStatus,
}

/// Payload for a trade notification.
#[derive(Debug, Clone)]
pub struct TradeNote {
    pub symbol: String,
    pub side: Side,
    pub qty: Decimal,
    pub order_id: Uuid,
    pub paper: bool,
    /// Advisory reason, when the advisory step ran
    pub reason: Option<String>,
    /// News references backing the advisory judgment
    pub news: Vec<NewsItem>,
    /// Judgment usage metrics, when the advisory step ran
    pub usage: Option<JudgeUsage>,
    /// Estimated realized P&L for a sell, when the broker reports it
    pub pnl_dollars: Option<Decimal>,
    /// Account summary block appended to the message
    pub account: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_intent() {
        let intent = OrderIntent::market("SPY", Side::Buy, dec!(20));
        assert_eq!(intent.symbol, "SPY");
        assert_eq!(intent.side, Side::Buy);
        assert_eq!(intent.qty, dec!(20));
        assert_eq!(intent.time_in_force, TimeInForce::Day);
    }

    #[test]
    fn test_status_from_wire() {
        assert_eq!(OrderStatus::from_wire("filled"), OrderStatus::Filled);
        assert_eq!(OrderStatus::from_wire("expired"), OrderStatus::Canceled);
        assert_eq!(OrderStatus::from_wire("pending_new"), OrderStatus::Accepted);
    }

    #[test]
    fn test_side_wire_str() {
        assert_eq!(Side::Buy.as_str(), "buy");
        assert_eq!(Side::Sell.to_string(), "SELL");
    }
}
