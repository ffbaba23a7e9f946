//! Order sizing and execution dispatch.

use rust_decimal::Decimal;
use tracing::debug;

use cadence_core::error::BrokerError;
use cadence_core::traits::Broker;
use cadence_core::types::{OrderIntent, OrderReceipt, Side};

/// Desired exposure per buy order.
#[derive(Debug, Clone, Copy)]
pub enum PositionSize {
    /// Fixed share count
    Shares(Decimal),
    /// Target dollar amount, floored to whole shares
    Notional(Decimal),
}

impl PositionSize {
    /// Resolve from the configured options; dollar sizing takes
    /// precedence when both are set.
    pub fn from_options(shares: Option<Decimal>, notional: Option<Decimal>) -> Option<Self> {
        match (notional, shares) {
            (Some(amount), _) => Some(PositionSize::Notional(amount)),
            (None, Some(count)) => Some(PositionSize::Shares(count)),
            (None, None) => None,
        }
    }
}

/// Converts a desired exposure into a whole-share quantity and submits
/// at most one order per symbol per cycle.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    size: PositionSize,
}

impl Dispatcher {
    /// Create a dispatcher for the configured position size.
    pub fn new(size: PositionSize) -> Self {
        Self { size }
    }

    /// Buy quantity at the given close, with the advisory multiplier
    /// applied before flooring.
    pub fn buy_quantity(&self, last_close: f64, multiplier: Decimal) -> Decimal {
        let close = match Decimal::from_f64_retain(last_close) {
            Some(c) if c > Decimal::ZERO => c,
            _ => return Decimal::ZERO,
        };
        let raw = match self.size {
            PositionSize::Shares(count) => count * multiplier,
            PositionSize::Notional(amount) => amount / close * multiplier,
        };
        raw.floor().max(Decimal::ZERO)
    }

    /// Sell quantity: close out the held position, scaled by the
    /// advisory multiplier and floored to whole shares. A fractional
    /// position exits with a single whole share at full size.
    pub fn sell_quantity(&self, held: Decimal, multiplier: Decimal) -> Decimal {
        let scaled = held * multiplier;
        let floored = scaled.floor();
        if floored <= Decimal::ZERO && scaled > Decimal::ZERO && multiplier >= Decimal::ONE {
            return Decimal::ONE;
        }
        floored.max(Decimal::ZERO)
    }

    /// Submit a market order, unless the quantity floored to zero; a
    /// zero quantity is a no-op for the symbol, not an error.
    ///
    /// Single attempt; a failure surfaces to the caller without retry.
    pub async fn submit(
        &self,
        broker: &dyn Broker,
        symbol: &str,
        side: Side,
        qty: Decimal,
    ) -> Result<Option<OrderReceipt>, BrokerError> {
        if qty <= Decimal::ZERO {
            debug!(symbol, %side, "quantity floored to zero, no order");
            return Ok(None);
        }
        let intent = OrderIntent::market(symbol, side, qty);
        broker.submit_market_order(&intent).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_notional_takes_precedence() {
        let size = PositionSize::from_options(Some(dec!(5)), Some(dec!(1000))).unwrap();
        assert!(matches!(size, PositionSize::Notional(n) if n == dec!(1000)));

        let size = PositionSize::from_options(Some(dec!(5)), None).unwrap();
        assert!(matches!(size, PositionSize::Shares(s) if s == dec!(5)));

        assert!(PositionSize::from_options(None, None).is_none());
    }

    #[test]
    fn test_notional_quantity_floors() {
        let dispatcher = Dispatcher::new(PositionSize::Notional(dec!(250)));
        // 250 / 100 = 2.5 -> 2 shares, not 2.5
        assert_eq!(dispatcher.buy_quantity(100.0, Decimal::ONE), dec!(2));
    }

    #[test]
    fn test_multiplier_applied_before_floor() {
        let dispatcher = Dispatcher::new(PositionSize::Notional(dec!(1000)));
        assert_eq!(dispatcher.buy_quantity(50.0, Decimal::ONE), dec!(20));
        assert_eq!(dispatcher.buy_quantity(50.0, dec!(0.5)), dec!(10));

        let fixed = Dispatcher::new(PositionSize::Shares(dec!(5)));
        // 5 * 0.5 = 2.5 -> 2
        assert_eq!(fixed.buy_quantity(50.0, dec!(0.5)), dec!(2));
    }

    #[test]
    fn test_degenerate_close_is_zero() {
        let dispatcher = Dispatcher::new(PositionSize::Notional(dec!(1000)));
        assert_eq!(dispatcher.buy_quantity(0.0, Decimal::ONE), Decimal::ZERO);
        assert_eq!(dispatcher.buy_quantity(-5.0, Decimal::ONE), Decimal::ZERO);
    }

    #[test]
    fn test_zero_multiplier_is_zero() {
        let dispatcher = Dispatcher::new(PositionSize::Notional(dec!(1000)));
        assert_eq!(dispatcher.buy_quantity(50.0, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_sell_quantity() {
        let dispatcher = Dispatcher::new(PositionSize::Shares(dec!(1)));
        assert_eq!(dispatcher.sell_quantity(dec!(7), Decimal::ONE), dec!(7));
        assert_eq!(dispatcher.sell_quantity(dec!(7), dec!(0.5)), dec!(3));
        // Halving a single share floors to zero: no order
        assert_eq!(dispatcher.sell_quantity(dec!(1), dec!(0.5)), Decimal::ZERO);
        // A fractional position still exits with one whole share
        assert_eq!(dispatcher.sell_quantity(dec!(0.6), Decimal::ONE), Decimal::ONE);
        assert_eq!(dispatcher.sell_quantity(Decimal::ZERO, Decimal::ONE), Decimal::ZERO);
    }
}
