//! Account and position snapshots.
//!
//! The brokerage is the source of truth for positions; the bot only reads
//! these to decide order eligibility and to enrich notifications.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An open position for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Symbol
    pub symbol: String,
    /// Held quantity (positive for long)
    pub qty: Decimal,
    /// Unrealized profit/loss in dollars
    pub unrealized_pnl: Decimal,
}

/// Point-in-time account state used for notification text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account equity
    pub equity: Decimal,
    /// Available cash
    pub cash: Decimal,
    /// Equity at the previous session close, when reported
    pub last_equity: Option<Decimal>,
    /// Open positions
    pub positions: Vec<PositionSnapshot>,
}

impl AccountSnapshot {
    /// Equity change since the previous session close.
    pub fn day_change(&self) -> Option<Decimal> {
        self.last_equity.map(|last| self.equity - last)
    }

    /// Short status block: equity, cash, daily change, open positions.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Equity: ${:.2}", self.equity),
            format!("Cash:   ${:.2}", self.cash),
        ];
        match self.day_change() {
            Some(change) if change >= Decimal::ZERO => {
                lines.push(format!("Today:  $+{:.2}", change));
            }
            Some(change) => lines.push(format!("Today:  ${:.2}", change)),
            None => lines.push("Today:  n/a".to_string()),
        }
        if !self.positions.is_empty() {
            lines.push(String::new());
            for pos in &self.positions {
                let sign = if pos.unrealized_pnl >= Decimal::ZERO {
                    "+"
                } else {
                    ""
                };
                lines.push(format!(
                    "  {}: {:.0} sh  P&L ${}{:.2}",
                    pos.symbol, pos.qty, sign, pos.unrealized_pnl
                ));
            }
        }
        lines.join("\n")
    }
}
