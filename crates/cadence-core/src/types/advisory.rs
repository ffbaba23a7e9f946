//! Advisory types: news items, judgment requests, and the resolved action.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Signal;

/// One retrieved news reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Which news queries the advisory step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsMode {
    /// One query per signaled symbol
    PerSymbol,
    /// One general-market query per cycle, shared across symbols
    General,
    /// The general query plus a per-symbol query
    Hybrid,
}

/// Input to the judgment collaborator.
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub symbol: String,
    pub signal: Signal,
    pub last_close: f64,
    pub position_qty: Decimal,
    pub news: Vec<NewsItem>,
}

/// Raw reply from the judgment collaborator.
///
/// The text is untrusted model output; it must pass the strict parser
/// before it can influence a trade.
#[derive(Debug, Clone)]
pub struct JudgeReply {
    pub text: String,
    pub usage: Option<JudgeUsage>,
}

/// Token usage and estimated cost of one judgment call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct JudgeUsage {
    pub prompt_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub estimated_usd: f64,
}

/// Resolved advisory action for one symbol in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryAction {
    /// Proceed at full configured size
    Confirm,
    /// Proceed at half size
    Reduce,
    /// No order this cycle
    Skip,
    /// The technical signal is vetoed
    Override,
}

impl AdvisoryAction {
    /// Position size multiplier applied before flooring the quantity.
    pub fn size_multiplier(&self) -> Decimal {
        match self {
            AdvisoryAction::Confirm => Decimal::ONE,
            AdvisoryAction::Reduce => dec!(0.5),
            AdvisoryAction::Skip | AdvisoryAction::Override => Decimal::ZERO,
        }
    }

    /// Whether an order may still be placed.
    pub fn permits_order(&self) -> bool {
        matches!(self, AdvisoryAction::Confirm | AdvisoryAction::Reduce)
    }
}

impl std::fmt::Display for AdvisoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvisoryAction::Confirm => write!(f, "confirm"),
            AdvisoryAction::Reduce => write!(f, "reduce"),
            AdvisoryAction::Skip => write!(f, "skip"),
            AdvisoryAction::Override => write!(f, "override"),
        }
    }
}

/// Outcome of the advisory state machine. Produced fresh each cycle,
/// never persisted.
#[derive(Debug, Clone)]
pub struct AdvisoryResult {
    pub action: AdvisoryAction,
    pub reason: String,
    pub news: Vec<NewsItem>,
    pub usage: Option<JudgeUsage>,
}

impl AdvisoryResult {
    /// The fail-closed outcome: no order, with the cause as the reason.
    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            action: AdvisoryAction::Skip,
            reason: reason.into(),
            news: Vec::new(),
            usage: None,
        }
    }
}
