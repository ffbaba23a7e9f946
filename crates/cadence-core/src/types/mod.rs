//! Core data types for the bot.

mod account;
mod advisory;
mod bar;
mod order;
mod signal;

pub use account::{AccountSnapshot, PositionSnapshot};
pub use advisory::{
    AdvisoryAction, AdvisoryResult, JudgeReply, JudgeRequest, JudgeUsage, NewsItem, NewsMode,
};
pub use bar::{Bar, PriceSeries};
pub use order::{OrderIntent, OrderReceipt, OrderStatus, Side, TimeInForce, TradeNote};
pub use signal::Signal;
