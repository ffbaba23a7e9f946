//! Chat notifications.
//!
//! Fire-and-forget: the scheduler logs notification failures and keeps
//! trading. A missing Telegram configuration downgrades to the no-op
//! notifier rather than an error.

mod telegram;

pub use telegram::{NoopNotifier, TelegramNotifier};
