//! Telegram notification client.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use cadence_core::error::NotifyError;
use cadence_core::traits::Notifier;
use cadence_core::types::TradeNote;

const MAX_NEWS_LINKS: usize = 3;

/// Telegram-backed notifier.
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Create a notifier with an explicit token and chat id.
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            client: Client::new(),
            token,
            chat_id,
        }
    }

    /// Create from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    ///
    /// Returns `None` when either variable is missing or empty; the bot
    /// treats an unconfigured notifier as "don't notify", not an error.
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;
        if token.trim().is_empty() || chat_id.trim().is_empty() {
            return None;
        }
        Some(Self::new(token.trim().to_string(), chat_id.trim().to_string()))
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            disable_web_page_preview: true,
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api(format!("{status}: {text}")));
        }

        debug!(chars = text.len(), "telegram message sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_startup(&self, text: &str) -> Result<(), NotifyError> {
        self.send_message(text).await
    }

    async fn send_trade(&self, note: &TradeNote) -> Result<(), NotifyError> {
        self.send_message(&format_trade(note)).await
    }

    async fn send_error(&self, context: &str, error: &str) -> Result<(), NotifyError> {
        self.send_message(&format!("❌ Bot error: {context}: {error}"))
            .await
    }
}

/// Notifier that drops everything, for runs without Telegram configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_startup(&self, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn send_trade(&self, _note: &TradeNote) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn send_error(&self, _context: &str, _error: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

fn format_trade(note: &TradeNote) -> String {
    let mode = if note.paper { "paper" } else { "LIVE" };
    let mut msg = format!(
        "🔄 {mode} {} {} qty={} order_id={}",
        note.side, note.symbol, note.qty, note.order_id
    );

    if let Some(pnl) = note.pnl_dollars {
        let sign = if pnl >= Decimal::ZERO { "+" } else { "" };
        msg.push_str(&format!("\n  P&L: {sign}${pnl:.2}"));
    }
    if let Some(reason) = &note.reason {
        msg.push_str(&format!("\n  Advisor: {reason}"));
    }
    if !note.news.is_empty() {
        msg.push_str("\n  News:");
        for item in note.news.iter().take(MAX_NEWS_LINKS) {
            msg.push_str(&format!("\n  - {}", item.url));
        }
    }
    if let Some(usage) = note.usage {
        msg.push_str(&format!(
            "\n  Advisor usage: {} tokens (~${:.4})",
            usage.total_tokens, usage.estimated_usd
        ));
    }
    if let Some(account) = &note.account {
        msg.push_str(&format!("\n\n{account}"));
    }

    msg
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}
