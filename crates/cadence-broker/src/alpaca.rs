//! Alpaca brokerage client for paper and live trading.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{header, Client};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use cadence_core::error::BrokerError;
use cadence_core::traits::Broker;
use cadence_core::types::{
    AccountSnapshot, Bar, OrderIntent, OrderReceipt, OrderStatus, PositionSnapshot, PriceSeries,
};

/// Alpaca API configuration.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub paper: bool,
}

impl AlpacaConfig {
    /// Create config directly with key and secret.
    pub fn new(api_key: String, api_secret: String, paper: bool) -> Self {
        Self {
            api_key,
            api_secret,
            paper,
        }
    }

    /// Load from environment variables.
    pub fn from_env() -> Result<Self, BrokerError> {
        let api_key = std::env::var("APCA_API_KEY_ID")
            .map_err(|_| BrokerError::Configuration("APCA_API_KEY_ID not set".into()))?;
        let api_secret = std::env::var("APCA_API_SECRET_KEY")
            .map_err(|_| BrokerError::Configuration("APCA_API_SECRET_KEY not set".into()))?;
        let paper = std::env::var("APCA_PAPER")
            .map(|v| parse_paper_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            api_key,
            api_secret,
            paper,
        })
    }

    pub fn base_url(&self) -> &str {
        if self.paper {
            "https://paper-api.alpaca.markets"
        } else {
            "https://api.alpaca.markets"
        }
    }

    pub fn data_url(&self) -> &str {
        "https://data.alpaca.markets"
    }
}

fn parse_paper_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Alpaca brokerage client.
pub struct AlpacaBroker {
    config: AlpacaConfig,
    client: Client,
}

impl AlpacaBroker {
    /// Create a new client with authentication headers installed.
    pub fn new(config: AlpacaConfig) -> Result<Self, BrokerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(&config.api_key)
                .map_err(|e| BrokerError::Configuration(e.to_string()))?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(&config.api_secret)
                .map_err(|e| BrokerError::Configuration(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, BrokerError> {
        Self::new(AlpacaConfig::from_env()?)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, BrokerError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(BrokerError::ApiError(format!("{status}: {text}")))
    }
}

#[async_trait]
impl Broker for AlpacaBroker {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, BrokerError> {
        let url = format!("{}/v2/stocks/{}/bars", self.config.data_url(), symbol);
        let end = Utc::now();
        let start = end - Duration::days(i64::from(lookback_days));

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("timeframe", "1Day"),
                ("start", &start.to_rfc3339()),
                ("end", &end.to_rfc3339()),
                // IEX is the free-tier feed; SIP needs a paid subscription
                ("feed", "iex"),
            ])
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        let resp = Self::check(resp).await?;

        let data: BarsResponse = resp
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        let mut bars = Vec::with_capacity(data.bars.len());
        for bar in &data.bars {
            let ts: DateTime<Utc> = bar
                .t
                .parse()
                .map_err(|e| BrokerError::ParseError(format!("bar timestamp {:?}: {e}", bar.t)))?;
            bars.push(Bar::new(ts.date_naive(), bar.c));
        }

        debug!(symbol, count = bars.len(), "fetched daily bars");
        Ok(PriceSeries::from_bars(symbol, bars))
    }

    async fn position(&self, symbol: &str) -> Result<Option<PositionSnapshot>, BrokerError> {
        let url = format!("{}/v2/positions/{}", self.config.base_url(), symbol);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp).await?;

        let p: AlpacaPosition = resp
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;
        Ok(Some(PositionSnapshot {
            symbol: p.symbol,
            qty: parse_decimal(&p.qty, "qty")?,
            unrealized_pnl: parse_decimal(&p.unrealized_pl, "unrealized_pl")?,
        }))
    }

    async fn submit_market_order(&self, intent: &OrderIntent) -> Result<OrderReceipt, BrokerError> {
        let url = format!("{}/v2/orders", self.config.base_url());
        let create_req = CreateOrderRequest {
            symbol: intent.symbol.clone(),
            qty: intent.qty.to_string(),
            side: intent.side.as_str().to_string(),
            order_type: "market".to_string(),
            time_in_force: "day".to_string(),
        };

        debug!("Submitting order: {:?}", create_req);

        let resp = self
            .client
            .post(&url)
            .json(&create_req)
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BrokerError::OrderRejected(format!("{status}: {text}")));
        }

        let order: AlpacaOrder = resp
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        let id = Uuid::parse_str(&order.id)
            .map_err(|e| BrokerError::ParseError(format!("order id {:?}: {e}", order.id)))?;

        info!(
            "Order submitted: {} {} {} id={}",
            intent.side, intent.qty, intent.symbol, id
        );
        Ok(OrderReceipt {
            id,
            status: OrderStatus::from_wire(&order.status),
        })
    }

    async fn account_snapshot(&self) -> Result<AccountSnapshot, BrokerError> {
        let url = format!("{}/v2/account", self.config.base_url());
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        let resp = Self::check(resp).await?;

        let account: AlpacaAccount = resp
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        let positions = self.list_positions().await?;

        Ok(AccountSnapshot {
            equity: parse_decimal(&account.equity, "equity")?,
            cash: parse_decimal(&account.cash, "cash")?,
            last_equity: match account.last_equity {
                Some(ref raw) if !raw.is_empty() => Some(parse_decimal(raw, "last_equity")?),
                _ => None,
            },
            positions,
        })
    }

    fn is_paper(&self) -> bool {
        self.config.paper
    }

    fn name(&self) -> &str {
        if self.config.paper {
            "Alpaca Paper"
        } else {
            "Alpaca Live"
        }
    }
}

impl AlpacaBroker {
    async fn list_positions(&self) -> Result<Vec<PositionSnapshot>, BrokerError> {
        let url = format!("{}/v2/positions", self.config.base_url());
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        let resp = Self::check(resp).await?;

        let positions: Vec<AlpacaPosition> = resp
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        positions
            .into_iter()
            .map(|p| {
                Ok(PositionSnapshot {
                    qty: parse_decimal(&p.qty, "qty")?,
                    unrealized_pnl: parse_decimal(&p.unrealized_pl, "unrealized_pl")?,
                    symbol: p.symbol,
                })
            })
            .collect()
    }
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal, BrokerError> {
    raw.parse()
        .map_err(|e| BrokerError::ParseError(format!("{field} {raw:?}: {e}")))
}

#[derive(Debug, Deserialize)]
struct AlpacaAccount {
    cash: String,
    equity: String,
    last_equity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaPosition {
    symbol: String,
    qty: String,
    unrealized_pl: String,
}

#[derive(Debug, Deserialize)]
struct AlpacaOrder {
    id: String,
    status: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    symbol: String,
    qty: String,
    side: String,
    #[serde(rename = "type")]
    order_type: String,
    time_in_force: String,
}

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: Vec<AlpacaBar>,
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    t: String,
    c: f64,
}
