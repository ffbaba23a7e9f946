//! The advisory state machine: news phase, judgment phase, resolution.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use cadence_core::error::NewsError;
use cadence_core::traits::{Judge, NewsSource};
use cadence_core::types::{AdvisoryResult, JudgeRequest, NewsItem, NewsMode, Signal};

use crate::parser;

/// Context for one advisory consultation.
#[derive(Debug, Clone)]
pub struct AdviceRequest {
    pub symbol: String,
    pub signal: Signal,
    pub last_close: f64,
    pub position_qty: Decimal,
}

/// Cycle-scoped cache for the general-market news query.
///
/// Created fresh by the scheduler each cycle and dropped with it, so the
/// general query runs at most once per cycle no matter how many symbols
/// have signals. A failed query is cached as failed: every later symbol
/// in the cycle resolves to Skip instead of re-querying.
#[derive(Debug, Default)]
pub struct GeneralNewsCache {
    fetched: Option<Fetched>,
}

#[derive(Debug, Clone)]
enum Fetched {
    Ok(Vec<NewsItem>),
    Failed(String),
}

impl GeneralNewsCache {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Orchestrates the optional news-fetch + judgment step.
pub struct AdvisoryGateway {
    news: Arc<dyn NewsSource>,
    judge: Arc<dyn Judge>,
    mode: NewsMode,
}

impl AdvisoryGateway {
    /// Create a gateway over injected news and judgment collaborators.
    pub fn new(news: Arc<dyn NewsSource>, judge: Arc<dyn Judge>, mode: NewsMode) -> Self {
        Self { news, judge, mode }
    }

    /// Run the advisory step for one actionable signal.
    ///
    /// Never returns an error: every failure path resolves to a Skip
    /// result carrying the cause as its reason.
    pub async fn advise(
        &self,
        request: &AdviceRequest,
        cache: &mut GeneralNewsCache,
    ) -> AdvisoryResult {
        let news = match self.gather_news(&request.symbol, cache).await {
            Ok(items) => items,
            Err(e) => {
                warn!(symbol = %request.symbol, error = %e, "news phase failed, skipping");
                return AdvisoryResult::skip(format!("news phase failed: {e}"));
            }
        };

        let judge_request = JudgeRequest {
            symbol: request.symbol.clone(),
            signal: request.signal,
            last_close: request.last_close,
            position_qty: request.position_qty,
            news: news.clone(),
        };

        let reply = match self.judge.evaluate(&judge_request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(symbol = %request.symbol, error = %e, "judgment phase failed, skipping");
                return AdvisoryResult::skip(format!("judgment phase failed: {e}"));
            }
        };

        match parser::parse_reply(&reply.text) {
            Ok(parsed) => {
                debug!(
                    symbol = %request.symbol,
                    action = %parsed.action,
                    "advisory resolved"
                );
                AdvisoryResult {
                    action: parsed.action,
                    reason: parsed.reason,
                    news,
                    usage: reply.usage,
                }
            }
            Err(e) => {
                warn!(symbol = %request.symbol, error = %e, "unparseable judgment, skipping");
                let mut result = AdvisoryResult::skip(format!("unparseable judgment: {e}"));
                result.usage = reply.usage;
                result
            }
        }
    }

    async fn gather_news(
        &self,
        symbol: &str,
        cache: &mut GeneralNewsCache,
    ) -> Result<Vec<NewsItem>, NewsError> {
        match self.mode {
            NewsMode::PerSymbol => self.news.symbol_news(symbol).await,
            NewsMode::General => self.general_news(cache).await,
            NewsMode::Hybrid => {
                let mut items = self.general_news(cache).await?;
                items.extend(self.news.symbol_news(symbol).await?);
                Ok(items)
            }
        }
    }

    async fn general_news(
        &self,
        cache: &mut GeneralNewsCache,
    ) -> Result<Vec<NewsItem>, NewsError> {
        if cache.fetched.is_none() {
            cache.fetched = Some(match self.news.market_news().await {
                Ok(items) => Fetched::Ok(items),
                Err(e) => Fetched::Failed(e.to_string()),
            });
        }

        match cache.fetched.as_ref() {
            Some(Fetched::Ok(items)) => Ok(items.clone()),
            Some(Fetched::Failed(e)) => Err(NewsError::Api(format!(
                "general news query failed this cycle: {e}"
            ))),
            None => Err(NewsError::Api("general news cache empty".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use cadence_core::error::JudgeError;
    use cadence_core::types::{AdvisoryAction, JudgeReply, JudgeUsage};

    struct StubNews {
        fail_symbol: bool,
        fail_market: bool,
        symbol_calls: AtomicUsize,
        market_calls: AtomicUsize,
    }

    impl StubNews {
        fn ok() -> Self {
            Self {
                fail_symbol: false,
                fail_market: false,
                symbol_calls: AtomicUsize::new(0),
                market_calls: AtomicUsize::new(0),
            }
        }

        fn failing_market() -> Self {
            Self {
                fail_market: true,
                ..Self::ok()
            }
        }

        fn failing_symbol() -> Self {
            Self {
                fail_symbol: true,
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl NewsSource for StubNews {
        async fn symbol_news(&self, symbol: &str) -> Result<Vec<NewsItem>, NewsError> {
            self.symbol_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_symbol {
                return Err(NewsError::Api("symbol search down".into()));
            }
            Ok(vec![NewsItem {
                title: format!("{symbol} headline"),
                url: "https://example.com/a".into(),
                snippet: "snippet".into(),
            }])
        }

        async fn market_news(&self) -> Result<Vec<NewsItem>, NewsError> {
            self.market_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_market {
                return Err(NewsError::Api("market search down".into()));
            }
            Ok(vec![NewsItem {
                title: "market headline".into(),
                url: "https://example.com/m".into(),
                snippet: "snippet".into(),
            }])
        }
    }

    struct StubJudge {
        reply: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl Judge for StubJudge {
        async fn evaluate(&self, _request: &JudgeRequest) -> Result<JudgeReply, JudgeError> {
            match self.reply {
                Ok(text) => Ok(JudgeReply {
                    text: text.to_string(),
                    usage: Some(JudgeUsage {
                        prompt_tokens: 100,
                        output_tokens: 10,
                        total_tokens: 110,
                        estimated_usd: 0.0001,
                    }),
                }),
                Err(e) => Err(JudgeError::Api(e.to_string())),
            }
        }
    }

    fn request() -> AdviceRequest {
        AdviceRequest {
            symbol: "SPY".into(),
            signal: Signal::Buy,
            last_close: 450.0,
            position_qty: dec!(0),
        }
    }

    fn gateway(news: StubNews, judge: StubJudge, mode: NewsMode) -> AdvisoryGateway {
        AdvisoryGateway::new(Arc::new(news), Arc::new(judge), mode)
    }

    #[tokio::test]
    async fn test_confirm_passes_through() {
        let gw = gateway(
            StubNews::ok(),
            StubJudge {
                reply: Ok("ACTION: confirm\nREASON: strong tape"),
            },
            NewsMode::PerSymbol,
        );

        let result = gw.advise(&request(), &mut GeneralNewsCache::new()).await;
        assert_eq!(result.action, AdvisoryAction::Confirm);
        assert_eq!(result.reason, "strong tape");
        assert_eq!(result.news.len(), 1);
        assert!(result.usage.is_some());
    }

    #[tokio::test]
    async fn test_news_error_fails_closed() {
        let gw = gateway(
            StubNews::failing_symbol(),
            StubJudge {
                reply: Ok("ACTION: confirm\nREASON: should not matter"),
            },
            NewsMode::PerSymbol,
        );

        let result = gw.advise(&request(), &mut GeneralNewsCache::new()).await;
        assert_eq!(result.action, AdvisoryAction::Skip);
        assert!(result.reason.contains("news phase failed"));
    }

    #[tokio::test]
    async fn test_judge_error_fails_closed() {
        let gw = gateway(
            StubNews::ok(),
            StubJudge {
                reply: Err("model unavailable"),
            },
            NewsMode::PerSymbol,
        );

        let result = gw.advise(&request(), &mut GeneralNewsCache::new()).await;
        assert_eq!(result.action, AdvisoryAction::Skip);
        assert!(result.reason.contains("judgment phase failed"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_fails_closed() {
        let gw = gateway(
            StubNews::ok(),
            StubJudge {
                reply: Ok("I think this looks great, go for it!"),
            },
            NewsMode::PerSymbol,
        );

        let result = gw.advise(&request(), &mut GeneralNewsCache::new()).await;
        assert_eq!(result.action, AdvisoryAction::Skip);
        assert!(result.reason.contains("unparseable judgment"));
    }

    #[tokio::test]
    async fn test_general_query_runs_once_per_cycle() {
        let news = Arc::new(StubNews::ok());
        let gw = AdvisoryGateway::new(
            news.clone(),
            Arc::new(StubJudge {
                reply: Ok("ACTION: confirm\nREASON: fine"),
            }),
            NewsMode::General,
        );

        let mut cache = GeneralNewsCache::new();
        gw.advise(&request(), &mut cache).await;
        let mut second = request();
        second.symbol = "QQQ".into();
        gw.advise(&second, &mut cache).await;

        assert_eq!(news.market_calls.load(Ordering::SeqCst), 1);
        assert_eq!(news.symbol_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_general_query_not_retried_after_failure() {
        let news = Arc::new(StubNews::failing_market());
        let gw = AdvisoryGateway::new(
            news.clone(),
            Arc::new(StubJudge {
                reply: Ok("ACTION: confirm\nREASON: fine"),
            }),
            NewsMode::General,
        );

        let mut cache = GeneralNewsCache::new();
        gw.advise(&request(), &mut cache).await;
        gw.advise(&request(), &mut cache).await;

        assert_eq!(news.market_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hybrid_combines_general_and_symbol() {
        let gw = gateway(
            StubNews::ok(),
            StubJudge {
                reply: Ok("ACTION: reduce\nREASON: mixed picture"),
            },
            NewsMode::Hybrid,
        );

        let result = gw.advise(&request(), &mut GeneralNewsCache::new()).await;
        assert_eq!(result.action, AdvisoryAction::Reduce);
        assert_eq!(result.news.len(), 2);
        assert_eq!(result.news[0].title, "market headline");
        assert_eq!(result.news[1].title, "SPY headline");
    }

    #[tokio::test]
    async fn test_failed_general_query_skips_whole_cycle() {
        let gw = gateway(
            StubNews::failing_market(),
            StubJudge {
                reply: Ok("ACTION: confirm\nREASON: should not matter"),
            },
            NewsMode::General,
        );

        let mut cache = GeneralNewsCache::new();
        let first = gw.advise(&request(), &mut cache).await;
        let second = gw.advise(&request(), &mut cache).await;

        assert_eq!(first.action, AdvisoryAction::Skip);
        assert_eq!(second.action, AdvisoryAction::Skip);
    }
}
