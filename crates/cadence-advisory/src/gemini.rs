//! Gemini judgment client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cadence_core::error::JudgeError;
use cadence_core::traits::Judge;
use cadence_core::types::{JudgeReply, JudgeRequest, JudgeUsage};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model when the configuration names none.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// Published per-million-token prices for the default model tier.
const INPUT_USD_PER_MTOK: f64 = 0.30;
const OUTPUT_USD_PER_MTOK: f64 = 2.50;

const MAX_NEWS_ITEMS: usize = 5;
const MAX_SNIPPET_CHARS: usize = 300;

/// Gemini-backed judgment collaborator.
pub struct GeminiJudge {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiJudge {
    /// Create a client with an explicit API key and model identifier.
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env(model: &str) -> Result<Self, JudgeError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| JudgeError::Configuration("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key, model))
    }

    /// Model identifier in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_prompt(request: &JudgeRequest) -> String {
        let news_blob = if request.news.is_empty() {
            "No recent news found.".to_string()
        } else {
            request
                .news
                .iter()
                .take(MAX_NEWS_ITEMS)
                .map(|item| {
                    let snippet: String = item.snippet.chars().take(MAX_SNIPPET_CHARS).collect();
                    format!("- {}: {}", item.title, snippet)
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "You are a trading advisor. You receive a technical signal (buy/sell) and recent news. \
             Reply with exactly two lines: ACTION: <one of confirm, reduce, skip, override> \
             then REASON: <short explanation>. confirm = trust the signal at full size. \
             reduce = trust but use half size. skip = do not trade this bar. \
             override = disagree with the signal; do not trade it. \
             Use only the words confirm, reduce, skip, or override for ACTION.\n\n\
             Symbol: {}. Technical signal: {}. Last close: {}. Current position qty: {}. \
             Recent news:\n{}\n\nReply with ACTION: <word> then REASON: <explanation>.",
            request.symbol, request.signal, request.last_close, request.position_qty, news_blob
        )
    }
}

#[async_trait]
impl Judge for GeminiJudge {
    async fn evaluate(&self, request: &JudgeRequest) -> Result<JudgeReply, JudgeError> {
        let url = format!("{BASE_URL}/{}:generateContent", self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(request),
                }],
            }],
        };

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| JudgeError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(JudgeError::Api(format!("{status}: {text}")));
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| JudgeError::Api(e.to_string()))?;

        let text = data
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(JudgeError::MalformedReply("empty candidate text".into()));
        }

        let usage = data.usage_metadata.map(|um| {
            let prompt_tokens = um.prompt_token_count;
            let output_tokens = um.candidates_token_count;
            JudgeUsage {
                prompt_tokens,
                output_tokens,
                total_tokens: um
                    .total_token_count
                    .unwrap_or(prompt_tokens + output_tokens),
                estimated_usd: estimate_usd(prompt_tokens, output_tokens),
            }
        });

        debug!(model = %self.model, chars = text.len(), "judgment received");

        Ok(JudgeReply { text, usage })
    }
}

fn estimate_usd(prompt_tokens: u64, output_tokens: u64) -> f64 {
    prompt_tokens as f64 / 1e6 * INPUT_USD_PER_MTOK
        + output_tokens as f64 / 1e6 * OUTPUT_USD_PER_MTOK
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u64,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u64,
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::types::{NewsItem, Signal};
    use rust_decimal_macros::dec;

    fn request() -> JudgeRequest {
        JudgeRequest {
            symbol: "SPY".into(),
            signal: Signal::Buy,
            last_close: 450.25,
            position_qty: dec!(0),
            news: vec![NewsItem {
                title: "Fed holds rates".into(),
                url: "https://example.com/fed".into(),
                snippet: "x".repeat(500),
            }],
        }
    }

    #[test]
    fn test_prompt_contains_context() {
        let prompt = GeminiJudge::build_prompt(&request());
        assert!(prompt.contains("Symbol: SPY"));
        assert!(prompt.contains("Technical signal: buy"));
        assert!(prompt.contains("Last close: 450.25"));
        assert!(prompt.contains("Fed holds rates"));
    }

    #[test]
    fn test_prompt_truncates_snippets() {
        let prompt = GeminiJudge::build_prompt(&request());
        // 500-char snippet is cut to 300
        assert!(!prompt.contains(&"x".repeat(301)));
        assert!(prompt.contains(&"x".repeat(300)));
    }

    #[test]
    fn test_prompt_without_news() {
        let mut req = request();
        req.news.clear();
        let prompt = GeminiJudge::build_prompt(&req);
        assert!(prompt.contains("No recent news found."));
    }

    #[test]
    fn test_cost_estimate() {
        let usd = estimate_usd(1_000_000, 1_000_000);
        assert!((usd - (INPUT_USD_PER_MTOK + OUTPUT_USD_PER_MTOK)).abs() < 1e-9);
    }

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "ACTION: confirm\nREASON: fine"}], "role": "model"}}
            ],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 15, "totalTokenCount": 135}
        }"#;

        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.candidates.len(), 1);
        let um = parsed.usage_metadata.unwrap();
        assert_eq!(um.prompt_token_count, 120);
        assert_eq!(um.total_token_count, Some(135));
    }
}
