//! Advisory gateway: blends a technical signal with an optional external
//! judgment into a final trade decision.
//!
//! The gateway is strictly fail-closed: any news error, judgment error,
//! or unparseable reply resolves to `Skip`. Ambiguity about external
//! opinion is never permission to trade.

mod gateway;
mod gemini;
mod parser;
mod tavily;

pub use gateway::{AdviceRequest, AdvisoryGateway, GeneralNewsCache};
pub use gemini::GeminiJudge;
pub use parser::{parse_reply, ParsedJudgment};
pub use tavily::TavilyNews;
