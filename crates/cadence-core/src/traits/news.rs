//! News collaborator trait.

use async_trait::async_trait;

use crate::error::NewsError;
use crate::types::NewsItem;

/// The news-search collaborator used by the advisory step.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Recent news for one symbol.
    async fn symbol_news(&self, symbol: &str) -> Result<Vec<NewsItem>, NewsError>;

    /// Recent general-market news, shared across symbols within a cycle.
    async fn market_news(&self) -> Result<Vec<NewsItem>, NewsError>;
}
