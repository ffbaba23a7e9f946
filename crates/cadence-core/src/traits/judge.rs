//! Judgment collaborator trait.

use async_trait::async_trait;

use crate::error::JudgeError;
use crate::types::{JudgeReply, JudgeRequest};

/// The external judgment collaborator.
///
/// Replies are unstructured text and must be validated by the advisory
/// gateway's parser before they can influence a trade.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Evaluate a technical signal with its context.
    async fn evaluate(&self, request: &JudgeRequest) -> Result<JudgeReply, JudgeError>;
}
