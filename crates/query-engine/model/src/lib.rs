//! The language model collaborator: a trait the stages call through, structured
//! output validation on top of it, and an HTTP client for chat-completions APIs.

pub mod client;
pub mod error;
pub mod structured;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::ChatCompletionsClient;
pub use error::ModelError;
pub use structured::{complete_structured, output_schema};

/// One call to the model: instructions, the user's message, and the JSON
/// Schema the answer must be an instance of.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub schema_name: String,
    pub schema: serde_json::Value,
}

/// A language model that answers with a JSON value.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<serde_json::Value, ModelError>;
}

#[async_trait]
impl<M: LanguageModel + ?Sized> LanguageModel for Arc<M> {
    async fn complete(&self, request: CompletionRequest) -> Result<serde_json::Value, ModelError> {
        (**self).complete(request).await
    }
}
