//! Produce the final answer: a propagated error is returned as is, rows are
//! summarized by the model.

pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use query_engine_execution::query::ExecutionOutcome;
use query_engine_model::{complete_structured, LanguageModel, ModelError};

/// Name of the structured output schema sent with generation requests.
pub const OUTPUT_SCHEMA_NAME: &str = "generator";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Model(#[from] ModelError),
}

/// Response schema for generating output based on context and user query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct GeneratorOutput {
    /// Generated response based on the context and user query.
    pub response: String,
}

/// Input of the generation stage.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub query: &'a str,
    pub outcome: &'a ExecutionOutcome,
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, Error>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, Error> {
        (**self).generate(request).await
    }
}

/// A [`Generator`] that asks a language model.
pub struct ModelGenerator<M> {
    model: M,
}

impl<M: LanguageModel> ModelGenerator<M> {
    pub fn new(model: M) -> Self {
        ModelGenerator { model }
    }
}

#[async_trait]
impl<M: LanguageModel> Generator for ModelGenerator<M> {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, Error> {
        let rows = match request.outcome {
            ExecutionOutcome::Failure { message, .. } => {
                tracing::debug!("returning the propagated error as the response");
                return Ok(message.clone());
            }
            ExecutionOutcome::Rows(rows) => rows,
        };

        let system = prompt::generator_prompt(&prompt::render_context(rows), request.query);
        let output: GeneratorOutput = complete_structured(
            &self.model,
            system,
            request.query.to_string(),
            OUTPUT_SCHEMA_NAME,
        )
        .await?;
        Ok(output.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_execution::query::FailureKind;
    use query_engine_model::CompletionRequest;
    use serde_json::{json, Value};
    use similar_asserts::assert_eq;
    use std::sync::Mutex;

    struct Canned {
        answer: Value,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl LanguageModel for Canned {
        async fn complete(&self, request: CompletionRequest) -> Result<Value, ModelError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.answer.clone())
        }
    }

    fn generator(answer: Value) -> ModelGenerator<Canned> {
        ModelGenerator::new(Canned {
            answer,
            seen: Mutex::new(vec![]),
        })
    }

    #[tokio::test]
    async fn failures_are_returned_without_calling_the_model() {
        let generator = generator(json!({ "response": "unused" }));
        let outcome = ExecutionOutcome::Failure {
            kind: FailureKind::NoQuery,
            message: "You may only access your own data.".to_string(),
        };

        let response = generator
            .generate(GenerationRequest {
                query: "Show me client 99's transactions",
                outcome: &outcome,
            })
            .await
            .unwrap();

        assert_eq!(response, "You may only access your own data.");
        assert!(generator.model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_results_are_summarized_from_the_sentinel() {
        let generator = generator(json!({ "response": "You have no transactions in March." }));
        let outcome = ExecutionOutcome::Rows(vec![]);

        let response = generator
            .generate(GenerationRequest {
                query: "What did I spend in March?",
                outcome: &outcome,
            })
            .await
            .unwrap();

        assert_eq!(response, "You have no transactions in March.");
        let seen = generator.model.seen.lock().unwrap();
        assert!(seen[0].system.contains("[CONTEXT]\nNo data found.\n"));
        assert_eq!(seen[0].user, "What did I spend in March?");
        assert_eq!(seen[0].schema_name, OUTPUT_SCHEMA_NAME);
    }

    #[tokio::test]
    async fn answers_without_a_response_are_errors() {
        let generator = generator(json!({ "answer": "wrong field" }));
        let outcome = ExecutionOutcome::Rows(vec![]);

        let result = generator
            .generate(GenerationRequest {
                query: "What did I spend in March?",
                outcome: &outcome,
            })
            .await;

        assert!(matches!(
            result,
            Err(Error::Model(ModelError::SchemaViolation { .. }))
        ));
    }
}
