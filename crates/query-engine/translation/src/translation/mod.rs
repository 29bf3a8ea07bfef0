//! Translate a question to a SQL template and its parameters, asking the model to
//! repair the previous attempt when an execution error is fed back.

pub mod error;
pub mod output;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;

use query_engine_metadata::metadata::Metadata;
use query_engine_model::{complete_structured, LanguageModel};

pub use error::Error;
pub use output::{TranslationResult, TranslatorOutput, TranslatorParam};

/// Name of the structured output schema sent with translation requests.
pub const OUTPUT_SCHEMA_NAME: &str = "sql_translator";

/// Input of one translation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationRequest<'a> {
    pub client_id: &'a str,
    pub query: &'a str,
    /// Diagnostic of the previous failed execution, if any.
    pub error_feedback: Option<&'a str>,
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: TranslationRequest<'_>)
        -> Result<TranslationResult, Error>;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<TranslationResult, Error> {
        (**self).translate(request).await
    }
}

/// A [`Translator`] that asks a language model.
pub struct ModelTranslator<M> {
    model: M,
    metadata: Metadata,
}

impl<M: LanguageModel> ModelTranslator<M> {
    pub fn new(model: M, metadata: Metadata) -> Self {
        ModelTranslator { model, metadata }
    }
}

#[async_trait]
impl<M: LanguageModel> Translator for ModelTranslator<M> {
    async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<TranslationResult, Error> {
        let system = prompt::translator_prompt(&self.metadata, &request);
        let output: TranslatorOutput = complete_structured(
            &self.model,
            system,
            request.query.to_string(),
            OUTPUT_SCHEMA_NAME,
        )
        .await?;

        let result = TranslationResult::from(output);
        tracing::debug!(
            sql_template = result.sql_template.as_deref().unwrap_or_default(),
            params = result.params.as_ref().map_or(0, Vec::len),
            refusal = result.error_message.as_deref().unwrap_or_default(),
            "translated query"
        );
        Ok(result)
    }
}
