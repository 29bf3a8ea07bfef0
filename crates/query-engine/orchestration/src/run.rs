//! Run the agent for one question.

use serde::Serialize;
use tracing::{info_span, Instrument};

use query_engine_execution::metrics::Metrics;
use query_engine_execution::query::{ExecutionOutcome, ExecutionRequest, Executor};
use query_engine_generation::generation::{GenerationRequest, Generator};
use query_engine_translation::translation::{TranslationRequest, TranslationResult, Translator};

use crate::error::{AgentError, Stage};
use crate::state::{
    route_after_execution, route_after_translation, FallbackCounter, State,
    DEFAULT_MAX_EXECUTION_RETRIES,
};

/// The question being answered and whose data it may look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    /// Identifier of the (already authenticated) client. Every statement is scoped to it.
    pub client_id: String,
    pub query: String,
}

impl QueryContext {
    pub fn new(client_id: impl Into<String>, query: impl Into<String>) -> Self {
        QueryContext {
            client_id: client_id.into(),
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalResponse {
    pub response: String,
}

/// Owns the three stages of a run and the state machine connecting them.
pub struct Orchestrator<T, E, G> {
    translator: T,
    executor: E,
    generator: G,
    max_execution_retries: u32,
    metrics: Metrics,
}

impl<T: Translator, E: Executor, G: Generator> Orchestrator<T, E, G> {
    pub fn new(translator: T, executor: E, generator: G, metrics: Metrics) -> Self {
        Orchestrator {
            translator,
            executor,
            generator,
            max_execution_retries: DEFAULT_MAX_EXECUTION_RETRIES,
            metrics,
        }
    }

    #[must_use]
    pub fn with_max_execution_retries(mut self, max_execution_retries: u32) -> Self {
        self.max_execution_retries = max_execution_retries;
        self
    }

    /// Answer `context.query`. Failed executions are fed back to the translator
    /// until the retry budget runs out; only model and connection failures are errors.
    pub async fn run(&self, context: &QueryContext) -> Result<FinalResponse, AgentError> {
        let request_id = uuid::Uuid::new_v4();
        let result = self
            .run_state_machine(context)
            .instrument(info_span!(
                "Run agent",
                client_id = %context.client_id,
                request_id = %request_id,
            ))
            .await;

        match &result {
            Ok(_) => self.metrics.query_total.inc(),
            Err(err) => {
                self.metrics.fatal_error_total.inc();
                tracing::error!(
                    meta.signal_type = "log",
                    event.domain = "ledger_agent",
                    event.name = "Agent error",
                    name = "Agent error",
                    stage = %err.stage,
                    body = %err,
                    error = true,
                );
            }
        }
        result
    }

    async fn run_state_machine(&self, context: &QueryContext) -> Result<FinalResponse, AgentError> {
        let mut counter = FallbackCounter::new(self.max_execution_retries);
        let mut state = State::initial();

        loop {
            state = match state {
                State::Translating { feedback } => {
                    if feedback.is_some() {
                        self.metrics.translation_retry_total.inc();
                    }
                    let result = self
                        .translate(context, feedback.as_deref())
                        .instrument(info_span!("Translate query", attempt = counter.count() + 1))
                        .await?;
                    if result.is_refusal() {
                        self.metrics.refusal_total.inc();
                    }
                    route_after_translation(result, &counter, feedback)
                }
                State::Executing(result) => {
                    let outcome = self
                        .execute(&result)
                        .instrument(info_span!("Execute query"))
                        .await?;
                    if outcome.is_execution_error() {
                        counter.increment();
                        self.metrics.execution_failure_total.inc();
                    }
                    route_after_execution(outcome, &counter)
                }
                State::Generating(outcome) => {
                    let response = self
                        .generate(context, &outcome)
                        .instrument(info_span!("Generate response"))
                        .await?;
                    return Ok(FinalResponse { response });
                }
            };
            tracing::debug!(
                next = state.name(),
                fallback_count = counter.count(),
                "transition"
            );
        }
    }

    async fn translate(
        &self,
        context: &QueryContext,
        feedback: Option<&str>,
    ) -> Result<TranslationResult, AgentError> {
        self.translator
            .translate(TranslationRequest {
                client_id: &context.client_id,
                query: &context.query,
                error_feedback: feedback,
            })
            .await
            .map_err(|err| AgentError::new(Stage::Translator, err))
    }

    async fn execute(&self, result: &TranslationResult) -> Result<ExecutionOutcome, AgentError> {
        self.executor
            .execute(ExecutionRequest {
                sql_template: result.sql_template.as_deref(),
                params: result.params.as_deref().unwrap_or(&[]),
                prior_error: result.error_message.as_deref(),
            })
            .await
            .map_err(|err| AgentError::new(Stage::Executor, err))
    }

    async fn generate(
        &self,
        context: &QueryContext,
        outcome: &ExecutionOutcome,
    ) -> Result<String, AgentError> {
        self.generator
            .generate(GenerationRequest {
                query: &context.query,
                outcome,
            })
            .await
            .map_err(|err| AgentError::new(Stage::Generator, err))
    }
}
