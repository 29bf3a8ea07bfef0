//! Metrics setup and update for the agent.

use prometheus::core::{AtomicU64, GenericCounter};

#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
    #[error("error initializing metrics: {0}")]
    PrometheusError(#[from] prometheus::Error),
}

#[derive(Debug, Clone)]
pub struct Metrics {
    pub query_total: GenericCounter<AtomicU64>,
    pub refusal_total: GenericCounter<AtomicU64>,
    pub execution_failure_total: GenericCounter<AtomicU64>,
    pub translation_retry_total: GenericCounter<AtomicU64>,
    pub fatal_error_total: GenericCounter<AtomicU64>,
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericCounter<AtomicU64>, InitializationError> {
    let int_counter =
        prometheus::IntCounter::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}

impl Metrics {
    /// Setup counters used to produce Prometheus metrics
    pub fn initialize(
        metrics_registry: &mut prometheus::Registry,
    ) -> Result<Self, InitializationError> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "ledger_agent_query_total",
            "Total questions answered without a fatal error.",
        )?;

        let refusal_total = add_int_counter_metric(
            metrics_registry,
            "ledger_agent_refusal_total",
            "Total questions the translator refused to turn into SQL.",
        )?;

        let execution_failure_total = add_int_counter_metric(
            metrics_registry,
            "ledger_agent_execution_failure_total",
            "Total generated statements that failed to bind or execute.",
        )?;

        let translation_retry_total = add_int_counter_metric(
            metrics_registry,
            "ledger_agent_translation_retry_total",
            "Total translations retried with an execution error fed back.",
        )?;

        let fatal_error_total = add_int_counter_metric(
            metrics_registry,
            "ledger_agent_fatal_error_total",
            "Total questions that ended in a fatal error.",
        )?;

        Ok(Metrics {
            query_total,
            refusal_total,
            execution_failure_total,
            translation_retry_total,
            fatal_error_total,
        })
    }

    /// Counters registered with a throwaway registry.
    pub fn unregistered() -> Result<Self, InitializationError> {
        Self::initialize(&mut prometheus::Registry::new())
    }
}
