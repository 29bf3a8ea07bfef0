//! Transient state used by the service.
//!
//! This is initialized on startup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info_span, Instrument};

use ledger_agent_configuration::Configuration;
use query_engine_execution::database::Database;
use query_engine_execution::error::DatabaseError;
use query_engine_execution::metrics::{self, Metrics};
use query_engine_execution::postgres::PostgresDatabase;
use query_engine_generation::generation::{Generator, ModelGenerator};
use query_engine_model::{ChatCompletionsClient, ModelError};
use query_engine_translation::translation::{ModelTranslator, Translator};

/// Opens a fresh database session for every request.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    fn open(&self) -> Box<dyn Database>;

    /// Check that a session can be opened and queried.
    async fn check(&self) -> Result<(), DatabaseError>;
}

pub struct PostgresProvider {
    connection_uri: String,
    statement_timeout: Option<Duration>,
}

impl PostgresProvider {
    pub fn new(connection_uri: impl Into<String>, statement_timeout: Option<Duration>) -> Self {
        PostgresProvider {
            connection_uri: connection_uri.into(),
            statement_timeout,
        }
    }

    fn database(&self) -> PostgresDatabase {
        PostgresDatabase::new(self.connection_uri.clone(), self.statement_timeout)
    }
}

#[async_trait]
impl DatabaseProvider for PostgresProvider {
    fn open(&self) -> Box<dyn Database> {
        Box::new(self.database())
    }

    async fn check(&self) -> Result<(), DatabaseError> {
        self.database().ping().await
    }
}

/// State for our service.
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<dyn Translator>,
    pub generator: Arc<dyn Generator>,
    pub databases: Arc<dyn DatabaseProvider>,
    pub max_execution_retries: u32,
    pub metrics: Metrics,
    pub metrics_registry: prometheus::Registry,
}

/// Build the model client and the database provider, and register the metrics.
pub async fn create_state(
    configuration: &Configuration,
    metrics_registry: &mut prometheus::Registry,
) -> Result<AppState, InitializationError> {
    let metrics = async {
        let metrics_inner =
            Metrics::initialize(metrics_registry).map_err(InitializationError::MetricsError)?;
        Ok(metrics_inner)
    }
    .instrument(info_span!("Setup metrics"))
    .await?;

    let model = Arc::new(
        ChatCompletionsClient::new(&configuration.model)
            .map_err(InitializationError::ModelClientError)?,
    );
    tracing::info!(url = %model.url(), "language model endpoint");

    Ok(AppState {
        translator: Arc::new(ModelTranslator::new(
            model.clone(),
            configuration.metadata.clone(),
        )),
        generator: Arc::new(ModelGenerator::new(model)),
        databases: Arc::new(PostgresProvider::new(
            configuration.connection_uri.clone(),
            configuration.statement_timeout,
        )),
        max_execution_retries: configuration.max_execution_retries,
        metrics,
        metrics_registry: metrics_registry.clone(),
    })
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("error initializing metrics: {0}")]
    MetricsError(metrics::InitializationError),
    #[error("unable to create the language model client: {0}")]
    ModelClientError(ModelError),
}
