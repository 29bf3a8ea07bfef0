//! Configuration for the agent.

use std::fmt;
use std::time::Duration;

use query_engine_metadata::metadata;
use schemars::{gen::SchemaSettings, schema::RootSchema};

use crate::version1::ParsedConfiguration;

/// The 'Configuration' type collects all the information necessary to serve queries at runtime.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration', which resolves every secret against the environment.
pub struct Configuration {
    pub metadata: metadata::Metadata,
    pub connection_uri: String,
    pub model: ModelConfiguration,
    /// Failed executions fed back to translation before the last error becomes the answer.
    pub max_execution_retries: u32,
    pub statement_timeout: Option<Duration>,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("metadata", &self.metadata)
            .field("connection_uri", &"<redacted>")
            .field("model", &self.model)
            .field("max_execution_retries", &self.max_execution_retries)
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

/// Resolved language model settings.
#[derive(Clone)]
pub struct ModelConfiguration {
    pub endpoint: ModelEndpoint,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub seed: Option<i64>,
    pub request_timeout: Duration,
}

impl fmt::Debug for ModelConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfiguration")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("seed", &self.seed)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEndpoint {
    AzureOpenAi {
        endpoint: String,
        deployment: String,
        api_version: String,
    },
    OpenAi {
        base_url: String,
        model: String,
    },
}

/// The JSON schema of the latest configuration format.
pub fn generate_latest_schema() -> RootSchema {
    SchemaSettings::draft07()
        .into_generator()
        .into_root_schema_for::<ParsedConfiguration>()
}
