//! Settings for reaching the database and the language model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::values::{ApiKey, ConnectionUri, Secret};

pub const DEFAULT_CONNECTION_URI_VARIABLE: &str = "CONNECTION_URI";
pub const DEFAULT_AZURE_API_KEY_VARIABLE: &str = "AZURE_OPENAI_API_KEY";
pub const DEFAULT_AZURE_ENDPOINT_VARIABLE: &str = "AZURE_OPENAI_ENDPOINT";
pub const DEFAULT_AZURE_DEPLOYMENT_VARIABLE: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const DEFAULT_OPENAI_API_KEY_VARIABLE: &str = "OPENAI_API_KEY";

pub const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Database connection settings.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnectionSettings {
    /// Connection string for a Postgres-compatible database.
    pub connection_uri: ConnectionUri,
}

impl DatabaseConnectionSettings {
    pub fn empty() -> Self {
        Self {
            connection_uri: ConnectionUri(Secret::from_environment(
                DEFAULT_CONNECTION_URI_VARIABLE,
            )),
        }
    }
}

/// Which chat-completions API the model is served from.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "provider", rename_all = "camelCase")]
pub enum ModelProvider {
    #[serde(rename_all = "camelCase")]
    AzureOpenAi {
        /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
        endpoint: Secret,
        /// Name of the model deployment.
        deployment: Secret,
        #[serde(default = "default_azure_api_version")]
        api_version: String,
    },
    #[serde(rename_all = "camelCase")]
    OpenAi {
        #[serde(default = "default_openai_base_url")]
        base_url: String,
        model: String,
    },
}

/// Language model connection and sampling settings.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelConnectionSettings {
    #[serde(flatten)]
    pub provider: ModelProvider,
    pub api_key: ApiKey,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f32,
    /// Sampling seed, for reproducible answers where the provider supports it.
    #[serde(default = "default_seed")]
    pub seed: Option<i64>,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl ModelConnectionSettings {
    /// Azure OpenAI with every location and credential read from the environment.
    pub fn empty() -> Self {
        Self {
            provider: ModelProvider::AzureOpenAi {
                endpoint: Secret::from_environment(DEFAULT_AZURE_ENDPOINT_VARIABLE),
                deployment: Secret::from_environment(DEFAULT_AZURE_DEPLOYMENT_VARIABLE),
                api_version: default_azure_api_version(),
            },
            api_key: ApiKey(Secret::from_environment(DEFAULT_AZURE_API_KEY_VARIABLE)),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            seed: default_seed(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }

    pub fn open_ai(model: impl Into<String>) -> Self {
        Self {
            provider: ModelProvider::OpenAi {
                base_url: default_openai_base_url(),
                model: model.into(),
            },
            api_key: ApiKey(Secret::from_environment(DEFAULT_OPENAI_API_KEY_VARIABLE)),
            ..Self::empty()
        }
    }
}

/// Limits applied to each run of the agent.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    /// How many failed executions are fed back to translation before giving up.
    #[serde(default = "default_max_execution_retries")]
    pub max_execution_retries: u32,
    /// Statement timeout applied to every query, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_timeout_ms: Option<u64>,
}

impl AgentSettings {
    pub fn is_default(&self) -> bool {
        *self == AgentSettings::default()
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_execution_retries: default_max_execution_retries(),
            statement_timeout_ms: None,
        }
    }
}

// for serde default //
fn default_azure_api_version() -> String {
    DEFAULT_AZURE_API_VERSION.to_string()
}
fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}
fn default_max_tokens() -> u32 {
    16000
}
#[allow(clippy::unnecessary_wraps)]
fn default_seed() -> Option<i64> {
    Some(42)
}
fn default_request_timeout_seconds() -> u64 {
    60
}
fn default_max_execution_retries() -> u32 {
    3
}
