//! Convert a parsed configuration into the configuration used at runtime.

use std::time::Duration;

use crate::configuration::{Configuration, ModelConfiguration, ModelEndpoint};
use crate::connection_settings::{ModelConnectionSettings, ModelProvider};
use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::values::{ApiKey, ConnectionUri, Secret};
use crate::version1::ParsedConfiguration;

/// Resolve every secret of `parsed_config` against `environment`.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let ConnectionUri(connection_uri) = &parsed_config.connection_settings.connection_uri;
    let connection_uri = resolve(
        connection_uri,
        &environment,
        "connectionSettings.connectionUri",
    )?;
    let model = make_model_configuration(&parsed_config.model, &environment)?;

    Ok(Configuration {
        metadata: parsed_config.metadata,
        connection_uri,
        model,
        max_execution_retries: parsed_config.agent.max_execution_retries,
        statement_timeout: parsed_config
            .agent
            .statement_timeout_ms
            .map(Duration::from_millis),
    })
}

fn make_model_configuration(
    settings: &ModelConnectionSettings,
    environment: &impl Environment,
) -> Result<ModelConfiguration, MakeRuntimeConfigurationError> {
    let endpoint = match &settings.provider {
        ModelProvider::AzureOpenAi {
            endpoint,
            deployment,
            api_version,
        } => ModelEndpoint::AzureOpenAi {
            endpoint: resolve(endpoint, environment, "model.endpoint")?,
            deployment: resolve(deployment, environment, "model.deployment")?,
            api_version: api_version.clone(),
        },
        ModelProvider::OpenAi { base_url, model } => ModelEndpoint::OpenAi {
            base_url: base_url.clone(),
            model: model.clone(),
        },
    };

    if !(0.0..=2.0).contains(&settings.temperature) {
        return Err(MakeRuntimeConfigurationError::InvalidValue {
            setting: "model.temperature",
            message: format!("{} is outside of 0.0..=2.0", settings.temperature),
        });
    }

    let ApiKey(api_key) = &settings.api_key;
    Ok(ModelConfiguration {
        endpoint,
        api_key: resolve(api_key, environment, "model.apiKey")?,
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
        seed: settings.seed,
        request_timeout: Duration::from_secs(settings.request_timeout_seconds),
    })
}

fn resolve(
    secret: &Secret,
    environment: &impl Environment,
    setting: &'static str,
) -> Result<String, MakeRuntimeConfigurationError> {
    secret
        .resolve(environment)
        .map(std::borrow::Cow::into_owned)
        .map_err(|source| MakeRuntimeConfigurationError::MissingEnvironmentVariable { setting, source })
}
