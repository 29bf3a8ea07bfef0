//! A [`LanguageModel`] backed by an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use ledger_agent_configuration::{ModelConfiguration, ModelEndpoint};
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use crate::{CompletionRequest, LanguageModel, ModelError};

const MAX_ATTEMPTS: u32 = 3;

/// How the credential travels with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// Azure OpenAI: an `api-key` header.
    ApiKeyHeader,
    /// OpenAI: a bearer token.
    Bearer,
}

#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    url: Url,
    auth: Auth,
    api_key: String,
    /// Sent in the body for OpenAI; Azure routes by deployment instead.
    model: Option<String>,
    max_tokens: u32,
    temperature: f32,
    seed: Option<i64>,
}

impl ChatCompletionsClient {
    pub fn new(configuration: &ModelConfiguration) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(configuration.request_timeout)
            .build()?;
        let (url, auth, model) = match &configuration.endpoint {
            ModelEndpoint::AzureOpenAi {
                endpoint,
                deployment,
                api_version,
            } => (
                azure_url(endpoint, deployment, api_version)?,
                Auth::ApiKeyHeader,
                None,
            ),
            ModelEndpoint::OpenAi { base_url, model } => {
                (openai_url(base_url)?, Auth::Bearer, Some(model.clone()))
            }
        };

        Ok(Self {
            client,
            url,
            auth,
            api_key: configuration.api_key.clone(),
            model,
            max_tokens: configuration.max_tokens,
            temperature: configuration.temperature,
            seed: configuration.seed,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn payload(&self, request: &CompletionRequest) -> Value {
        let mut schema = request.schema.clone();
        if let Some(object) = schema.as_object_mut() {
            object.remove("$schema");
        }

        let mut payload = json!({
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "schema": schema,
                    "strict": false,
                },
            },
        });
        if let Some(model) = &self.model {
            payload["model"] = json!(model);
        }
        if let Some(seed) = self.seed {
            payload["seed"] = json!(seed);
        }
        payload
    }

    async fn send(&self, payload: &Value) -> Result<Value, ModelError> {
        let request = self.client.post(self.url.clone()).json(payload);
        let request = match self.auth {
            Auth::ApiKeyHeader => request.header("api-key", &self.api_key),
            Auth::Bearer => request.bearer_auth(&self.api_key),
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            Err(ModelError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn send_with_retry(&self, payload: &Value) -> Result<Value, ModelError> {
        let mut attempt = 1;
        loop {
            match self.send(payload).await {
                Err(error) if error.is_transient() && attempt < MAX_ATTEMPTS => {
                    let wait = Duration::from_millis(500 * 2_u64.pow(attempt - 1));
                    tracing::warn!(attempt, %error, ?wait, "retrying language model request");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Value, ModelError> {
        tracing::debug!(schema = %request.schema_name, "calling language model");
        let payload = self.payload(&request);
        let response = self.send_with_retry(&payload).await?;
        parse_response(&response)
    }
}

fn azure_url(endpoint: &str, deployment: &str, api_version: &str) -> Result<Url, ModelError> {
    let mut url = Url::parse(&format!(
        "{}/openai/deployments/{deployment}/chat/completions",
        endpoint.trim_end_matches('/')
    ))
    .map_err(|error| ModelError::InvalidEndpoint(format!("{endpoint}: {error}")))?;
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

fn openai_url(base_url: &str) -> Result<Url, ModelError> {
    Url::parse(&format!("{}/chat/completions", base_url.trim_end_matches('/')))
        .map_err(|error| ModelError::InvalidEndpoint(format!("{base_url}: {error}")))
}

/// Extract the JSON answer from a chat-completions response body.
fn parse_response(response: &Value) -> Result<Value, ModelError> {
    let message = &response["choices"][0]["message"];
    if let Some(refusal) = message["refusal"].as_str() {
        return Err(ModelError::Refusal(refusal.to_string()));
    }
    let content = message["content"]
        .as_str()
        .ok_or(ModelError::MissingContent)?;
    serde_json::from_str(content).map_err(|error| ModelError::InvalidJson(error.to_string()))
}
