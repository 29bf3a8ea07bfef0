use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid language model endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("request to the language model failed: {0}")]
    Transport(String),
    #[error("the language model request timed out")]
    Timeout,
    #[error("the language model responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("the language model response has no message content")]
    MissingContent,
    #[error("the language model refused to answer: {0}")]
    Refusal(String),
    #[error("the language model returned invalid JSON: {0}")]
    InvalidJson(String),
    #[error("invalid output schema: {0}")]
    InvalidSchema(String),
    #[error("the language model output does not match the {schema} schema: {message}")]
    SchemaViolation { schema: String, message: String },
}

impl From<reqwest::Error> for ModelError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ModelError::Timeout
        } else {
            ModelError::Transport(error.to_string())
        }
    }
}

impl ModelError {
    /// Whether sending the same request again may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Transport(_) | ModelError::Timeout => true,
            ModelError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
