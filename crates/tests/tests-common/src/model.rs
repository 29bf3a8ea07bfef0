use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use query_engine_model::{CompletionRequest, LanguageModel, ModelError};

/// A language model that replays a fixed script of answers and records every
/// request it receives. Running out of answers is a transport error.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    answers: Mutex<VecDeque<Result<Value, ModelError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new(answers: impl IntoIterator<Item = Result<Value, ModelError>>) -> Self {
        ScriptedModel {
            answers: Mutex::new(answers.into_iter().collect()),
            requests: Mutex::new(vec![]),
        }
    }

    /// A model that answers successfully with each of `answers` in turn.
    pub fn answering(answers: impl IntoIterator<Item = Value>) -> Self {
        Self::new(answers.into_iter().map(Ok))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().map(|requests| requests.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Value, ModelError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or_else(|| Err(ModelError::Transport("no scripted answer left".to_string())))
    }
}
