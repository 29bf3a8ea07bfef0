//! Scripted stand-ins for the three stages, for exercising the router on its own.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use query_engine_execution::error::Error as ExecutionError;
use query_engine_execution::query::{ExecutionOutcome, ExecutionRequest, Executor};
use query_engine_generation::generation::{self, GenerationRequest, Generator};
use query_engine_model::ModelError;
use query_engine_translation::translation::{self, TranslationRequest, TranslationResult, Translator};

/// Pops the next scripted answer, falling back to a repeated one once the script runs out.
struct Script<T> {
    queue: Mutex<VecDeque<T>>,
    repeat: Option<T>,
}

impl<T: Clone> Script<T> {
    fn new(items: impl IntoIterator<Item = T>, repeat: Option<T>) -> Self {
        Script {
            queue: Mutex::new(items.into_iter().collect()),
            repeat,
        }
    }

    fn next(&self) -> Option<T> {
        self.queue
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .or_else(|| self.repeat.clone())
    }
}

fn record<T>(log: &Mutex<Vec<T>>, item: T) {
    if let Ok(mut log) = log.lock() {
        log.push(item);
    }
}

fn snapshot<T: Clone>(log: &Mutex<Vec<T>>) -> Vec<T> {
    log.lock().map(|log| log.clone()).unwrap_or_default()
}

/// Answers with a fixed sequence of translations and records the error feedback
/// of every call. Running out of answers is a model failure.
pub struct ScriptedTranslator {
    script: Script<TranslationResult>,
    feedback: Mutex<Vec<Option<String>>>,
}

impl ScriptedTranslator {
    pub fn new(results: impl IntoIterator<Item = TranslationResult>) -> Self {
        ScriptedTranslator {
            script: Script::new(results, None),
            feedback: Mutex::new(vec![]),
        }
    }

    /// Answers every call with `result`.
    pub fn always(result: TranslationResult) -> Self {
        ScriptedTranslator {
            script: Script::new([], Some(result)),
            feedback: Mutex::new(vec![]),
        }
    }

    /// Error feedback received by each call, in order.
    pub fn feedback(&self) -> Vec<Option<String>> {
        snapshot(&self.feedback)
    }

    pub fn calls(&self) -> usize {
        self.feedback().len()
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<TranslationResult, translation::Error> {
        record(&self.feedback, request.error_feedback.map(str::to_string));
        self.script.next().ok_or_else(|| {
            translation::Error::Model(ModelError::Transport("translator script exhausted".to_string()))
        })
    }
}

/// Answers with a fixed sequence of outcomes and records the template of every
/// call. Running out of outcomes is a connection failure.
pub struct ScriptedExecutor {
    script: Script<ExecutionOutcome>,
    templates: Mutex<Vec<Option<String>>>,
}

impl ScriptedExecutor {
    pub fn new(outcomes: impl IntoIterator<Item = ExecutionOutcome>) -> Self {
        ScriptedExecutor {
            script: Script::new(outcomes, None),
            templates: Mutex::new(vec![]),
        }
    }

    /// Answers every call with `outcome`.
    pub fn always(outcome: ExecutionOutcome) -> Self {
        ScriptedExecutor {
            script: Script::new([], Some(outcome)),
            templates: Mutex::new(vec![]),
        }
    }

    /// The SQL template of each call, in order.
    pub fn templates(&self) -> Vec<Option<String>> {
        snapshot(&self.templates)
    }

    pub fn calls(&self) -> usize {
        self.templates().len()
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(&self, request: ExecutionRequest<'_>) -> Result<ExecutionOutcome, ExecutionError> {
        record(&self.templates, request.sql_template.map(str::to_string));
        self.script
            .next()
            .ok_or_else(|| ExecutionError::Connection("executor script exhausted".to_string()))
    }
}

/// Answers every call with the same response, or fails every call, and records
/// the outcome it was given.
pub struct ScriptedGenerator {
    response: Option<String>,
    outcomes: Mutex<Vec<ExecutionOutcome>>,
}

impl ScriptedGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        ScriptedGenerator {
            response: Some(response.into()),
            outcomes: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        ScriptedGenerator {
            response: None,
            outcomes: Mutex::new(vec![]),
        }
    }

    /// The outcome handed to each call, in order.
    pub fn outcomes(&self) -> Vec<ExecutionOutcome> {
        snapshot(&self.outcomes)
    }

    pub fn calls(&self) -> usize {
        self.outcomes().len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, generation::Error> {
        record(&self.outcomes, request.outcome.clone());
        self.response.clone().ok_or_else(|| {
            generation::Error::Model(ModelError::Status {
                status: 500,
                body: "generator unavailable".to_string(),
            })
        })
    }
}
