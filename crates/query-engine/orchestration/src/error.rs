//! Errors that end a run.

use std::fmt;

/// The stage a fatal error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Translator,
    Executor,
    Generator,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Translator => "sql_translator",
            Stage::Executor => "sql_executor",
            Stage::Generator => "generator",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure no retry can fix: the model or the database could not be used.
#[derive(Debug, thiserror::Error)]
#[error("Error in {stage}: {source}")]
pub struct AgentError {
    pub stage: Stage,
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl AgentError {
    pub fn new(stage: Stage, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        AgentError {
            stage,
            source: source.into(),
        }
    }
}
