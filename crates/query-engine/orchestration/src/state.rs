//! The router: states of a run and the transitions between them.

use query_engine_execution::query::ExecutionOutcome;
use query_engine_translation::translation::TranslationResult;

/// How many failed executions a run tolerates before answering with the last error.
pub const DEFAULT_MAX_EXECUTION_RETRIES: u32 = 3;

/// Counts failed executions in one run. It only ever goes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackCounter {
    count: u32,
    ceiling: u32,
}

impl FallbackCounter {
    pub fn new(ceiling: u32) -> Self {
        FallbackCounter { count: 0, ceiling }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Whether a fresh translation may still be executed.
    pub fn may_execute(&self) -> bool {
        self.count <= self.ceiling
    }

    /// Whether a failed execution may be sent back for another translation.
    pub fn may_retry(&self) -> bool {
        self.count < self.ceiling
    }
}

impl Default for FallbackCounter {
    fn default() -> Self {
        FallbackCounter::new(DEFAULT_MAX_EXECUTION_RETRIES)
    }
}

/// Where a run is. `Generating` is terminal: the generator runs once and the run ends.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    /// Ask for a translation, with the diagnostic of the last failed execution if any.
    Translating { feedback: Option<String> },
    Executing(TranslationResult),
    Generating(ExecutionOutcome),
}

impl State {
    pub fn initial() -> Self {
        State::Translating { feedback: None }
    }

    pub fn name(&self) -> &'static str {
        match self {
            State::Translating { .. } => "translating",
            State::Executing(_) => "executing",
            State::Generating(_) => "generating",
        }
    }
}

/// Decide what follows a translation.
///
/// Past the ceiling the translation is not executed; the run answers with the
/// feedback that prompted it, or the default message when there is none.
pub fn route_after_translation(
    result: TranslationResult,
    counter: &FallbackCounter,
    feedback: Option<String>,
) -> State {
    if counter.may_execute() {
        State::Executing(result)
    } else {
        State::Generating(ExecutionOutcome::no_query(feedback.as_deref()))
    }
}

/// Decide what follows an execution. The counter must already account for
/// `outcome` when it is an execution error.
pub fn route_after_execution(outcome: ExecutionOutcome, counter: &FallbackCounter) -> State {
    if outcome.is_execution_error() && counter.may_retry() {
        State::Translating {
            feedback: outcome.error_message().map(str::to_string),
        }
    } else {
        State::Generating(outcome)
    }
}
