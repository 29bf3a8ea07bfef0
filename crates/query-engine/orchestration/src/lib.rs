//! Drive one question through translation, execution and generation, retrying
//! translation when the generated statement fails.

pub mod error;
pub mod run;
pub mod state;

pub use error::{AgentError, Stage};
pub use run::{FinalResponse, Orchestrator, QueryContext};
pub use state::{FallbackCounter, State, DEFAULT_MAX_EXECUTION_RETRIES};
