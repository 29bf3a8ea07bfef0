//! Deterministic stand-ins for the agent's collaborators, shared by the test suites.

pub mod database;
pub mod deployment;
pub mod model;
pub mod stages;

pub use database::ScriptedDatabase;
pub use model::ScriptedModel;
pub use stages::{ScriptedExecutor, ScriptedGenerator, ScriptedTranslator};

/// Route `tracing` output through `env_logger` so `RUST_LOG` works under `cargo test`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a result row from a JSON object literal.
///
/// # Panics
///
/// When `value` is not an object.
pub fn row(value: serde_json::Value) -> query_engine_execution::database::Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("a row must be a JSON object, got {other}"),
    }
}
