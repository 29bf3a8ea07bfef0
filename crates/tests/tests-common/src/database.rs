use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use query_engine_execution::database::{Database, Row};
use query_engine_execution::error::DatabaseError;
use query_engine_sql::sql::string::SQL;

/// A database that replays a fixed script of results and records every
/// statement it is asked to run. Running out of results is a connection error.
#[derive(Debug, Default)]
pub struct ScriptedDatabase {
    results: Mutex<VecDeque<Result<Vec<Row>, DatabaseError>>>,
    statements: Mutex<Vec<SQL>>,
}

impl ScriptedDatabase {
    pub fn new(results: impl IntoIterator<Item = Result<Vec<Row>, DatabaseError>>) -> Self {
        ScriptedDatabase {
            results: Mutex::new(results.into_iter().collect()),
            statements: Mutex::new(vec![]),
        }
    }

    pub fn statements(&self) -> Vec<SQL> {
        self.statements
            .lock()
            .map(|statements| statements.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.statements
            .lock()
            .map(|statements| statements.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Database for ScriptedDatabase {
    async fn fetch_rows(&self, statement: &SQL) -> Result<Vec<Row>, DatabaseError> {
        if let Ok(mut statements) = self.statements.lock() {
            statements.push(statement.clone());
        }
        self.results
            .lock()
            .ok()
            .and_then(|mut results| results.pop_front())
            .unwrap_or_else(|| {
                Err(DatabaseError::Connection(
                    "no scripted result left".to_string(),
                ))
            })
    }
}
