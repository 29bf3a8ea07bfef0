//! Execute a translated SQL template against the database.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info_span, Instrument};

use query_engine_sql::sql;
use query_engine_sql::sql::string::{display_params, Param};

use crate::database::{Database, Row};
use crate::error::{DatabaseError, Error};

/// Prefix of every diagnostic produced by a failed execution.
pub const EXECUTION_ERROR_MARKER: &str = "SQL Execution Error:";

/// Message used when there was nothing to execute and no reason was given.
pub const NO_QUERY_MESSAGE: &str = "No SQL query to execute.";

/// Input of the execution stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionRequest<'a> {
    pub sql_template: Option<&'a str>,
    pub params: &'a [Param],
    /// Message carried over from translation, such as a refusal.
    pub prior_error: Option<&'a str>,
}

/// Why no rows were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The statement could not be bound or was rejected by the database. Worth a
    /// corrected translation.
    Execution,
    /// There was no statement to run.
    NoQuery,
}

/// The result of the execution stage. Rows and an error never occur together.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Rows(Vec<Row>),
    Failure { kind: FailureKind, message: String },
}

impl ExecutionOutcome {
    pub fn no_query(prior_error: Option<&str>) -> Self {
        ExecutionOutcome::Failure {
            kind: FailureKind::NoQuery,
            message: prior_error.unwrap_or(NO_QUERY_MESSAGE).to_string(),
        }
    }

    pub fn execution_error(
        sql_template: &str,
        params: &[Param],
        error: impl std::fmt::Display,
    ) -> Self {
        ExecutionOutcome::Failure {
            kind: FailureKind::Execution,
            message: format!(
                "{EXECUTION_ERROR_MARKER} {sql_template} Params: {} Error: {error}",
                display_params(params)
            ),
        }
    }

    pub fn is_execution_error(&self) -> bool {
        matches!(
            self,
            ExecutionOutcome::Failure {
                kind: FailureKind::Execution,
                ..
            }
        )
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Rows(_) => None,
            ExecutionOutcome::Failure { message, .. } => Some(message),
        }
    }
}

#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: ExecutionRequest<'_>) -> Result<ExecutionOutcome, Error>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Arc<E> {
    async fn execute(&self, request: ExecutionRequest<'_>) -> Result<ExecutionOutcome, Error> {
        (**self).execute(request).await
    }
}

/// An [`Executor`] running statements through a [`Database`].
pub struct SqlExecutor<D> {
    database: D,
}

impl<D: Database> SqlExecutor<D> {
    pub fn new(database: D) -> Self {
        SqlExecutor { database }
    }
}

#[async_trait]
impl<D: Database> Executor for SqlExecutor<D> {
    async fn execute(&self, request: ExecutionRequest<'_>) -> Result<ExecutionOutcome, Error> {
        let Some(sql_template) = request.sql_template else {
            tracing::debug!("no SQL template, skipping the database");
            return Ok(ExecutionOutcome::no_query(request.prior_error));
        };

        let statement = match sql::placeholders::normalize(sql_template, request.params) {
            Ok(statement) => statement,
            Err(bind_error) => {
                tracing::warn!(error = %bind_error, "could not bind query parameters");
                return Ok(ExecutionOutcome::execution_error(
                    sql_template,
                    request.params,
                    bind_error,
                ));
            }
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            let pretty = sqlformat::format(
                &statement.sql,
                &sqlformat::QueryParams::None,
                sqlformat::FormatOptions::default(),
            );
            tracing::debug!(
                generated_sql = %pretty,
                params = %display_params(&statement.params),
                "executing query"
            );
        }

        match self
            .database
            .fetch_rows(&statement)
            .instrument(info_span!("Database request", params = statement.params.len()))
            .await
        {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "query succeeded");
                Ok(ExecutionOutcome::Rows(rows))
            }
            Err(DatabaseError::Query(message)) => {
                tracing::warn!(error = %message, "query failed");
                Ok(ExecutionOutcome::execution_error(
                    sql_template,
                    request.params,
                    message,
                ))
            }
            Err(DatabaseError::Connection(message)) => Err(Error::Connection(message)),
        }
    }
}
