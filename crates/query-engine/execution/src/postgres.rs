//! The PostgreSQL implementation of [`Database`].

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio_postgres::types::{to_sql_checked, Format, IsNull, ToSql, Type};
use tokio_postgres::{Client, NoTls};

use query_engine_sql::sql::helpers::rows_as_json_array;
use query_engine_sql::sql::string::SQL;

use crate::database::{Database, Row};
use crate::error::DatabaseError;

/// A single connection, opened on first use and closed when this value is dropped.
pub struct PostgresDatabase {
    connection_uri: String,
    statement_timeout: Option<Duration>,
    connection: OnceCell<Connection>,
}

struct Connection {
    client: Client,
    task: JoinHandle<()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl PostgresDatabase {
    pub fn new(connection_uri: impl Into<String>, statement_timeout: Option<Duration>) -> Self {
        PostgresDatabase {
            connection_uri: connection_uri.into(),
            statement_timeout,
            connection: OnceCell::new(),
        }
    }

    /// Check that the database accepts connections and queries.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        let client = self.client().await?;
        client
            .simple_query("SELECT 1")
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn client(&self) -> Result<&Client, DatabaseError> {
        let connection = self
            .connection
            .get_or_try_init(|| connect(&self.connection_uri))
            .await?;
        Ok(&connection.client)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn fetch_rows(&self, statement: &SQL) -> Result<Vec<Row>, DatabaseError> {
        let client = self.client().await?;

        let mut begin = "BEGIN TRANSACTION READ ONLY".to_string();
        if let Some(timeout) = self.statement_timeout {
            begin.push_str(&format!("; SET LOCAL statement_timeout = {}", timeout.as_millis()));
        }
        client.batch_execute(&begin).await.map_err(classify)?;

        let result = fetch_json(client, statement).await;

        // Nothing was written, so the transaction is always rolled back.
        let rollback = client.batch_execute("ROLLBACK").await.map_err(classify);
        settle(result, rollback)
    }
}

/// Combine the outcome of a statement with the rollback that followed it. The
/// statement's own error wins over a failed rollback.
fn settle(
    result: Result<Vec<Row>, DatabaseError>,
    rollback: Result<(), DatabaseError>,
) -> Result<Vec<Row>, DatabaseError> {
    match (result, rollback) {
        (result, Ok(())) => result,
        (Err(error), Err(rollback_error)) => {
            tracing::warn!(error = %rollback_error, "rollback failed after a failed statement");
            Err(error)
        }
        (Ok(_), Err(rollback_error)) => Err(rollback_error),
    }
}

async fn fetch_json(client: &Client, statement: &SQL) -> Result<Vec<Row>, DatabaseError> {
    let wrapped = rows_as_json_array(statement.clone());
    let values = wrapped.values().into_iter().map(TextParam).collect::<Vec<_>>();
    let params = values
        .iter()
        .map(|value| value as &(dyn ToSql + Sync))
        .collect::<Vec<_>>();

    let row = client
        .query_one(wrapped.sql.as_str(), &params)
        .await
        .map_err(classify)?;
    let json: String = row.try_get(0).map_err(classify)?;
    serde_json::from_str(&json).map_err(|error| {
        DatabaseError::Connection(format!("unexpected result from the database: {error}"))
    })
}

async fn connect(connection_uri: &str) -> Result<Connection, DatabaseError> {
    let (client, connection) = tokio_postgres::connect(connection_uri, NoTls)
        .await
        .map_err(|error| DatabaseError::Connection(error.to_string()))?;
    let task = tokio::spawn(async move {
        if let Err(error) = connection.await {
            tracing::warn!(%error, "database connection closed with an error");
        }
    });
    Ok(Connection { client, task })
}

/// Server-side rejections of a statement are query errors; anything that breaks
/// the session is a connection error. A statement timeout counts as a query error.
fn classify(error: tokio_postgres::Error) -> DatabaseError {
    match error.as_db_error() {
        Some(db_error) => {
            let code = db_error.code().code();
            let is_connection_class = ["08", "53", "57"]
                .iter()
                .any(|class| code.starts_with(class));
            if is_connection_class && code != "57014" {
                DatabaseError::Connection(db_error.to_string())
            } else {
                DatabaseError::Query(db_error.message().to_string())
            }
        }
        None => DatabaseError::Connection(error.to_string()),
    }
}

/// A parameter sent in text format, so the server infers its type from the statement.
#[derive(Debug)]
struct TextParam<'a>(&'a str);

impl ToSql for TextParam<'_> {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        out.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}
