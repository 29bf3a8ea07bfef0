//! The database collaborator.

use std::sync::Arc;

use async_trait::async_trait;

use query_engine_sql::sql::string::SQL;

use crate::error::DatabaseError;

/// One result row: column name to value, in column order. When two columns
/// share a name the last one wins.
pub type Row = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait Database: Send + Sync {
    /// Run a read-only statement using native `$n` placeholders.
    async fn fetch_rows(&self, statement: &SQL) -> Result<Vec<Row>, DatabaseError>;
}

#[async_trait]
impl<D: Database + ?Sized> Database for Arc<D> {
    async fn fetch_rows(&self, statement: &SQL) -> Result<Vec<Row>, DatabaseError> {
        (**self).fetch_rows(statement).await
    }
}

#[async_trait]
impl<D: Database + ?Sized> Database for Box<D> {
    async fn fetch_rows(&self, statement: &SQL) -> Result<Vec<Row>, DatabaseError> {
        (**self).fetch_rows(statement).await
    }
}
