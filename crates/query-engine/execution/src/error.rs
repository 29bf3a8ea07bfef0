//! Errors for query execution.

/// A failure reported by the database collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    /// The statement was rejected or failed while running. The connection is still usable.
    #[error("{0}")]
    Query(String),
    /// The database could not be reached or the session broke down.
    #[error("{0}")]
    Connection(String),
}

/// A failure of the execution stage that ends the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("database connection failed: {0}")]
    Connection(String),
}
