//! An HTTP service answering questions about a client's own transactions.

pub mod error;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{create_state, AppState, DatabaseProvider, PostgresProvider};
