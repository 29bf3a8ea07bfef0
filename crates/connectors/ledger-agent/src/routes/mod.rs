mod get_health;
mod get_metrics;
mod post_transactions_query;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub use get_health::get_health;
pub use get_metrics::get_metrics;
pub use post_transactions_query::{post_transactions_query, QueryRequest};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .route("/transactions/query", post(post_transactions_query))
        .with_state(state)
}
