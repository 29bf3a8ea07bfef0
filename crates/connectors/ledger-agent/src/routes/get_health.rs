use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Healthy when the database accepts a connection and a trivial query.
pub async fn get_health(State(state): State<AppState>) -> StatusCode {
    match state.databases.check().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
