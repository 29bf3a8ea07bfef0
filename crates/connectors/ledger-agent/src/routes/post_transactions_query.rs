use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use query_engine_execution::query::SqlExecutor;
use query_engine_orchestration::{FinalResponse, Orchestrator, QueryContext};

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub client_id: String,
    pub query: String,
}

/// Answer one question. The database session lives as long as this request.
pub async fn post_transactions_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<FinalResponse>, ServerError> {
    let orchestrator = Orchestrator::new(
        state.translator.clone(),
        SqlExecutor::new(state.databases.open()),
        state.generator.clone(),
        state.metrics.clone(),
    )
    .with_max_execution_retries(state.max_execution_retries);

    let context = QueryContext::new(request.client_id, request.query);
    let response = orchestrator.run(&context).await?;
    Ok(Json(response))
}
