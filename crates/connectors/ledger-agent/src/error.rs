use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use query_engine_orchestration::AgentError;

pub enum ServerError {
    Agent(AgentError),
}

#[derive(Serialize)]
struct JsonErrorResponse {
    detail: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ServerError::Agent(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        tracing::debug!(%status, %detail, "returning error");
        (status, Json(JsonErrorResponse { detail })).into_response()
    }
}

impl From<AgentError> for ServerError {
    fn from(value: AgentError) -> Self {
        ServerError::Agent(value)
    }
}
