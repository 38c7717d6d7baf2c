use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Crate-wide error type. Maps 1:1 onto the HTTP status codes in the
/// control plane's error handling design; detector-internal errors are
/// logged and never constructed here.
#[derive(Debug, thiserror::Error)]
pub enum ControlPlaneError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("node '{0}' still has pods assigned")]
    HasPods(String),

    #[error("no healthy node has enough residual capacity for {0} cpu")]
    InsufficientCapacity(u32),

    #[error("container runtime error: {0}")]
    Runtime(String),

    #[error("node '{0}' is already stopped")]
    AlreadyStopped(String),
}

impl ControlPlaneError {
    fn status(&self) -> StatusCode {
        match self {
            ControlPlaneError::Validation(_) => StatusCode::BAD_REQUEST,
            ControlPlaneError::NotFound { .. } => StatusCode::NOT_FOUND,
            ControlPlaneError::HasPods(_) => StatusCode::BAD_REQUEST,
            ControlPlaneError::InsufficientCapacity(_) => StatusCode::BAD_REQUEST,
            ControlPlaneError::Runtime(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ControlPlaneError::AlreadyStopped(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ControlPlaneError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = Json(json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ControlPlaneError>;
