use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;

/// Error taxonomy for the gig/bid lifecycle.
///
/// Every failure the engine can report maps to exactly one of these kinds,
/// so the HTTP layer can pick a status without parsing message strings.
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced gig, bid, or user does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Actor lacks the required role for this operation.
    #[error("{0}")]
    Forbidden(String),
    /// Operation is legal in general but not in the record's current state.
    #[error("{0}")]
    InvalidState(String),
    /// A uniqueness invariant would be violated.
    #[error("{0}")]
    Conflict(String),
    /// Malformed field in the request.
    #[error("{0}")]
    InvalidInput(String),
    /// Transient store failure. Driver detail never crosses the API boundary.
    #[error("database error")]
    Database(#[from] DbErr),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                serde_json::json!({ "error": "Database error, please retry" })
            }
            other => serde_json::json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
