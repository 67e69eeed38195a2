use crate::models::ApiResponse;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;

/// Failure of a PTO or notification operation, tagged by kind so callers
/// can branch without matching on message text.
#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "Insufficient {} days balance", _0)]
    InsufficientBalance(&'static str),
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    /// Operation not allowed in the record's current state
    #[display(fmt = "{}", _0)]
    InvalidState(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "Database error: {}", _0)]
    Database(String),
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::InsufficientBalance(_) => "insufficient_balance",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::InvalidState(_) => "invalid_state",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Database(_) => "database",
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Store operation failed");
        ServiceError::Database(e.to_string())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::InsufficientBalance(_)
            | ServiceError::InvalidState(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // database details stay in the logs
        let message = match self {
            ServiceError::Database(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::failure(message, self.kind()))
    }
}

// Extractor failures answer with the same envelope as service errors.

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ServiceError::Validation(format!("Invalid request body: {err}")).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ServiceError::Validation(format!("Invalid path parameter: {err}")).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ServiceError::Validation(format!("Invalid query string: {err}")).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_status_codes() {
        assert_eq!(
            ServiceError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InsufficientBalance("vacation").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("PTO request").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Conflict("raced".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Database("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_reads_like_a_sentence() {
        assert_eq!(
            ServiceError::InsufficientBalance("sick").to_string(),
            "Insufficient sick days balance"
        );
        assert_eq!(
            ServiceError::NotFound("Employee").to_string(),
            "Employee not found"
        );
    }
}
