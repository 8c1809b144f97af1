use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

/// Error taxonomy shared by every handler. Each variant carries the
/// user-facing message that ends up in the `{success: false, message}`
/// envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    NotFound(String),
    Forbidden(String),
    Validation(String),
    Closed(String),
    Unauthorized(String),
    Database(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Validation(msg)
            | AppError::Closed(msg)
            | AppError::Unauthorized(msg)
            | AppError::Database(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::Closed(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(_: mongodb::bson::oid::Error) -> Self {
        AppError::Validation("Invalid id".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Closed("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn display_is_the_bare_message() {
        let err = AppError::NotFound("Question not found".into());
        assert_eq!(err.to_string(), "Question not found");
    }
}
