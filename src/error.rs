use axum::{
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidAdjustment(String),

    #[error("{0}")]
    InsufficientAvailable(String),

    #[error("{0}")]
    OverRelease(String),

    #[error("{0}")]
    DuplicateKey(String),

    #[error("{0}")]
    ReferentialConflict(String),

    /// A conditional update found the record changed since it was read.
    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests, please try again later")]
    RateLimited { retry_after: u64 },

    #[error("Database error")]
    OrmError(DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &str, key: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{entity} not found with ID: {key}"))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::Validation(_) => "ValidationError",
            AppError::InvalidAdjustment(_) => "InvalidAdjustment",
            AppError::InsufficientAvailable(_) => "InsufficientAvailable",
            AppError::OverRelease(_) => "OverRelease",
            AppError::DuplicateKey(_) => "DuplicateKey",
            AppError::ReferentialConflict(_) => "ReferentialConflict",
            AppError::Conflict(_) => "Conflict",
            AppError::RateLimited { .. } => "RateLimited",
            AppError::OrmError(_) => "DatabaseError",
            AppError::Internal(_) => "InternalError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::InvalidAdjustment(_)
            | AppError::InsufficientAvailable(_)
            | AppError::OverRelease(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateKey(_)
            | AppError::ReferentialConflict(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::OrmError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                AppError::DuplicateKey(format!("Duplicate value entered: {detail}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                AppError::ReferentialConflict(format!("Referenced record conflict: {detail}"))
            }
            _ => AppError::OrmError(err),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorData {
    pub kind: String,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::OrmError(err) => tracing::error!(error = %err, "database error"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            _ => {}
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                kind: self.kind().to_string(),
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        let retry_after = match self {
            AppError::RateLimited { retry_after } => Some(retry_after),
            _ => None,
        };
        let mut response = (status, axum::Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_failures_map_to_bad_request() {
        for err in [
            AppError::Validation("quantity cannot be negative".into()),
            AppError::InvalidAdjustment("negative".into()),
            AppError::InsufficientAvailable("short".into()),
            AppError::OverRelease("too much".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{}", err.kind());
        }
    }

    #[test]
    fn not_found_carries_entity_and_key() {
        let err = AppError::not_found("Variant", "abc");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Variant not found with ID: abc");
    }

    #[test]
    fn conflicts_map_to_409_and_db_errors_to_500() {
        assert_eq!(
            AppError::ReferentialConflict("children".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::DuplicateKey("sku".into()).status_code(),
            StatusCode::CONFLICT
        );
        let err = AppError::from(DbErr::Custom("boom".into()));
        assert_eq!(err.kind(), "DatabaseError");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = AppError::RateLimited { retry_after: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "42");
    }

    #[test]
    fn error_response_uses_mapped_status() {
        let response = AppError::OverRelease("Cannot release more than reserved quantity".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
