use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Leave range conflicts with existing request {conflicting_request_id}")]
    Overlap { conflicting_request_id: Uuid },

    #[error(
        "Insufficient balance: {requested} day(s) requested, {available} available (short by {shortfall})"
    )]
    InsufficientBalance {
        available: BigDecimal,
        requested: BigDecimal,
        shortfall: BigDecimal,
    },

    #[error("Cannot {action} a leave request in status '{current}'")]
    InvalidStateTransition { action: &'static str, current: String },

    #[error("Balance update lost a concurrent write race; retry the operation")]
    ConcurrencyConflict,

    #[error("Partial failure: {0}")]
    PartialFailure(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            AppError::Overlap { .. } => StatusCode::CONFLICT,
            AppError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            AppError::ConcurrencyConflict => StatusCode::CONFLICT,
            AppError::PartialFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        log::error!(
            "Request failed with status {}: {}",
            status_code,
            error_message
        );

        let response_body = ApiResponse::<()>::error(&error_message);

        HttpResponse::build(status_code).json(response_body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        log::error!("Anyhow error: {}", error);

        if error.is::<sqlx::Error>() {
            match error.downcast::<sqlx::Error>() {
                Ok(sqlx_err) => return AppError::DatabaseError(sqlx_err),
                Err(original_error) => {
                    return AppError::InternalServerError(Some(original_error.to_string()));
                }
            }
        }

        AppError::InternalServerError(Some(error.to_string()))
    }
}

impl AppError {
    pub fn insufficient_balance(available: BigDecimal, requested: BigDecimal) -> Self {
        let shortfall = &requested - &available;
        AppError::InsufficientBalance {
            available,
            requested,
            shortfall,
        }
    }

    pub fn invalid_transition(action: &'static str, current: impl ToString) -> Self {
        AppError::InvalidStateTransition {
            action,
            current: current.to_string(),
        }
    }

    pub fn internal_server_error_message(message: impl Into<String>) -> Self {
        AppError::InternalServerError(Some(message.into()))
    }

    pub fn internal_server_error() -> Self {
        AppError::InternalServerError(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_codes_match_the_taxonomy() {
        let range_err = AppError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        };
        assert_eq!(range_err.status_code(), StatusCode::BAD_REQUEST);

        let overlap = AppError::Overlap {
            conflicting_request_id: Uuid::new_v4(),
        };
        assert_eq!(overlap.status_code(), StatusCode::CONFLICT);

        assert_eq!(
            AppError::insufficient_balance(BigDecimal::from(8), BigDecimal::from(9)).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::ConcurrencyConflict.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::invalid_transition("approve", "approved").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound("request".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::PartialFailure("attendance".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn insufficient_balance_carries_the_shortfall() {
        match AppError::insufficient_balance(BigDecimal::from(8), BigDecimal::from(9)) {
            AppError::InsufficientBalance {
                available,
                requested,
                shortfall,
            } => {
                assert_eq!(available, BigDecimal::from(8));
                assert_eq!(requested, BigDecimal::from(9));
                assert_eq!(shortfall, BigDecimal::from(1));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[actix_rt::test]
    async fn error_body_uses_the_api_envelope() {
        let err = AppError::invalid_transition("approve", "approved");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], serde_json::json!(false));
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("approve"), "got: {message}");
        assert!(message.contains("approved"), "got: {message}");
    }
}
