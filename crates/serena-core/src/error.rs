//! Unified error handling for Serena Booking
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Authentication Errors ====================
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    // ==================== Scheduling Rule Errors ====================
    #[error("Cannot create reservations for past dates or times")]
    PastStartTime,

    #[error("Reservation time must fall on a {0}-minute slot boundary (e.g., 9:00 or 9:30)")]
    SlotNotAligned(u32),

    #[error("{0}")]
    OutsideBusinessHours(String),

    #[error("There must be at least {0} minutes between reservations for this provider")]
    GapConflict(i64),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Service variant is not currently available: {0}")]
    VariantUnavailable(String),

    // ==================== Business Lookup Errors ====================
    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("Service variant not found: {0}")]
    VariantNotFound(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request: input and booking-rule failures
            AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::MissingField(_)
            | AppError::PastStartTime
            | AppError::SlotNotAligned(_)
            | AppError::OutsideBusinessHours(_)
            | AppError::GapConflict(_)
            | AppError::InvalidTransition(_)
            | AppError::VariantUnavailable(_) => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::InvalidCredentials | AppError::InvalidToken(_) | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            AppError::Forbidden | AppError::Unauthorized(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::ReservationNotFound(_)
            | AppError::VariantNotFound(_)
            | AppError::PersonNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Conflict(_) | AppError::AlreadyExists(_) => StatusCode::CONFLICT,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::TokenExpired => "token_expired",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::PasswordHash(_) => "password_error",
            AppError::PastStartTime => "past_start_time",
            AppError::SlotNotAligned(_) => "slot_not_aligned",
            AppError::OutsideBusinessHours(_) => "outside_business_hours",
            AppError::GapConflict(_) => "gap_conflict",
            AppError::InvalidTransition(_) => "invalid_transition",
            AppError::VariantUnavailable(_) => "variant_unavailable",
            AppError::ReservationNotFound(_) => "reservation_not_found",
            AppError::VariantNotFound(_) => "variant_not_found",
            AppError::PersonNotFound(_) => "person_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::ReservationNotFound("123".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::PastStartTime.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::SlotNotAligned(30).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::GapConflict(60).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::VariantUnavailable("5".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::InvalidCredentials.error_code(),
            "invalid_credentials"
        );
        assert_eq!(AppError::GapConflict(60).error_code(), "gap_conflict");
        assert_eq!(AppError::SlotNotAligned(30).error_code(), "slot_not_aligned");
    }

    #[test]
    fn test_rule_error_messages_identify_rule() {
        let msg = AppError::GapConflict(60).to_string();
        assert!(msg.contains("60 minutes"));

        let msg = AppError::SlotNotAligned(30).to_string();
        assert!(msg.contains("30-minute"));
    }
}
