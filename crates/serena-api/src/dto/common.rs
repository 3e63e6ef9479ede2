//! Common DTOs used across the API

use serena_core::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    /// Create a success response with data and message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a client-supplied timestamp
///
/// Accepts ISO 8601 with or without seconds or fractional seconds, and a
/// space in place of the `T`. A trailing `Z` is tolerated and stripped;
/// times are treated as local wall clock either way.
pub fn parse_datetime(field: &str, value: &str) -> AppResult<NaiveDateTime> {
    let trimmed = value.trim().trim_end_matches('Z');

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }

    Err(AppError::InvalidInput(format!(
        "Invalid {} value: '{}'",
        field, value
    )))
}

/// Parse a client-supplied calendar date
pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!("Invalid {} value: '{}'", field, value))
    })
}

/// Normalize a date to the start of its day
pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Normalize a date to the end of its day (23:59:59.999)
pub fn day_end(date: NaiveDate) -> NaiveDateTime {
    (date + chrono::Duration::days(1)).and_time(NaiveTime::MIN) - chrono::Duration::milliseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response() {
        let resp = ApiResponse::success("test");
        assert_eq!(resp.data, "test");
        assert!(resp.message.is_none());

        let resp = ApiResponse::with_message("data", "success");
        assert_eq!(resp.message, Some("success".to_string()));
    }

    #[test]
    fn test_parse_datetime_formats() {
        for value in [
            "2030-01-10T10:00:00",
            "2030-01-10T10:00",
            "2030-01-10 10:00:00",
            "2030-01-10T10:00:00.000Z",
        ] {
            let dt = parse_datetime("start_time", value).unwrap();
            assert_eq!(format!("{}", dt.format("%Y-%m-%d %H:%M")), "2030-01-10 10:00");
        }
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        let result = parse_datetime("start_time", "next tuesday");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_day_boundaries() {
        let date = parse_date("start_date", "2030-01-10").unwrap();
        let start = day_start(date);
        let end = day_end(date);

        assert_eq!(format!("{}", start), "2030-01-10 00:00:00");
        assert!(end > date.and_hms_opt(23, 59, 58).unwrap());
        assert!(end < (date + chrono::Duration::days(1)).and_time(NaiveTime::MIN));
    }
}
