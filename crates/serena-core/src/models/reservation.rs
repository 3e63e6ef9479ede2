//! Reservation models
//!
//! The central entity of the scheduling engine, with its status lifecycle:
//! pending -> confirmed (approval) or cancelled (rejection); any active
//! state -> cancelled / completed / no_show via administrative update.
//! Terminal states never transition back to pending.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::person::PersonSummary;
use rust_decimal::Decimal;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Customer-requested booking awaiting staff approval
    #[default]
    Pending,
    /// Approved or staff-created booking
    Confirmed,
    /// Cancelled or rejected booking
    Cancelled,
    /// Service was delivered
    Completed,
    /// Customer did not show up
    NoShow,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
            ReservationStatus::Completed => write!(f, "completed"),
            ReservationStatus::NoShow => write!(f, "no_show"),
        }
    }
}

impl ReservationStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            "completed" => Some(ReservationStatus::Completed),
            "no_show" => Some(ReservationStatus::NoShow),
            _ => None,
        }
    }

    /// An active reservation blocks the provider's time.
    ///
    /// Cancelled and no-show bookings free the slot and are ignored by the
    /// conflict detector.
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            ReservationStatus::Cancelled | ReservationStatus::NoShow
        )
    }

    /// Terminal states admit no transition back to pending
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Cancelled | ReservationStatus::Completed | ReservationStatus::NoShow
        )
    }
}

/// Reservation entity
///
/// `end_time` is always derived from `start_time` plus the variant's
/// duration; it is never settable independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier
    pub reservation_id: i64,

    /// Booking customer
    pub user_id: i64,

    /// Booked provider
    pub provider_id: i64,

    /// Booked service variant
    pub variant_id: i64,

    /// Pre-purchased package credit paying for this booking, if any
    pub user_package_item_id: Option<i64>,

    /// Start of the booked interval (local wall clock)
    pub start_time: NaiveDateTime,

    /// End of the booked interval (derived from variant duration)
    pub end_time: NaiveDateTime,

    /// Current status
    pub status: ReservationStatus,

    /// Free-text notes; rejection reasons are appended here
    pub notes: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

/// Minimal projection of a booking used by the conflict detector
///
/// Only the interval and identity matter for gap checking; the caller is
/// responsible for fetching active-status rows only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedSlot {
    pub reservation_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// Variant projection inside a joined reservation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSummary {
    pub variant_id: i64,
    pub service_id: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub service: ServiceSummary,
}

/// Service projection inside a joined reservation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub service_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A reservation joined with customer, provider, and catalog data
///
/// Returned by the lifecycle manager and the query layer for caller
/// convenience; the public endpoint serves a sanitized projection instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,

    pub customer: PersonSummary,
    pub provider: PersonSummary,
    pub variant: VariantSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
            ReservationStatus::Completed,
            ReservationStatus::NoShow,
        ] {
            assert_eq!(ReservationStatus::from_str(&s.to_string()), Some(s));
        }
        assert_eq!(ReservationStatus::from_str("unknown"), None);
    }

    #[test]
    fn test_active_statuses() {
        assert!(ReservationStatus::Pending.is_active());
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(ReservationStatus::Completed.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
        assert!(!ReservationStatus::NoShow.is_active());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ReservationStatus::Pending.is_terminal());
        assert!(!ReservationStatus::Confirmed.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(ReservationStatus::Completed.is_terminal());
        assert!(ReservationStatus::NoShow.is_terminal());
    }
}
