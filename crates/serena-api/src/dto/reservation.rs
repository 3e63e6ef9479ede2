//! Reservation DTOs
//!
//! Request and response types for the reservation endpoints. Timestamps
//! travel as strings and are parsed with [`super::common::parse_datetime`]
//! so handlers surface a 400 with the offending field named instead of a
//! framework deserialization error.

use super::common::{day_end, day_start, parse_date, parse_datetime};
use serena_core::{
    models::{PersonSummary, ReservationDetail, ReservationStatus, VariantSummary},
    traits::ReservationFilter,
    AppError, AppResult,
};
use serena_services::{current_week_range, NewReservation, ReservationPatch};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create reservation request
///
/// The staff route requires `user_id`; the customer self-service route
/// ignores it and books for the authenticated caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservationRequest {
    /// Booking customer (staff route only)
    pub user_id: Option<i64>,

    /// Booked provider
    pub provider_id: i64,

    /// Booked service variant
    pub variant_id: i64,

    /// Requested start, local wall clock
    #[validate(length(min = 1, message = "start_time is required"))]
    pub start_time: String,

    /// Pre-purchased package credit paying for this booking
    pub user_package_item_id: Option<i64>,

    /// Free-text notes
    #[validate(length(max = 2000, message = "Notes are limited to 2000 characters"))]
    pub notes: Option<String>,
}

impl CreateReservationRequest {
    /// Convert into an engine request for the given customer and status
    pub fn into_new_reservation(
        self,
        user_id: i64,
        status: ReservationStatus,
    ) -> AppResult<NewReservation> {
        let start_time = parse_datetime("start_time", &self.start_time)?;

        Ok(NewReservation {
            user_id,
            provider_id: self.provider_id,
            variant_id: self.variant_id,
            user_package_item_id: self.user_package_item_id,
            start_time,
            notes: self.notes,
            status,
        })
    }
}

/// Update reservation request (partial patch)
///
/// Omitted and null fields keep their stored values; notes and the
/// package credit cannot be cleared through this request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReservationRequest {
    pub provider_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub user_package_item_id: Option<i64>,
    pub start_time: Option<String>,
    pub status: Option<String>,
    #[validate(length(max = 2000, message = "Notes are limited to 2000 characters"))]
    pub notes: Option<String>,
}

impl UpdateReservationRequest {
    /// Convert into an engine patch, parsing timestamp and status
    pub fn into_patch(self) -> AppResult<ReservationPatch> {
        let start_time = match &self.start_time {
            Some(s) => Some(parse_datetime("start_time", s)?),
            None => None,
        };

        let status = match &self.status {
            Some(s) => Some(ReservationStatus::from_str(s).ok_or_else(|| {
                AppError::InvalidInput(format!("Invalid status value: '{}'", s))
            })?),
            None => None,
        };

        Ok(ReservationPatch {
            provider_id: self.provider_id,
            variant_id: self.variant_id,
            user_package_item_id: self.user_package_item_id,
            start_time,
            status,
            notes: self.notes,
        })
    }
}

/// Reject reservation request
#[derive(Debug, Clone, Deserialize)]
pub struct RejectReservationRequest {
    /// Optional reason, appended to the reservation notes
    pub reason: Option<String>,
}

/// Filtered list query parameters
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReservationListQuery {
    pub user_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub service_id: Option<i64>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ReservationListQuery {
    /// Convert into a repository filter
    pub fn into_filter(self) -> AppResult<ReservationFilter> {
        let status = match &self.status {
            Some(s) => Some(ReservationStatus::from_str(s).ok_or_else(|| {
                AppError::InvalidInput(format!("Invalid status value: '{}'", s))
            })?),
            None => None,
        };

        Ok(ReservationFilter {
            user_id: self.user_id,
            provider_id: self.provider_id,
            variant_id: self.variant_id,
            service_id: self.service_id,
            status,
            limit: self.limit,
            offset: self.offset,
            ..ReservationFilter::default()
        })
    }
}

/// Date-range query parameters for the schedule views
///
/// When both dates are absent the window defaults to the current week,
/// Monday through Sunday in local server time. Explicit dates are
/// normalized to day boundaries.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub service_id: Option<i64>,
}

impl DateRangeQuery {
    /// Resolve the effective window
    pub fn window(&self) -> AppResult<(NaiveDateTime, NaiveDateTime)> {
        let (default_start, default_end) = current_week_range();

        let start = match &self.start_date {
            Some(s) => day_start(parse_date("start_date", s)?),
            None => default_start,
        };
        let end = match &self.end_date {
            Some(s) => day_end(parse_date("end_date", s)?),
            None => default_end,
        };

        Ok((start, end))
    }

    /// Convert into a repository filter over the resolved window
    pub fn into_filter(self) -> AppResult<ReservationFilter> {
        let (start, end) = self.window()?;

        Ok(ReservationFilter {
            user_id: self.user_id,
            provider_id: self.provider_id,
            variant_id: self.variant_id,
            service_id: self.service_id,
            start_from: Some(start),
            start_until: Some(end),
            ..ReservationFilter::default()
        })
    }
}

/// Sanitized reservation for anonymous consumption
///
/// No customer identity, no notes, no package-credit linkage.
#[derive(Debug, Clone, Serialize)]
pub struct PublicReservation {
    pub reservation_id: i64,
    pub provider: PersonSummary,
    pub variant: VariantSummary,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: ReservationStatus,
}

impl From<ReservationDetail> for PublicReservation {
    fn from(d: ReservationDetail) -> Self {
        Self {
            reservation_id: d.reservation.reservation_id,
            provider: d.provider,
            variant: d.variant,
            start_time: d.reservation.start_time,
            end_time: d.reservation.end_time,
            status: d.reservation.status,
        }
    }
}
