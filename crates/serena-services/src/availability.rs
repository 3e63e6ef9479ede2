//! Availability rules
//!
//! Time-of-day and calendar rules a reservation request must satisfy before
//! the conflict detector even runs:
//! - starts may not lie in the past
//! - starts must fall on the slot grid (on the hour or half-hour by default)
//! - the whole interval must fit inside same-day business hours
//!
//! All thresholds come from [`BookingConfig`]; nothing here is hardcoded.

use serena_core::{config::BookingConfig, AppError, AppResult};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Schedule rule set built from booking configuration
#[derive(Debug, Clone, Copy)]
pub struct ScheduleRules {
    config: BookingConfig,
}

impl ScheduleRules {
    /// Create a rule set from booking configuration
    pub fn new(config: BookingConfig) -> Self {
        Self { config }
    }

    /// The configured slot granularity in minutes
    pub fn slot_minutes(&self) -> u32 {
        self.config.slot_minutes
    }

    /// The configured minimum gap between bookings in minutes
    pub fn min_gap_minutes(&self) -> i64 {
        self.config.min_gap_minutes
    }

    /// Check that a start time lies on the slot grid
    ///
    /// Seconds and sub-seconds must be zero; minutes must be a multiple of
    /// the slot granularity.
    pub fn is_on_slot_boundary(&self, t: NaiveDateTime) -> bool {
        t.second() == 0 && t.nanosecond() == 0 && t.minute() % self.config.slot_minutes == 0
    }

    /// Validate a requested start time against the clock and the slot grid
    ///
    /// `now` is passed in rather than read here so the rule is testable
    /// and callers decide which clock applies.
    pub fn validate_start(&self, start: NaiveDateTime, now: NaiveDateTime) -> AppResult<()> {
        if start < now {
            return Err(AppError::PastStartTime);
        }

        if !self.is_on_slot_boundary(start) {
            return Err(AppError::SlotNotAligned(self.config.slot_minutes));
        }

        Ok(())
    }

    /// Validate that a booked interval fits within business hours
    ///
    /// The close is measured against the start's own calendar day, so an
    /// interval spilling past midnight always fails the closing check.
    pub fn check_business_hours(&self, start: NaiveDateTime, end: NaiveDateTime) -> AppResult<()> {
        if start.hour() < self.config.open_hour {
            return Err(AppError::OutsideBusinessHours(format!(
                "Reservations must start at {} or later",
                format_hour(self.config.open_hour)
            )));
        }

        let close = start
            .date()
            .and_hms_opt(self.config.close_hour, 0, 0)
            .unwrap_or_else(|| {
                start
                    .date()
                    .and_time(NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap())
            });

        if end > close {
            return Err(AppError::OutsideBusinessHours(format!(
                "Reservations must end by {}",
                format_hour(self.config.close_hour)
            )));
        }

        Ok(())
    }
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self::new(BookingConfig::default())
    }
}

/// Format an hour of day as "9:00 AM" / "9:00 PM"
fn format_hour(hour: u32) -> String {
    let (h, suffix) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{}:00 {}", h, suffix)
}

/// Calendar week containing `date`, as a closed interval
///
/// Runs Monday 00:00:00 through Sunday 23:59:59.999, the default window
/// for the full-schedule view.
pub fn week_range_for(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let start = monday.and_time(NaiveTime::MIN);
    let end = (monday + Duration::days(7)).and_time(NaiveTime::MIN) - Duration::milliseconds(1);
    (start, end)
}

/// Calendar week containing today, in local time
pub fn current_week_range() -> (NaiveDateTime, NaiveDateTime) {
    week_range_for(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn rules() -> ScheduleRules {
        ScheduleRules::default()
    }

    #[test]
    fn test_slot_boundary() {
        let r = rules();
        assert!(r.is_on_slot_boundary(dt("2025-06-02 09:00:00")));
        assert!(r.is_on_slot_boundary(dt("2025-06-02 14:30:00")));
        assert!(!r.is_on_slot_boundary(dt("2025-06-02 09:15:00")));
        assert!(!r.is_on_slot_boundary(dt("2025-06-02 09:00:30")));
    }

    #[test]
    fn test_slot_boundary_custom_granularity() {
        let r = ScheduleRules::new(BookingConfig {
            slot_minutes: 15,
            ..BookingConfig::default()
        });
        assert!(r.is_on_slot_boundary(dt("2025-06-02 09:15:00")));
        assert!(!r.is_on_slot_boundary(dt("2025-06-02 09:10:00")));
    }

    #[test]
    fn test_past_start_rejected() {
        let r = rules();
        let now = dt("2025-06-02 12:00:00");
        let result = r.validate_start(dt("2025-06-02 11:30:00"), now);
        assert!(matches!(result, Err(AppError::PastStartTime)));
    }

    #[test]
    fn test_future_aligned_start_accepted() {
        let r = rules();
        let now = dt("2025-06-02 12:00:00");
        assert!(r.validate_start(dt("2025-06-02 14:00:00"), now).is_ok());
    }

    #[test]
    fn test_misaligned_start_rejected() {
        let r = rules();
        let now = dt("2025-06-02 12:00:00");
        let result = r.validate_start(dt("2025-06-03 09:15:00"), now);
        assert!(matches!(result, Err(AppError::SlotNotAligned(30))));
    }

    #[test]
    fn test_business_hours_too_early() {
        let r = rules();
        let result =
            r.check_business_hours(dt("2025-06-02 08:30:00"), dt("2025-06-02 09:30:00"));
        match result {
            Err(AppError::OutsideBusinessHours(msg)) => {
                assert_eq!(msg, "Reservations must start at 9:00 AM or later");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_business_hours_ends_too_late() {
        let r = rules();
        let result =
            r.check_business_hours(dt("2025-06-02 20:30:00"), dt("2025-06-02 21:30:00"));
        match result {
            Err(AppError::OutsideBusinessHours(msg)) => {
                assert_eq!(msg, "Reservations must end by 9:00 PM");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_business_hours_boundaries_allowed() {
        let r = rules();
        // first slot of the day
        assert!(r
            .check_business_hours(dt("2025-06-02 09:00:00"), dt("2025-06-02 10:00:00"))
            .is_ok());
        // interval ending exactly at close
        assert!(r
            .check_business_hours(dt("2025-06-02 20:00:00"), dt("2025-06-02 21:00:00"))
            .is_ok());
    }

    #[test]
    fn test_interval_past_midnight_rejected() {
        let r = rules();
        let result =
            r.check_business_hours(dt("2025-06-02 20:30:00"), dt("2025-06-03 00:30:00"));
        assert!(matches!(result, Err(AppError::OutsideBusinessHours(_))));
    }

    #[test]
    fn test_week_range_monday_through_sunday() {
        // 2025-06-04 is a Wednesday
        let (start, end) = week_range_for(NaiveDate::from_ymd_opt(2025, 6, 4).unwrap());
        assert_eq!(start, dt("2025-06-02 00:00:00"));
        assert_eq!(
            end,
            dt("2025-06-08 23:59:59") + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_week_range_on_monday() {
        let (start, _) = week_range_for(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(start, dt("2025-06-02 00:00:00"));
    }

    #[test]
    fn test_week_range_on_sunday() {
        let (start, end) = week_range_for(NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
        assert_eq!(start, dt("2025-06-02 00:00:00"));
        assert!(end > dt("2025-06-08 23:59:58"));
    }

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(9), "9:00 AM");
        assert_eq!(format_hour(12), "12:00 PM");
        assert_eq!(format_hour(21), "9:00 PM");
        assert_eq!(format_hour(0), "12:00 AM");
    }
}
