//! Conflict and gap detection
//!
//! A candidate interval conflicts with an existing booking of the same
//! provider when any of three clauses holds:
//! 1. the intervals overlap
//! 2. the candidate starts inside the buffer after the existing booking
//! 3. the existing booking starts inside the buffer after the candidate
//!
//! Clauses 2 and 3 make the minimum gap symmetric; back-to-back bookings
//! (end of one equal to start of the next) fail both buffer clauses when
//! the gap is positive.

use serena_core::models::BookedSlot;
use chrono::{Duration, NaiveDateTime};

/// Check a candidate interval against one existing booking
pub fn conflicts_with(
    existing: &BookedSlot,
    start: NaiveDateTime,
    end: NaiveDateTime,
    gap: Duration,
) -> bool {
    // Clause 1: plain overlap
    if existing.start_time < end && existing.end_time > start {
        return true;
    }

    // Clause 2: candidate starts too soon after the existing booking
    if start >= existing.end_time && start < existing.end_time + gap {
        return true;
    }

    // Clause 3: existing booking starts too soon after the candidate
    if existing.start_time >= end && existing.start_time < end + gap {
        return true;
    }

    false
}

/// Find the first booking that conflicts with a candidate interval
///
/// `exclude` skips the reservation being rescheduled so it never
/// conflicts with itself.
pub fn find_gap_conflict(
    slots: &[BookedSlot],
    start: NaiveDateTime,
    end: NaiveDateTime,
    gap_minutes: i64,
    exclude: Option<i64>,
) -> Option<BookedSlot> {
    let gap = Duration::minutes(gap_minutes);

    slots
        .iter()
        .filter(|s| exclude != Some(s.reservation_id))
        .find(|s| conflicts_with(s, start, end, gap))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn slot(id: i64, start: &str, end: &str) -> BookedSlot {
        BookedSlot {
            reservation_id: id,
            start_time: dt(start),
            end_time: dt(end),
        }
    }

    const GAP: i64 = 60;

    #[test]
    fn test_plain_overlap() {
        let existing = slot(1, "2025-06-02 10:00:00", "2025-06-02 11:00:00");
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 10:30:00"),
            dt("2025-06-02 11:30:00"),
            GAP,
            None,
        );
        assert_eq!(hit.map(|s| s.reservation_id), Some(1));
    }

    #[test]
    fn test_contained_interval_overlaps() {
        let existing = slot(1, "2025-06-02 10:00:00", "2025-06-02 12:00:00");
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 10:30:00"),
            dt("2025-06-02 11:00:00"),
            GAP,
            None,
        );
        assert!(hit.is_some());
    }

    #[test]
    fn test_back_to_back_violates_gap() {
        // Existing 10:00-11:00, candidate starting exactly at 11:00
        let existing = slot(1, "2025-06-02 10:00:00", "2025-06-02 11:00:00");
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 11:00:00"),
            dt("2025-06-02 12:00:00"),
            GAP,
            None,
        );
        assert!(hit.is_some());
    }

    #[test]
    fn test_insufficient_gap_after_existing() {
        let existing = slot(1, "2025-06-02 10:00:00", "2025-06-02 11:00:00");
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 11:30:00"),
            dt("2025-06-02 12:30:00"),
            GAP,
            None,
        );
        assert!(hit.is_some());
    }

    #[test]
    fn test_exact_gap_allowed() {
        // Existing ends 11:00, candidate starts 12:00 with a 60 minute gap
        let existing = slot(1, "2025-06-02 10:00:00", "2025-06-02 11:00:00");
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 12:00:00"),
            dt("2025-06-02 13:00:00"),
            GAP,
            None,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_insufficient_gap_before_existing() {
        // Candidate ends 10:30, existing starts 11:00
        let existing = slot(1, "2025-06-02 11:00:00", "2025-06-02 12:00:00");
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 09:30:00"),
            dt("2025-06-02 10:30:00"),
            GAP,
            None,
        );
        assert!(hit.is_some());
    }

    #[test]
    fn test_exact_gap_before_existing_allowed() {
        let existing = slot(1, "2025-06-02 11:00:00", "2025-06-02 12:00:00");
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 09:00:00"),
            dt("2025-06-02 10:00:00"),
            GAP,
            None,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_zero_gap_permits_back_to_back() {
        let existing = slot(1, "2025-06-02 10:00:00", "2025-06-02 11:00:00");
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 11:00:00"),
            dt("2025-06-02 12:00:00"),
            0,
            None,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_exclude_skips_self() {
        let existing = slot(5, "2025-06-02 10:00:00", "2025-06-02 11:00:00");
        // Rescheduling reservation 5 onto its own old interval
        let hit = find_gap_conflict(
            &[existing],
            dt("2025-06-02 10:00:00"),
            dt("2025-06-02 11:00:00"),
            GAP,
            Some(5),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_first_conflict_reported() {
        let slots = vec![
            slot(1, "2025-06-02 09:00:00", "2025-06-02 10:00:00"),
            slot(2, "2025-06-02 10:30:00", "2025-06-02 11:30:00"),
        ];
        let hit = find_gap_conflict(
            &slots,
            dt("2025-06-02 10:30:00"),
            dt("2025-06-02 11:00:00"),
            GAP,
            None,
        );
        assert!(hit.is_some());
    }

    #[test]
    fn test_distant_bookings_no_conflict() {
        let slots = vec![
            slot(1, "2025-06-02 09:00:00", "2025-06-02 10:00:00"),
            slot(2, "2025-06-02 15:00:00", "2025-06-02 16:00:00"),
        ];
        let hit = find_gap_conflict(
            &slots,
            dt("2025-06-02 12:00:00"),
            dt("2025-06-02 13:00:00"),
            GAP,
            None,
        );
        assert!(hit.is_none());
    }
}
