//! Business logic services for the Serena booking backend
//!
//! This crate contains the scheduling engine that sits between the HTTP
//! handlers and the repositories:
//!
//! - `ScheduleRules` - clock, slot-grid, and business-hour validation
//! - `conflict` - the overlap and minimum-gap detector
//! - `ReservationManager` - transactional reservation lifecycle
//! - `LogNotifier` - default best-effort notification sink
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - The rule set and conflict detector are pure functions over plain data
//! - The manager owns the pool and wraps every mutation in a transaction
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError

pub mod availability;
pub mod conflict;
pub mod notifications;
pub mod scheduling;

pub use availability::{current_week_range, week_range_for, ScheduleRules};
pub use conflict::{conflicts_with, find_gap_conflict};
pub use notifications::LogNotifier;
pub use scheduling::{NewReservation, ReservationManager, ReservationPatch};
