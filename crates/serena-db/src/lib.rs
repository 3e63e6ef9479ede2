//! Serena Booking Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the booking system. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for persons, catalog, and reservations
//! - Filtered joined queries for the reservation reporting layer

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use serena_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
