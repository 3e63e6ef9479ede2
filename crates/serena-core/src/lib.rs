//! Serena Booking Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Serena booking backend. It includes:
//!
//! - Domain models (Person, Service, ServiceVariant, Package, Reservation)
//! - Common traits for repositories and collaborators
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::{AppConfig, BookingConfig};
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
