//! HTTP request handlers

pub mod auth;
pub mod catalog;
pub mod reservation;

pub use auth::configure as configure_auth;
pub use catalog::configure as configure_catalog;
pub use reservation::configure as configure_reservations;
