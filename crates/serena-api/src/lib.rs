//! API layer for the Serena booking backend
//!
//! HTTP handlers and DTOs for reservations, the catalog, and authentication.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

pub use dto::ApiResponse;
pub use handlers::{configure_auth, configure_catalog, configure_reservations};
