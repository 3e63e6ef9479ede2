//! Data transfer objects for the HTTP API

pub mod auth;
pub mod common;
pub mod reservation;

pub use common::ApiResponse;
