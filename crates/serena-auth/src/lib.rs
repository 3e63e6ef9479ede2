//! Authentication and authorization for the Serena booking backend
//!
//! This crate provides JWT-based authentication, password hashing with Argon2,
//! and Actix-web request extractors for role-based access control.
//!
//! # Features
//!
//! - JWT token creation and validation
//! - Argon2 password hashing and verification
//! - Request extractors for authenticated persons
//! - Role-based access control (customer / provider / admin)

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AdminUser, AuthenticatedUser, StaffUser};
pub use password::PasswordService;
