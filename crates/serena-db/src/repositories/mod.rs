//! Repository implementations
//!
//! This module contains concrete implementations of the repository traits
//! defined in serena-core, using sqlx for PostgreSQL access.

pub mod catalog_repo;
pub mod person_repo;
pub mod reservation_repo;

pub use catalog_repo::PgCatalogRepository;
pub use person_repo::PgPersonRepository;
pub use reservation_repo::PgReservationRepository;
