//! Common traits for repositories and collaborators
//!
//! Defines abstractions for database access and the external interfaces the
//! scheduling engine depends on (catalog lookups, notification dispatch).

use crate::error::AppError;
use crate::models::{
    Person, PersonSummary, Reservation, ReservationDetail, ReservationStatus,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// Filter shape for reservation list queries
///
/// Mirrors the where-clause the query layer supports: entity references,
/// status, and a start-time window. The service filter resolves through the
/// variant join since the service is not stored on the reservation row.
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub user_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub service_id: Option<i64>,
    pub status: Option<ReservationStatus>,
    /// Restrict to any of these statuses (public listing uses confirmed/completed)
    pub statuses: Option<Vec<ReservationStatus>>,
    pub start_from: Option<NaiveDateTime>,
    pub start_until: Option<NaiveDateTime>,
    /// Most-recent-first ordering (my-reservations); default is ascending
    pub order_desc: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ReservationFilter {
    /// Filter for pending reservations only
    pub fn pending() -> Self {
        Self {
            status: Some(ReservationStatus::Pending),
            ..Self::default()
        }
    }
}

/// Pending reservation count for one provider
#[derive(Debug, Clone, Serialize)]
pub struct PendingCount {
    pub provider_id: i64,
    pub count: i64,
    pub provider: PersonSummary,
}

/// Reservation repository trait with query-layer methods
#[async_trait]
pub trait ReservationRepository: Repository<Reservation, i64> {
    /// Find a reservation joined with customer/provider/variant/service
    async fn find_detail(&self, id: i64) -> Result<Option<ReservationDetail>, AppError>;

    /// List joined reservations matching a filter
    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<ReservationDetail>, AppError>;

    /// Count pending reservations grouped by provider
    async fn pending_counts_by_provider(&self) -> Result<Vec<PendingCount>, AppError>;
}

/// Catalog repository trait (read-only from the scheduler's perspective)
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// List active services with their active variants (schedule views)
    async fn list_active_with_variants(
        &self,
    ) -> Result<Vec<crate::models::ServiceWithVariants>, AppError>;

    /// List purchasable packages with their item entitlements
    async fn list_active_packages(
        &self,
    ) -> Result<Vec<crate::models::PackageWithItems>, AppError>;
}

/// Person repository trait
#[async_trait]
pub trait PersonRepository: Repository<Person, i64> {
    /// Find person by email (login)
    async fn find_by_email(&self, email: &str) -> Result<Option<Person>, AppError>;

    /// List all active providers
    async fn list_providers(&self) -> Result<Vec<Person>, AppError>;
}

/// Notification sender collaborator
///
/// All methods are best-effort: implementations log failures and never
/// return them, so a notification problem can never fail or roll back a
/// booking transition. Dispatch happens after the state change commits.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// A customer created a pending reservation request; alert the admins.
    async fn pending_reservation_created(&self, reservation: &ReservationDetail);

    /// A pending reservation was approved; tell the customer.
    async fn reservation_approved(&self, reservation: &ReservationDetail);

    /// A pending reservation was rejected; tell the customer.
    async fn reservation_rejected(&self, reservation: &ReservationDetail, reason: Option<&str>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_filter() {
        let f = ReservationFilter::pending();
        assert_eq!(f.status, Some(ReservationStatus::Pending));
        assert!(f.provider_id.is_none());
        assert!(!f.order_desc);
    }
}
