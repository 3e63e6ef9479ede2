//! Catalog repository implementation
//!
//! Read-only access to services and their variants. The scheduler resolves
//! variants through here when computing reservation end times.

use serena_core::{
    models::{
        Package, PackageItem, PackageWithItems, Service, ServiceVariant, ServiceWithVariants,
        VariantWithService,
    },
    traits::CatalogRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of CatalogRepository
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Create a new catalog repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a variant together with its parent service's active flag
    ///
    /// Takes any executor so the scheduler can resolve within its own
    /// transaction and see rows consistently with its conflict reads.
    pub async fn fetch_variant_with_service<'e, E>(
        executor: E,
        variant_id: i64,
    ) -> AppResult<Option<VariantWithService>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        debug!("Resolving variant with parent service: {}", variant_id);

        let result = sqlx::query_as::<sqlx::Postgres, VariantServiceRow>(
            r#"
            SELECT
                v.variant_id, v.service_id, v.name, v.duration_minutes,
                v.price, v.is_active,
                s.is_active AS service_is_active
            FROM service_variants v
            JOIN services s ON s.service_id = v.service_id
            WHERE v.variant_id = $1
            "#,
        )
        .bind(variant_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            error!("Database error resolving variant {}: {}", variant_id, e);
            AppError::Database(format!("Failed to resolve variant: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip(self))]
    async fn list_active_with_variants(&self) -> AppResult<Vec<ServiceWithVariants>> {
        debug!("Listing active services with variants");

        let services = sqlx::query_as::<sqlx::Postgres, ServiceRow>(
            r#"
            SELECT service_id, name, description, is_active
            FROM services
            WHERE is_active = TRUE
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing services: {}", e);
            AppError::Database(format!("Failed to fetch services: {}", e))
        })?;

        let variants = sqlx::query_as::<sqlx::Postgres, VariantRow>(
            r#"
            SELECT v.variant_id, v.service_id, v.name, v.duration_minutes,
                   v.price, v.is_active, v.created_at, v.updated_at
            FROM service_variants v
            JOIN services s ON s.service_id = v.service_id
            WHERE v.is_active = TRUE AND s.is_active = TRUE
            ORDER BY v.duration_minutes ASC, v.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing variants: {}", e);
            AppError::Database(format!("Failed to fetch variants: {}", e))
        })?;

        let mut out: Vec<ServiceWithVariants> = services
            .into_iter()
            .map(|s| ServiceWithVariants {
                service: s.into(),
                variants: Vec::new(),
            })
            .collect();

        for v in variants {
            if let Some(entry) = out
                .iter_mut()
                .find(|e| e.service.service_id == v.service_id)
            {
                entry.variants.push(v.into());
            }
        }

        Ok(out)
    }

    #[instrument(skip(self))]
    async fn list_active_packages(&self) -> AppResult<Vec<PackageWithItems>> {
        debug!("Listing active packages");

        let packages = sqlx::query_as::<sqlx::Postgres, PackageRow>(
            r#"
            SELECT package_id, name, description, price, is_active
            FROM packages
            WHERE is_active = TRUE
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing packages: {}", e);
            AppError::Database(format!("Failed to fetch packages: {}", e))
        })?;

        let items = sqlx::query_as::<sqlx::Postgres, PackageItemRow>(
            r#"
            SELECT i.item_id, i.package_id, i.variant_id, i.quantity
            FROM package_items i
            JOIN packages p ON p.package_id = i.package_id
            WHERE p.is_active = TRUE
            ORDER BY i.item_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing package items: {}", e);
            AppError::Database(format!("Failed to fetch package items: {}", e))
        })?;

        let mut out: Vec<PackageWithItems> = packages
            .into_iter()
            .map(|p| PackageWithItems {
                package: p.into(),
                items: Vec::new(),
            })
            .collect();

        for item in items {
            if let Some(entry) = out
                .iter_mut()
                .find(|e| e.package.package_id == item.package_id)
            {
                entry.items.push(item.into());
            }
        }

        Ok(out)
    }
}

/// Helper struct for mapping service rows
#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    service_id: i64,
    name: String,
    description: Option<String>,
    is_active: bool,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            service_id: row.service_id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

/// Helper struct for mapping variant rows
#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    variant_id: i64,
    service_id: i64,
    name: String,
    duration_minutes: i32,
    price: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<VariantRow> for ServiceVariant {
    fn from(row: VariantRow) -> Self {
        Self {
            variant_id: row.variant_id,
            service_id: row.service_id,
            name: row.name,
            duration_minutes: row.duration_minutes,
            price: row.price,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Helper struct for mapping package rows
#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    package_id: i64,
    name: String,
    description: Option<String>,
    price: Option<Decimal>,
    is_active: bool,
}

impl From<PackageRow> for Package {
    fn from(row: PackageRow) -> Self {
        Self {
            package_id: row.package_id,
            name: row.name,
            description: row.description,
            price: row.price,
            is_active: row.is_active,
        }
    }
}

/// Helper struct for mapping package item rows
#[derive(Debug, sqlx::FromRow)]
struct PackageItemRow {
    item_id: i64,
    package_id: i64,
    variant_id: i64,
    quantity: i32,
}

impl From<PackageItemRow> for PackageItem {
    fn from(row: PackageItemRow) -> Self {
        Self {
            item_id: row.item_id,
            package_id: row.package_id,
            variant_id: row.variant_id,
            quantity: row.quantity,
        }
    }
}

/// Helper struct for mapping joined variant rows
#[derive(Debug, sqlx::FromRow)]
struct VariantServiceRow {
    variant_id: i64,
    service_id: i64,
    name: String,
    duration_minutes: i32,
    price: Decimal,
    is_active: bool,
    service_is_active: bool,
}

impl From<VariantServiceRow> for VariantWithService {
    fn from(row: VariantServiceRow) -> Self {
        Self {
            variant_id: row.variant_id,
            service_id: row.service_id,
            name: row.name,
            duration_minutes: row.duration_minutes,
            price: row.price,
            is_active: row.is_active,
            service_is_active: row.service_is_active,
        }
    }
}
