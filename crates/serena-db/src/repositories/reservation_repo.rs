//! Reservation repository implementation
//!
//! Provides PostgreSQL-backed storage for reservations with the joined,
//! filtered queries the reporting layer needs. Uses runtime queries (not
//! compile-time macros) to avoid requiring a database connection at build
//! time.

use serena_core::{
    models::{
        PersonSummary, Reservation, ReservationDetail, ReservationStatus, ServiceSummary,
        VariantSummary,
    },
    traits::{PendingCount, Repository, ReservationFilter, ReservationRepository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// Default page size when a list query supplies no explicit limit
const DEFAULT_LIST_LIMIT: i64 = 500;

/// PostgreSQL implementation of ReservationRepository
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new reservation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse reservation status from string
    fn parse_status(s: &str) -> ReservationStatus {
        ReservationStatus::from_str(s).unwrap_or(ReservationStatus::Pending)
    }
}

const RESERVATION_COLUMNS: &str = r#"
    reservation_id, user_id, provider_id, variant_id, user_package_item_id,
    start_time, end_time, status, notes, created_at, updated_at
"#;

const DETAIL_SELECT: &str = r#"
    SELECT
        r.reservation_id, r.user_id, r.provider_id, r.variant_id,
        r.user_package_item_id, r.start_time, r.end_time, r.status, r.notes,
        r.created_at, r.updated_at,
        cu.first_name AS customer_first_name,
        cu.last_name  AS customer_last_name,
        cu.title      AS customer_title,
        pr.first_name AS provider_first_name,
        pr.last_name  AS provider_last_name,
        pr.title      AS provider_title,
        v.name             AS variant_name,
        v.service_id       AS variant_service_id,
        v.duration_minutes AS variant_duration_minutes,
        v.price            AS variant_price,
        s.name        AS service_name,
        s.description AS service_description
    FROM reservations r
    JOIN persons cu          ON cu.person_id = r.user_id
    JOIN persons pr          ON pr.person_id = r.provider_id
    JOIN service_variants v  ON v.variant_id = r.variant_id
    JOIN services s          ON s.service_id = v.service_id
"#;

#[async_trait]
impl Repository<Reservation, i64> for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Reservation>> {
        debug!("Finding reservation by id: {}", id);

        let query = format!(
            "SELECT {} FROM reservations WHERE reservation_id = $1",
            RESERVATION_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding reservation {}: {}", id, e);
                AppError::Database(format!("Failed to find reservation: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Reservation>> {
        debug!(
            "Finding all reservations with limit {} offset {}",
            limit, offset
        );

        let query = format!(
            "SELECT {} FROM reservations ORDER BY start_time ASC LIMIT $1 OFFSET $2",
            RESERVATION_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding reservations: {}", e);
                AppError::Database(format!("Failed to fetch reservations: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting reservations: {}", e);
                AppError::Database(format!("Failed to count reservations: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        debug!("Deleting reservation: {}", id);

        let result = sqlx::query("DELETE FROM reservations WHERE reservation_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting reservation {}: {}", id, e);
                AppError::Database(format!("Failed to delete reservation: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find_detail(&self, id: i64) -> AppResult<Option<ReservationDetail>> {
        debug!("Finding joined reservation by id: {}", id);

        let query = format!("{} WHERE r.reservation_id = $1", DETAIL_SELECT);

        let result = sqlx::query_as::<sqlx::Postgres, DetailRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding reservation detail {}: {}", id, e);
                AppError::Database(format!("Failed to find reservation: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &ReservationFilter) -> AppResult<Vec<ReservationDetail>> {
        debug!(?filter, "Listing reservations");

        let order = if filter.order_desc { "DESC" } else { "ASC" };
        let query = format!(
            r#"{}
            WHERE ($1::BIGINT IS NULL OR r.user_id = $1)
              AND ($2::BIGINT IS NULL OR r.provider_id = $2)
              AND ($3::BIGINT IS NULL OR r.variant_id = $3)
              AND ($4::BIGINT IS NULL OR v.service_id = $4)
              AND ($5::TEXT IS NULL OR r.status = $5)
              AND ($6::TEXT[] IS NULL OR r.status = ANY($6))
              AND ($7::TIMESTAMP IS NULL OR r.start_time >= $7)
              AND ($8::TIMESTAMP IS NULL OR r.start_time <= $8)
            ORDER BY r.start_time {}
            LIMIT $9 OFFSET $10
            "#,
            DETAIL_SELECT, order
        );

        let status = filter.status.map(|s| s.to_string());
        let statuses: Option<Vec<String>> = filter
            .statuses
            .as_ref()
            .map(|v| v.iter().map(|s| s.to_string()).collect());

        let rows = sqlx::query_as::<sqlx::Postgres, DetailRow>(&query)
            .bind(filter.user_id)
            .bind(filter.provider_id)
            .bind(filter.variant_id)
            .bind(filter.service_id)
            .bind(status)
            .bind(statuses)
            .bind(filter.start_from)
            .bind(filter.start_until)
            .bind(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .bind(filter.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing reservations: {}", e);
                AppError::Database(format!("Failed to fetch reservations: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn pending_counts_by_provider(&self) -> AppResult<Vec<PendingCount>> {
        debug!("Counting pending reservations grouped by provider");

        let rows = sqlx::query_as::<sqlx::Postgres, PendingCountRow>(
            r#"
            SELECT
                r.provider_id,
                COUNT(*)      AS pending_count,
                pr.first_name AS provider_first_name,
                pr.last_name  AS provider_last_name,
                pr.title      AS provider_title
            FROM reservations r
            JOIN persons pr ON pr.person_id = r.provider_id
            WHERE r.status = 'pending'
            GROUP BY r.provider_id, pr.first_name, pr.last_name, pr.title
            ORDER BY pending_count DESC, r.provider_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting pending reservations: {}", e);
            AppError::Database(format!("Failed to count pending reservations: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping plain reservation rows
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    reservation_id: i64,
    user_id: i64,
    provider_id: i64,
    variant_id: i64,
    user_package_item_id: Option<i64>,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Self {
            reservation_id: row.reservation_id,
            user_id: row.user_id,
            provider_id: row.provider_id,
            variant_id: row.variant_id,
            user_package_item_id: row.user_package_item_id,
            start_time: row.start_time,
            end_time: row.end_time,
            status: PgReservationRepository::parse_status(&row.status),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Helper struct for mapping joined reservation rows
#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    reservation_id: i64,
    user_id: i64,
    provider_id: i64,
    variant_id: i64,
    user_package_item_id: Option<i64>,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    customer_first_name: String,
    customer_last_name: String,
    customer_title: Option<String>,
    provider_first_name: String,
    provider_last_name: String,
    provider_title: Option<String>,
    variant_name: String,
    variant_service_id: i64,
    variant_duration_minutes: i32,
    variant_price: Decimal,
    service_name: String,
    service_description: Option<String>,
}

impl From<DetailRow> for ReservationDetail {
    fn from(row: DetailRow) -> Self {
        Self {
            reservation: Reservation {
                reservation_id: row.reservation_id,
                user_id: row.user_id,
                provider_id: row.provider_id,
                variant_id: row.variant_id,
                user_package_item_id: row.user_package_item_id,
                start_time: row.start_time,
                end_time: row.end_time,
                status: PgReservationRepository::parse_status(&row.status),
                notes: row.notes,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            customer: PersonSummary {
                person_id: row.user_id,
                first_name: row.customer_first_name,
                last_name: row.customer_last_name,
                title: row.customer_title,
            },
            provider: PersonSummary {
                person_id: row.provider_id,
                first_name: row.provider_first_name,
                last_name: row.provider_last_name,
                title: row.provider_title,
            },
            variant: VariantSummary {
                variant_id: row.variant_id,
                service_id: row.variant_service_id,
                name: row.variant_name,
                duration_minutes: row.variant_duration_minutes,
                price: row.variant_price,
                service: ServiceSummary {
                    service_id: row.variant_service_id,
                    name: row.service_name,
                    description: row.service_description,
                },
            },
        }
    }
}

/// Helper struct for mapping pending count rows
#[derive(Debug, sqlx::FromRow)]
struct PendingCountRow {
    provider_id: i64,
    pending_count: i64,
    provider_first_name: String,
    provider_last_name: String,
    provider_title: Option<String>,
}

impl From<PendingCountRow> for PendingCount {
    fn from(row: PendingCountRow) -> Self {
        Self {
            provider_id: row.provider_id,
            count: row.pending_count,
            provider: PersonSummary {
                person_id: row.provider_id,
                first_name: row.provider_first_name,
                last_name: row.provider_last_name,
                title: row.provider_title,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(
            PgReservationRepository::parse_status("confirmed"),
            ReservationStatus::Confirmed
        );
        assert_eq!(
            PgReservationRepository::parse_status("no_show"),
            ReservationStatus::NoShow
        );
        // Unknown strings fall back to pending rather than failing the row
        assert_eq!(
            PgReservationRepository::parse_status("garbage"),
            ReservationStatus::Pending
        );
    }
}
