//! Reservation scheduling service
//!
//! Manages the reservation lifecycle:
//! - Create bookings after availability and gap validation
//! - Reschedule bookings with full re-validation
//! - Approve or reject pending requests
//! - Hard-delete bookings
//!
//! Every mutation that can collide with a concurrent booking runs inside a
//! transaction holding a per-provider advisory lock, so two requests for
//! the same provider serialize and the second sees the first's row.

use serena_core::{
    config::BookingConfig,
    models::{
        BookedSlot, Reservation, ReservationDetail, ReservationStatus, VariantWithService,
    },
    traits::{NotificationSender, ReservationRepository},
    AppError, AppResult,
};
use serena_db::repositories::{PgCatalogRepository, PgReservationRepository};
use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::availability::ScheduleRules;
use crate::conflict::find_gap_conflict;

/// A new booking request
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: i64,
    pub provider_id: i64,
    pub variant_id: i64,
    pub user_package_item_id: Option<i64>,
    pub start_time: NaiveDateTime,
    pub notes: Option<String>,
    /// Pending for customer requests, confirmed for staff-created bookings
    pub status: ReservationStatus,
}

/// Partial update to an existing booking
///
/// Absent fields keep their current values. End time is never patchable;
/// it is recomputed from the effective variant whenever scheduling fields
/// change. Notes and the package credit can be replaced but never cleared
/// through a patch; dropping either takes a dedicated staff action on the
/// row, not an omitted field.
#[derive(Debug, Clone, Default)]
pub struct ReservationPatch {
    pub provider_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub user_package_item_id: Option<i64>,
    pub start_time: Option<NaiveDateTime>,
    pub status: Option<ReservationStatus>,
    pub notes: Option<String>,
}

/// Reservation scheduling manager
///
/// Owns the booking rules and the connection pool; handlers share one
/// instance behind `web::Data`.
pub struct ReservationManager {
    pool: PgPool,
    rules: ScheduleRules,
    notifier: Arc<dyn NotificationSender>,
}

impl ReservationManager {
    /// Create a new reservation manager
    pub fn new(
        pool: PgPool,
        config: BookingConfig,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            pool,
            rules: ScheduleRules::new(config),
            notifier,
        }
    }

    /// The rule set this manager validates against
    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    /// Create a new reservation
    ///
    /// Validation runs in request order: clock and slot grid first, then
    /// variant availability, then business hours on the derived interval,
    /// then the provider gap check under the advisory lock.
    #[instrument(skip(self, req))]
    pub async fn create(&self, req: NewReservation) -> AppResult<ReservationDetail> {
        let now = Local::now().naive_local();
        self.rules.validate_start(req.start_time, now)?;

        info!(
            "Creating reservation for user {} with provider {} at {}",
            req.user_id, req.provider_id, req.start_time
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        Self::lock_provider(&mut tx, req.provider_id).await?;

        let variant = Self::resolve_variant(&mut tx, req.variant_id).await?;
        if !variant.is_bookable() {
            warn!("Variant {} is not bookable", req.variant_id);
            return Err(AppError::VariantUnavailable(req.variant_id.to_string()));
        }

        let end_time = req.start_time + Duration::minutes(variant.duration_minutes as i64);
        self.rules.check_business_hours(req.start_time, end_time)?;

        let slots =
            Self::active_slots(&mut tx, req.provider_id, req.start_time, end_time, self.gap())
                .await?;
        self.ensure_gap(&slots, req.start_time, end_time, None)?;

        let (reservation_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO reservations (
                user_id, provider_id, variant_id, user_package_item_id,
                start_time, end_time, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING reservation_id
            "#,
        )
        .bind(req.user_id)
        .bind(req.provider_id)
        .bind(req.variant_id)
        .bind(req.user_package_item_id)
        .bind(req.start_time)
        .bind(end_time)
        .bind(req.status.to_string())
        .bind(&req.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to create reservation: {}", e);
            AppError::Database(format!("Failed to create reservation: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        let detail = self.fetch_detail(reservation_id).await?;

        if detail.reservation.status == ReservationStatus::Pending {
            let notifier = Arc::clone(&self.notifier);
            let notice = detail.clone();
            tokio::spawn(async move {
                notifier.pending_reservation_created(&notice).await;
            });
        }

        info!(
            "Created reservation {} for provider {} ({} - {})",
            reservation_id, req.provider_id, req.start_time, end_time
        );

        Ok(detail)
    }

    /// Update an existing reservation
    ///
    /// Any change to provider, variant, or start re-derives the end time
    /// and re-runs the full rule chain, including the gap check with the
    /// reservation itself excluded. Reviving a cancelled or no-show
    /// booking re-runs the gap check too, since the interval re-enters
    /// the provider's active set.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: ReservationPatch) -> AppResult<ReservationDetail> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let existing = Self::fetch_for_update(&mut tx, id).await?;

        let new_status = patch.status.unwrap_or(existing.status);
        if new_status != existing.status
            && existing.status.is_terminal()
            && new_status == ReservationStatus::Pending
        {
            return Err(AppError::InvalidTransition(format!(
                "Cannot move reservation from '{}' back to 'pending'",
                existing.status
            )));
        }

        let provider_id = patch.provider_id.unwrap_or(existing.provider_id);
        let variant_id = patch.variant_id.unwrap_or(existing.variant_id);
        let start_time = patch.start_time.unwrap_or(existing.start_time);

        let schedule_changed = provider_id != existing.provider_id
            || variant_id != existing.variant_id
            || start_time != existing.start_time;
        let revived = !existing.status.is_active() && new_status.is_active();

        let end_time = if schedule_changed {
            Self::lock_provider(&mut tx, provider_id).await?;

            let variant = Self::resolve_variant(&mut tx, variant_id).await?;
            if variant_id != existing.variant_id && !variant.is_bookable() {
                warn!("Variant {} is not bookable", variant_id);
                return Err(AppError::VariantUnavailable(variant_id.to_string()));
            }

            if start_time != existing.start_time {
                self.rules
                    .validate_start(start_time, Local::now().naive_local())?;
            }

            let end = start_time + Duration::minutes(variant.duration_minutes as i64);
            self.rules.check_business_hours(start_time, end)?;
            end
        } else {
            existing.end_time
        };

        if new_status.is_active() && (schedule_changed || revived) {
            if !schedule_changed {
                Self::lock_provider(&mut tx, provider_id).await?;
            }
            let slots =
                Self::active_slots(&mut tx, provider_id, start_time, end_time, self.gap()).await?;
            self.ensure_gap(&slots, start_time, end_time, Some(id))?;
        }

        let user_package_item_id = patch.user_package_item_id.or(existing.user_package_item_id);
        let notes = patch.notes.or(existing.notes);

        sqlx::query(
            r#"
            UPDATE reservations
            SET provider_id = $2,
                variant_id = $3,
                user_package_item_id = $4,
                start_time = $5,
                end_time = $6,
                status = $7,
                notes = $8,
                updated_at = NOW()
            WHERE reservation_id = $1
            "#,
        )
        .bind(id)
        .bind(provider_id)
        .bind(variant_id)
        .bind(user_package_item_id)
        .bind(start_time)
        .bind(end_time)
        .bind(new_status.to_string())
        .bind(&notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to update reservation {}: {}", id, e);
            AppError::Database(format!("Failed to update reservation: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!("Updated reservation {}", id);

        self.fetch_detail(id).await
    }

    /// Approve a pending reservation
    #[instrument(skip(self))]
    pub async fn approve(&self, id: i64) -> AppResult<ReservationDetail> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let existing = Self::fetch_for_update(&mut tx, id).await?;

        if existing.status != ReservationStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Cannot approve reservation with status '{}'; only pending reservations can be approved",
                existing.status
            )));
        }

        sqlx::query(
            "UPDATE reservations SET status = 'confirmed', updated_at = NOW() WHERE reservation_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to approve reservation {}: {}", id, e);
            AppError::Database(format!("Failed to approve reservation: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        let detail = self.fetch_detail(id).await?;

        let notifier = Arc::clone(&self.notifier);
        let notice = detail.clone();
        tokio::spawn(async move {
            notifier.reservation_approved(&notice).await;
        });

        info!("Approved reservation {}", id);

        Ok(detail)
    }

    /// Reject a pending reservation
    ///
    /// The booking moves to cancelled and the reason, when given, is
    /// appended to the notes so the history stays on the row.
    #[instrument(skip(self, reason))]
    pub async fn reject(&self, id: i64, reason: Option<String>) -> AppResult<ReservationDetail> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let existing = Self::fetch_for_update(&mut tx, id).await?;

        if existing.status != ReservationStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Cannot reject reservation with status '{}'; only pending reservations can be rejected",
                existing.status
            )));
        }

        let notes = match &reason {
            Some(r) => Some(rejection_notes(existing.notes.as_deref(), r)),
            None => existing.notes.clone(),
        };

        sqlx::query(
            "UPDATE reservations SET status = 'cancelled', notes = $2, updated_at = NOW() WHERE reservation_id = $1",
        )
        .bind(id)
        .bind(&notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to reject reservation {}: {}", id, e);
            AppError::Database(format!("Failed to reject reservation: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        let detail = self.fetch_detail(id).await?;

        let notifier = Arc::clone(&self.notifier);
        let notice = detail.clone();
        tokio::spawn(async move {
            notifier
                .reservation_rejected(&notice, reason.as_deref())
                .await;
        });

        info!("Rejected reservation {}", id);

        Ok(detail)
    }

    /// Hard-delete a reservation
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let repo = PgReservationRepository::new(self.pool.clone());
        let deleted = serena_core::traits::Repository::delete(&repo, id).await?;

        if !deleted {
            return Err(AppError::ReservationNotFound(id.to_string()));
        }

        info!("Deleted reservation {}", id);
        Ok(())
    }

    fn gap(&self) -> i64 {
        self.rules.min_gap_minutes()
    }

    fn ensure_gap(
        &self,
        slots: &[BookedSlot],
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<i64>,
    ) -> AppResult<()> {
        if let Some(hit) = find_gap_conflict(slots, start, end, self.gap(), exclude) {
            warn!(
                "Gap conflict with reservation {} ({} - {})",
                hit.reservation_id, hit.start_time, hit.end_time
            );
            return Err(AppError::GapConflict(self.gap()));
        }
        Ok(())
    }

    async fn fetch_detail(&self, id: i64) -> AppResult<ReservationDetail> {
        let repo = PgReservationRepository::new(self.pool.clone());
        repo.find_detail(id)
            .await?
            .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))
    }

    /// Serialize all scheduling mutations for one provider
    async fn lock_provider(
        tx: &mut Transaction<'_, Postgres>,
        provider_id: i64,
    ) -> AppResult<()> {
        debug!("Acquiring advisory lock for provider {}", provider_id);

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(provider_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                error!("Failed to lock provider {}: {}", provider_id, e);
                AppError::Database(format!("Failed to lock provider: {}", e))
            })?;

        Ok(())
    }

    async fn resolve_variant(
        tx: &mut Transaction<'_, Postgres>,
        variant_id: i64,
    ) -> AppResult<VariantWithService> {
        PgCatalogRepository::fetch_variant_with_service(&mut **tx, variant_id)
            .await?
            .ok_or_else(|| AppError::VariantNotFound(variant_id.to_string()))
    }

    /// Active bookings of a provider near a candidate interval
    ///
    /// The window is widened by the gap on both sides; anything further
    /// away cannot trip any conflict clause.
    async fn active_slots(
        tx: &mut Transaction<'_, Postgres>,
        provider_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        gap_minutes: i64,
    ) -> AppResult<Vec<BookedSlot>> {
        let window_start = start - Duration::minutes(gap_minutes);
        let window_end = end + Duration::minutes(gap_minutes);

        let rows = sqlx::query_as::<Postgres, SlotRow>(
            r#"
            SELECT reservation_id, start_time, end_time
            FROM reservations
            WHERE provider_id = $1
              AND status NOT IN ('cancelled', 'no_show')
              AND start_time < $3
              AND end_time > $2
            "#,
        )
        .bind(provider_id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            error!(
                "Failed to fetch bookings for provider {}: {}",
                provider_id, e
            );
            AppError::Database(format!("Failed to fetch bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn fetch_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> AppResult<Reservation> {
        let row = sqlx::query_as::<Postgres, ReservationRow>(
            r#"
            SELECT reservation_id, user_id, provider_id, variant_id,
                   user_package_item_id, start_time, end_time, status, notes,
                   created_at, updated_at
            FROM reservations
            WHERE reservation_id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            error!("Failed to lock reservation {}: {}", id, e);
            AppError::Database(format!("Failed to lock reservation: {}", e))
        })?
        .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))?;

        Ok(row.into())
    }
}

/// Append a rejection reason to existing notes
fn rejection_notes(existing: Option<&str>, reason: &str) -> String {
    match existing {
        Some(n) if !n.is_empty() => format!("{}\n[REJECTED] {}", n, reason),
        _ => format!("[REJECTED] {}", reason),
    }
}

/// Helper struct for slot row mapping
#[derive(Debug, sqlx::FromRow)]
struct SlotRow {
    reservation_id: i64,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
}

impl From<SlotRow> for BookedSlot {
    fn from(row: SlotRow) -> Self {
        Self {
            reservation_id: row.reservation_id,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

/// Helper struct for reservation row mapping
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
            status: ReservationStatus::from_str(&row.status).unwrap_or(ReservationStatus::Pending),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
