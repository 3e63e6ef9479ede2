//! Notification dispatch
//!
//! Notifications are best-effort side effects: they run after the
//! triggering state change has committed and their failures are logged,
//! never propagated. The default implementation just writes structured
//! log lines; a mail or push sender plugs in behind the same trait.

use serena_core::{models::ReservationDetail, traits::NotificationSender};
use async_trait::async_trait;
use tracing::info;

/// Notification sender that logs instead of delivering
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn pending_reservation_created(&self, reservation: &ReservationDetail) {
        info!(
            reservation_id = reservation.reservation.reservation_id,
            provider_id = reservation.reservation.provider_id,
            start_time = %reservation.reservation.start_time,
            "Pending reservation created; admin notification queued"
        );
    }

    async fn reservation_approved(&self, reservation: &ReservationDetail) {
        info!(
            reservation_id = reservation.reservation.reservation_id,
            user_id = reservation.reservation.user_id,
            "Reservation approved; customer notification queued"
        );
    }

    async fn reservation_rejected(&self, reservation: &ReservationDetail, reason: Option<&str>) {
        info!(
            reservation_id = reservation.reservation.reservation_id,
            user_id = reservation.reservation.user_id,
            reason = reason.unwrap_or("(none)"),
            "Reservation rejected; customer notification queued"
        );
    }
}
