//! Reservation handlers
//!
//! HTTP handlers for the reservation lifecycle and schedule views. All
//! booking-rule enforcement lives in the scheduling engine; handlers only
//! translate between the wire shapes and the engine and map errors to
//! status codes.

use crate::dto::reservation::{
    CreateReservationRequest, DateRangeQuery, PublicReservation, RejectReservationRequest,
    ReservationListQuery, UpdateReservationRequest,
};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use serena_auth::{AdminUser, AuthenticatedUser, StaffUser};
use serena_core::models::ReservationStatus;
use serena_core::traits::{ReservationFilter, ReservationRepository};
use serena_core::AppError;
use serena_db::repositories::PgReservationRepository;
use serena_services::ReservationManager;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Create a confirmed reservation (staff booking on behalf of a customer)
///
/// POST /api/v1/reservations
#[instrument(skip(manager, staff, req))]
pub async fn create_reservation(
    manager: web::Data<ReservationManager>,
    staff: StaffUser,
    req: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    req.validate().map_err(|e| {
        warn!("Reservation creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let user_id = req
        .user_id
        .ok_or_else(|| AppError::MissingField("user_id".to_string()))?;

    debug!(
        staff_id = staff.person_id,
        user_id, "Staff creating confirmed reservation"
    );

    let new = req.into_new_reservation(user_id, ReservationStatus::Confirmed)?;
    let detail = manager.create(new).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        detail,
        "Reservation created successfully",
    )))
}

/// Create a pending reservation request (customer self-service)
///
/// POST /api/v1/reservation-request
#[instrument(skip(manager, user, req))]
pub async fn create_reservation_request(
    manager: web::Data<ReservationManager>,
    user: AuthenticatedUser,
    req: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    req.validate().map_err(|e| {
        warn!("Reservation request validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(user_id = user.person_id, "Customer requesting reservation");

    let new = req.into_new_reservation(user.person_id, ReservationStatus::Pending)?;
    let detail = manager.create(new).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        detail,
        "Reservation request submitted",
    )))
}

/// List reservations with filters
///
/// GET /api/v1/reservations
#[instrument(skip(pool, _staff))]
pub async fn list_reservations(
    pool: web::Data<PgPool>,
    _staff: StaffUser,
    query: web::Query<ReservationListQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let reservations = repo.list(&filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(reservations)))
}

/// Date-range schedule listing (internal view)
///
/// GET /api/v1/reservations/index
#[instrument(skip(pool, _staff))]
pub async fn schedule_index(
    pool: web::Data<PgPool>,
    _staff: StaffUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let reservations = repo.list(&filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(reservations)))
}

/// Date-range schedule listing, sanitized for anonymous consumption
///
/// GET /api/v1/reservations/public
#[instrument(skip(pool))]
pub async fn public_schedule(
    pool: web::Data<PgPool>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let mut filter = query.into_inner().into_filter()?;
    filter.statuses = Some(vec![
        ReservationStatus::Confirmed,
        ReservationStatus::Completed,
    ]);
    // Anonymous callers never filter by customer
    filter.user_id = None;

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let reservations = repo.list(&filter).await?;

    let sanitized: Vec<PublicReservation> =
        reservations.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(sanitized)))
}

/// List pending reservations
///
/// GET /api/v1/reservations/pending
#[instrument(skip(pool, _staff))]
pub async fn pending_reservations(
    pool: web::Data<PgPool>,
    _staff: StaffUser,
    query: web::Query<ReservationListQuery>,
) -> Result<HttpResponse, AppError> {
    let mut filter = query.into_inner().into_filter()?;
    filter.status = Some(ReservationStatus::Pending);

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let reservations = repo.list(&filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(reservations)))
}

/// Count pending reservations, grouped by provider
///
/// GET /api/v1/reservations/pending/count
#[instrument(skip(pool, _staff))]
pub async fn pending_count(
    pool: web::Data<PgPool>,
    _staff: StaffUser,
    query: web::Query<ReservationListQuery>,
) -> Result<HttpResponse, AppError> {
    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let mut counts = repo.pending_counts_by_provider().await?;

    if let Some(provider_id) = query.provider_id {
        counts.retain(|c| c.provider_id == provider_id);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(counts)))
}

/// Get a single reservation
///
/// GET /api/v1/reservations/{id}
#[instrument(skip(pool, user))]
pub async fn get_reservation(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let detail = repo
        .find_detail(id)
        .await?
        .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))?;

    // Customers may only read their own bookings
    if !user.is_staff() && detail.reservation.user_id != user.person_id {
        warn!(
            person_id = user.person_id,
            reservation_id = id,
            "Customer attempted to read another customer's reservation"
        );
        return Err(AppError::Forbidden);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(detail)))
}

/// Approve a pending reservation
///
/// PATCH /api/v1/reservations/{id}/approve
#[instrument(skip(manager, staff))]
pub async fn approve_reservation(
    manager: web::Data<ReservationManager>,
    staff: StaffUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    info!(staff_id = staff.person_id, reservation_id = id, "Approving reservation");

    let detail = manager.approve(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        detail,
        "Reservation approved",
    )))
}

/// Reject a pending reservation
///
/// PATCH /api/v1/reservations/{id}/reject
#[instrument(skip(manager, staff, req))]
pub async fn reject_reservation(
    manager: web::Data<ReservationManager>,
    staff: StaffUser,
    path: web::Path<i64>,
    req: web::Json<RejectReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    info!(staff_id = staff.person_id, reservation_id = id, "Rejecting reservation");

    let detail = manager.reject(id, req.into_inner().reason).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        detail,
        "Reservation rejected",
    )))
}

/// Update a reservation
///
/// PUT /api/v1/reservations/{id}
#[instrument(skip(manager, _staff, req))]
pub async fn update_reservation(
    manager: web::Data<ReservationManager>,
    _staff: StaffUser,
    path: web::Path<i64>,
    req: web::Json<UpdateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let req = req.into_inner();
    req.validate().map_err(|e| {
        warn!("Reservation update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let patch = req.into_patch()?;
    let detail = manager.update(id, patch).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        detail,
        "Reservation updated",
    )))
}

/// Hard-delete a reservation
///
/// DELETE /api/v1/reservations/{id}
#[instrument(skip(manager, admin))]
pub async fn delete_reservation(
    manager: web::Data<ReservationManager>,
    admin: AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    info!(admin_id = admin.person_id, reservation_id = id, "Deleting reservation");

    manager.delete(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        (),
        "Reservation deleted successfully",
    )))
}

/// One customer's reservation history, most recent first
///
/// GET /api/v1/reservations/user/{user_id}
#[instrument(skip(pool, user))]
pub async fn user_reservations(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if !user.is_staff() && user.person_id != user_id {
        warn!(
            person_id = user.person_id,
            requested = user_id,
            "Customer attempted to read another customer's history"
        );
        return Err(AppError::Forbidden);
    }

    let filter = ReservationFilter {
        user_id: Some(user_id),
        order_desc: true,
        ..ReservationFilter::default()
    };

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let reservations = repo.list(&filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(reservations)))
}

/// The authenticated customer's own reservations, most recent first
///
/// GET /api/v1/my-reservations
#[instrument(skip(pool, user))]
pub async fn my_reservations(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let filter = ReservationFilter {
        user_id: Some(user.person_id),
        order_desc: true,
        ..ReservationFilter::default()
    };

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let reservations = repo.list(&filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(reservations)))
}

/// Configure reservation routes
///
/// Literal segments register before the `{id}` captures so `/pending`
/// and friends never parse as reservation ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reservation-request",
        web::post().to(create_reservation_request),
    );
    cfg.route("/my-reservations", web::get().to(my_reservations));
    cfg.service(
        web::scope("/reservations")
            .route("", web::post().to(create_reservation))
            .route("", web::get().to(list_reservations))
            .route("/index", web::get().to(schedule_index))
            .route("/public", web::get().to(public_schedule))
            .route("/pending/count", web::get().to(pending_count))
            .route("/pending", web::get().to(pending_reservations))
            .route("/user/{user_id}", web::get().to(user_reservations))
            .route("/{id}/approve", web::patch().to(approve_reservation))
            .route("/{id}/reject", web::patch().to(reject_reservation))
            .route("/{id}", web::get().to(get_reservation))
            .route("/{id}", web::put().to(update_reservation))
            .route("/{id}", web::delete().to(delete_reservation)),
    );
}
