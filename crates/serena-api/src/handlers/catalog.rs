//! Catalog handlers
//!
//! Read-only endpoints for the bookable catalog: active services with
//! their variants, purchasable packages, and the provider roster. All
//! are public so the booking front end can render without a session.

use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use serena_core::models::PersonSummary;
use serena_core::traits::{CatalogRepository, PersonRepository};
use serena_core::AppError;
use serena_db::repositories::{PgCatalogRepository, PgPersonRepository};
use sqlx::PgPool;
use tracing::{debug, instrument};

/// List active services with their variants
///
/// GET /api/v1/services
#[instrument(skip(pool))]
pub async fn list_services(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    debug!("Listing active services");

    let repo = PgCatalogRepository::new(pool.get_ref().clone());
    let services = repo.list_active_with_variants().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(services)))
}

/// List purchasable packages with their item entitlements
///
/// GET /api/v1/packages
#[instrument(skip(pool))]
pub async fn list_packages(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    debug!("Listing active packages");

    let repo = PgCatalogRepository::new(pool.get_ref().clone());
    let packages = repo.list_active_packages().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(packages)))
}

/// List active providers
///
/// GET /api/v1/providers
#[instrument(skip(pool))]
pub async fn list_providers(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    debug!("Listing active providers");

    let repo = PgPersonRepository::new(pool.get_ref().clone());
    let providers = repo.list_providers().await?;

    let summaries: Vec<PersonSummary> = providers.iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(summaries)))
}

/// Configure catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/services", web::get().to(list_services));
    cfg.route("/packages", web::get().to(list_packages));
    cfg.route("/providers", web::get().to(list_providers));
}
