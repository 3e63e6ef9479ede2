//! Authentication handlers
//!
//! HTTP handlers for authentication endpoints.

use crate::dto::auth::{LoginRequest, LoginResponse, LogoutResponse, PersonInfo};
use crate::dto::ApiResponse;
use actix_web::{cookie::Cookie, web, HttpResponse};
use serena_auth::{AuthenticatedUser, JwtService, PasswordService};
use serena_core::traits::PersonRepository;
use serena_core::AppError;
use serena_db::repositories::PgPersonRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Login endpoint
///
/// POST /api/v1/auth/login
#[instrument(skip(pool, jwt_service, password_service, req))]
pub async fn login(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<Arc<JwtService>>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Login validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let email = req.email.trim();
    debug!("Processing login request");

    let person_repo = PgPersonRepository::new(pool.get_ref().clone());
    let person = person_repo.find_by_email(email).await?.ok_or_else(|| {
        info!("Login failed: person not found");
        AppError::InvalidCredentials
    })?;

    if !person.can_login() {
        warn!(person_id = person.person_id, "Login failed: person is inactive");
        return Err(AppError::InvalidCredentials);
    }

    let password_valid = password_service
        .verify_password(&req.password, &person.password_hash)
        .map_err(|e| {
            error!("Password verification error: {}", e);
            AppError::Internal("Password verification failed".to_string())
        })?;

    if !password_valid {
        info!(person_id = person.person_id, "Login failed: invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt_service.create_token_for_person(person.person_id, &person.email, person.role)?;
    let expires_in = jwt_service.expiration_secs();

    info!(person_id = person.person_id, role = ?person.role, "Login successful");

    let user_info = PersonInfo::from(&person);
    let response = LoginResponse::new(token.clone(), expires_in, user_info);

    let cookie = Cookie::build("token", token)
        .path("/")
        .http_only(true)
        .secure(false) // HTTPS deployments should flip this on
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(response)))
}

/// Get current person info
///
/// GET /api/v1/auth/me
#[instrument(skip(pool, user))]
pub async fn me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    debug!(person_id = user.person_id, "Getting current person info");

    let person_repo = PgPersonRepository::new(pool.get_ref().clone());
    let person = serena_core::traits::Repository::find_by_id(&person_repo, user.person_id)
        .await?
        .ok_or_else(|| AppError::PersonNotFound(user.person_id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(PersonInfo::from(&person))))
}

/// Logout endpoint
///
/// POST /api/v1/auth/logout
#[instrument(skip(user))]
pub async fn logout(user: AuthenticatedUser) -> HttpResponse {
    info!(person_id = user.person_id, "User logged out");

    let cookie = Cookie::build("token", "")
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(0))
        .finish();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(LogoutResponse::default()))
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me))
            .route("/logout", web::post().to(logout)),
    );
}
