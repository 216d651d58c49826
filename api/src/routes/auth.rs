//! Authentication route handlers

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::handlers::ApiResult;
use crate::middleware::{AuthContext, JwtAuth};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout).wrap(JwtAuth))
            .route("/me", web::get().to(me).wrap(JwtAuth))
            .route("/refresh", web::post().to(refresh).wrap(JwtAuth)),
    );
}

/// Handler for POST /api/auth/register
///
/// Creates the account with the default role and returns a signed token.
///
/// ## Errors
/// - 400 Bad Request: malformed email, blank names or a short password
/// - 409 Conflict: the email is already registered
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = request.into_inner();
    request.validate()?;

    let issued = state
        .auth
        .register(
            &request.first_name,
            &request.last_name,
            &request.email,
            &request.password,
        )
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse::issued("User registered successfully", issued)))
}

/// Handler for POST /api/auth/login
///
/// ## Errors
/// - 401 Unauthorized: unknown email, wrong password or inactive account
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    request.validate()?;
    let issued = state.auth.login(&request.email, &request.password).await?;
    Ok(HttpResponse::Ok().json(AuthResponse::issued("Login successful", issued)))
}

/// Handler for POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(auth: AuthContext) -> HttpResponse {
    log::info!("User {} logged out", auth.email);
    HttpResponse::Ok().json(AuthResponse::ok("Logout successful"))
}

/// Handler for GET /api/auth/me
pub async fn me(state: web::Data<AppState>, auth: AuthContext) -> ApiResult<HttpResponse> {
    let details = state.auth.current_user(&auth.claims).await?;
    let mut response = AuthResponse::ok("User retrieved successfully");
    response.user_id = Some(details.user.id);
    response.email = Some(details.user.email);
    Ok(HttpResponse::Ok().json(response))
}

/// Handler for POST /api/auth/refresh
///
/// Issues a new token for the identity in the presented one.
pub async fn refresh(state: web::Data<AppState>, auth: AuthContext) -> ApiResult<HttpResponse> {
    let issued = state.auth.refresh(&auth.claims)?;
    Ok(HttpResponse::Ok().json(AuthResponse::issued("Token refreshed successfully", issued)))
}
