//! User account endpoints, bearer token required

use actix_web::{http::header, web, HttpResponse};
use sf_core::DomainError;
use validator::Validate;

use crate::app::AppState;
use crate::dto::UserRequest;
use crate::handlers::ApiResult;
use crate::middleware::JwtAuth;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .wrap(JwtAuth)
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/active", web::get().to(active))
            .route("/email/{email}", web::get().to(by_email))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete)),
    );
}

fn user_not_found(id: i64) -> DomainError {
    DomainError::not_found(format!("User {}", id))
}

/// Handler for GET /api/users
pub async fn list(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let mut uow = state.unit().await?;
    let users = uow.users().get_all().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Handler for GET /api/users/active
pub async fn active(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let mut uow = state.unit().await?;
    let users = uow.users().get_active_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Handler for GET /api/users/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let mut uow = state.unit().await?;
    let user = uow
        .users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Handler for GET /api/users/email/{email}
pub async fn by_email(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let email = path.into_inner();
    let mut uow = state.unit().await?;
    let user = uow
        .users()
        .get_by_email(&email)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("User with email {}", email)))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Handler for POST /api/users
///
/// Creates an account without a password; it cannot log in until one
/// is set through registration.
pub async fn create(
    state: web::Data<AppState>,
    request: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let request = request.into_inner();
    request.validate()?;

    let mut uow = state.unit().await?;
    let staged = uow.users().add(request.into_user())?;
    uow.save_changes().await?;

    let user = uow
        .persisted(&staged)
        .ok_or_else(|| DomainError::Internal {
            message: "Saved user has no id".to_string(),
        })?;
    uow.dispose().await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/users/{}", user.id)))
        .json(user))
}

/// Handler for PUT /api/users/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    request: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let request = request.into_inner();
    request.validate()?;

    let mut uow = state.unit().await?;
    let mut user = uow
        .users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))?
        .user;
    request.apply_to(&mut user);
    uow.users().update(user)?;
    uow.save_changes().await?;
    uow.dispose().await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Handler for DELETE /api/users/{id}
///
/// Roles and profile go with the user; a user with orders is refused (409).
pub async fn delete(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let mut uow = state.unit().await?;
    if !uow.users().delete(id).await? {
        return Err(user_not_found(id).into());
    }
    uow.save_changes().await?;
    uow.dispose().await?;

    Ok(HttpResponse::NoContent().finish())
}
