//! Token inspection endpoints
//!
//! Unlike the protected routes these answer 400, not 401, for a bad
//! token: the token is the input being checked.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::app::AppState;
use crate::dto::{AuthResponse, TokenValidationRequest};
use crate::middleware::extract_bearer_token;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tokenvalidation")
            .route("/validate", web::post().to(validate))
            .route("/info", web::get().to(info)),
    );
}

fn inspect(state: &AppState, token: &str, message: &str) -> HttpResponse {
    match state.token_service().validate(token) {
        Some(claims) => HttpResponse::Ok().json(AuthResponse::from_claims(message, &claims)),
        None => HttpResponse::BadRequest().json(AuthResponse::failure("Invalid token")),
    }
}

/// Handler for POST /api/tokenvalidation/validate
pub async fn validate(
    state: web::Data<AppState>,
    request: web::Json<TokenValidationRequest>,
) -> HttpResponse {
    let token = request.token.trim();
    if token.is_empty() {
        return HttpResponse::BadRequest().json(AuthResponse::failure("Token is required"));
    }
    inspect(&state, token, "Token is valid")
}

/// Handler for GET /api/tokenvalidation/info
pub async fn info(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    match extract_bearer_token(req.headers()) {
        Some(token) => inspect(&state, token, "Token info retrieved successfully"),
        None => HttpResponse::BadRequest().json(AuthResponse::failure(
            "Authorization header with Bearer token is required",
        )),
    }
}
