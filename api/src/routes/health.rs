use actix_web::{web, HttpResponse};
use sf_shared::HealthResponse;

use crate::app::AppState;

/// Handler for GET /health
///
/// Opens a unit of work and pings the store. Answers 503 when the store
/// cannot be reached.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let reachable = match state.unit().await {
        Ok(mut uow) => {
            let ping = uow.ping().await;
            if let Err(error) = uow.dispose().await {
                log::warn!("Failed to release health check unit: {}", error);
            }
            ping.is_ok()
        }
        Err(error) => {
            log::warn!("Health check could not open a unit of work: {}", error);
            false
        }
    };

    let body = HealthResponse::new(state.backend(), reachable);
    if reachable {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
