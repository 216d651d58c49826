//! Application state and factory
//!
//! This module holds the shared state handed to every handler and builds
//! the Actix-web application around it.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App, HttpResponse,
};
use sf_core::repositories::{UnitOfWork, UnitOfWorkFactory};
use sf_core::{AuthService, TokenService};
use sf_shared::{error_codes, Environment, ErrorResponse};

use crate::handlers::{json_error_handler, ApiResult};
use crate::middleware::create_cors;
use crate::routes;

/// State shared by all workers
pub struct AppState {
    pub auth: Arc<AuthService>,
    units: Arc<dyn UnitOfWorkFactory>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(
        units: Arc<dyn UnitOfWorkFactory>,
        token_service: Arc<TokenService>,
        request_timeout: Duration,
    ) -> Self {
        let auth = AuthService::new(units.clone(), token_service);
        Self::with_auth(units, auth, request_timeout)
    }

    pub fn with_auth(
        units: Arc<dyn UnitOfWorkFactory>,
        auth: AuthService,
        request_timeout: Duration,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            units,
            request_timeout,
        }
    }

    pub fn token_service(&self) -> &TokenService {
        self.auth.token_service()
    }

    pub fn backend(&self) -> &'static str {
        self.units.backend()
    }

    /// A fresh unit of work bounded by the request deadline.
    ///
    /// Dropping the unit releases its session; handlers only dispose
    /// explicitly when they want the error.
    pub async fn unit(&self) -> ApiResult<UnitOfWork> {
        Ok(self.units.create().await?.with_deadline(self.request_timeout))
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
    environment: Environment,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(create_cors(environment))
        .wrap(Logger::default())
        .configure(routes::configure)
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
