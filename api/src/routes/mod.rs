//! Route table
//!
//! - `/health` - store probe
//! - `/api/auth` - register, login, logout, current user, refresh
//! - `/api/tokenvalidation` - token inspection
//! - `/api/products`, `/api/users` - catalogue and account management, bearer token required

pub mod auth;
pub mod health;
pub mod products;
pub mod token_validation;
pub mod users;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .configure(auth::configure)
                .configure(token_validation::configure)
                .configure(products::configure)
                .configure(users::configure),
        );
}
