//! HTTP surface of the storefront backend
//!
//! Library half of the `sf_api` binary, exposed so the route table can be
//! exercised with `actix_web::test`.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState};
