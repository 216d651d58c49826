use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::Context;
use log::info;

use sf_api::{config, create_app, AppState};
use sf_core::{TokenService, TokenServiceConfig};
use sf_shared::{AppConfig, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let environment = config::load_env_files();

    config::init_logging(&LoggingConfig::from_env(environment));

    info!("Starting storefront API server ({})", environment);

    // Refuse to serve without a complete signing configuration
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let token_service = TokenService::new(TokenServiceConfig::from(&config.jwt))
        .context("Invalid JWT configuration")?;

    let units = sf_infra::initialize(&config.database)
        .await
        .context("Failed to initialize the store")?;
    info!("Store backend: {}", units.backend());

    let state = web::Data::new(AppState::new(
        units,
        Arc::new(token_service),
        Duration::from_secs(config.server.request_timeout),
    ));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone(), environment));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await?;

    info!("Server stopped");
    Ok(())
}
