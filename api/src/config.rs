//! Startup configuration loading and logger setup

use std::io::Write;

use sf_shared::{Environment, LogFormat, LoggingConfig};

/// Reads `.env`, then the file for the detected environment.
///
/// Neither file is required. Variables already set in the process win.
pub fn load_env_files() -> Environment {
    let shared = dotenvy::dotenv().ok();
    let environment = Environment::from_env();
    let specific = dotenvy::from_filename(environment.env_file()).ok();

    for path in shared.into_iter().chain(specific) {
        log::debug!("Loaded environment from {}", path.display());
    }
    environment
}

/// Installs `env_logger` with the configured filter and format
pub fn init_logging(logging: &LoggingConfig) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::new().default_filter_or(logging.level.as_str()));

    if logging.format == LogFormat::Json {
        builder.format(|buf, record| {
            let line = serde_json::json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "level": record.level().to_string(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", line)
        });
    }

    builder.init();
}
