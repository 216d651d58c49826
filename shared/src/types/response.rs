//! Response bodies shared by the HTTP surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall health of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Body of the `/health` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// Backend name and whether it answered a probe
    pub store: String,
    pub store_reachable: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(store: impl Into<String>, store_reachable: bool) -> Self {
        Self {
            status: if store_reachable {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: store.into(),
            store_reachable,
            timestamp: Utc::now(),
        }
    }
}
