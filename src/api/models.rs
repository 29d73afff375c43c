use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RuntimeMode;

/// Root status probe response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub docs: String,
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub environment: String,
    pub mode: RuntimeMode,
    pub reload_enabled: bool,
    pub checks: Vec<ComponentCheck>,
}

/// Per-component readiness status
#[derive(Debug, Serialize)]
pub struct ComponentCheck {
    pub name: &'static str,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One documented endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: String,
    pub tag: &'static str,
    pub summary: &'static str,
}

/// `/docs` response
#[derive(Debug, Clone, Serialize)]
pub struct ApiIndex {
    pub title: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<EndpointDoc>,
}
