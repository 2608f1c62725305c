use std::time::Duration;

use clap::Args;

use crate::client::HttpBackend;
use crate::error::RemoteError;

/// Connection settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Base URL of the carbon estimator service
    #[arg(long, env = "CARBON_API_URL", default_value = "http://localhost:8002", global = true)]
    pub estimator_url: String,

    /// Base URL of the air-quality service
    #[arg(long, env = "AIR_QUALITY_API_URL", default_value = "http://localhost:8001", global = true)]
    pub air_url: String,

    /// How long the liveness probe may take before the service counts as down
    #[arg(long, env = "DASHBOARD_PROBE_TIMEOUT_MS", default_value_t = 3000, global = true)]
    pub probe_timeout_ms: u64,

    #[arg(long, env = "DASHBOARD_REQUEST_TIMEOUT_MS", default_value_t = 30_000, global = true)]
    pub request_timeout_ms: u64,

    /// Never contact a remote service
    #[arg(long, env = "DASHBOARD_OFFLINE", global = true)]
    pub offline: bool,
}

impl Settings {
    fn backend(&self, base_url: &str) -> Result<Option<HttpBackend>, RemoteError> {
        if self.offline {
            return Ok(None);
        }
        HttpBackend::new(
            base_url,
            Duration::from_millis(self.probe_timeout_ms),
            Duration::from_millis(self.request_timeout_ms),
        )
        .map(Some)
    }

    pub fn estimator_backend(&self) -> Result<Option<HttpBackend>, RemoteError> {
        self.backend(&self.estimator_url)
    }

    pub fn air_quality_backend(&self) -> Result<Option<HttpBackend>, RemoteError> {
        self.backend(&self.air_url)
    }
}
