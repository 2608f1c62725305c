//! Error types shared by the dashboards.
//!
//! Remote failures never abort a pipeline; they are carried inside the
//! fallback outcomes so the renderer can decide what to show.

use std::path::PathBuf;

/// Failures talking to one of the backend services.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("service unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("service rejected request with status {status}")]
    Rejected { status: u16 },

    #[error("malformed response: {message}")]
    Malformed { message: String },

    #[error("expected {expected} document but received {received}")]
    UnexpectedContentType {
        expected: &'static str,
        received: String,
    },
}

impl RemoteError {
    pub fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            Self::Malformed {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Rejected {
                status: status.as_u16(),
            }
        } else {
            Self::Unreachable {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// True when the service never answered, as opposed to answering badly.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }
}

/// Survey values that cannot flow into the estimation model.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// User-visible failures of a dashboard run.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Please select both a city and a pollutant.")]
    MissingSelection,

    #[error("Please select all fields")]
    MissingPredictionFields,

    #[error("No data found for {pollutant} in {city}.")]
    NoData { city: String, pollutant: String },

    #[error("No data found for the selected criteria")]
    NoPredictionData,

    #[error("no estimate is displayed yet; calculate emissions first")]
    NothingDisplayed,

    #[error("the air-quality service is disabled in offline mode")]
    Offline,

    #[error("invalid survey input: {0}")]
    Input(#[from] InputError),

    #[error("An error occurred while fetching data: {0}")]
    Remote(#[from] RemoteError),

    #[error("failed to import records from {path}: {message}")]
    Import { path: PathBuf, message: String },
}
