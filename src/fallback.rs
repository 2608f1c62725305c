//! Remote-first estimation and report generation with local fallbacks.
//!
//! The local estimate is always computed before any network traffic, so
//! every path ends with a result. At most one remote attempt is made per
//! run and failures are never retried.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::client::{EmissionRequest, EstimatorBackend, PdfDocument};
use crate::error::RemoteError;
use crate::estimator;
use crate::models::{DisplayedEstimate, EstimationResult, ResultSource, SurveyInput};
use crate::report;

pub const REPORT_FALLBACK_NOTICE: &str =
    "Could not generate PDF report from server. Generating a text report instead.";

#[derive(Debug)]
pub enum EstimateOutcome {
    /// No remote service was configured.
    LocalOnly(EstimationResult),
    RemoteConfirmed(EstimationResult),
    /// A remote service was configured but could not deliver.
    Degraded {
        result: EstimationResult,
        reason: RemoteError,
    },
}

impl EstimateOutcome {
    pub fn result(&self) -> &EstimationResult {
        match self {
            Self::LocalOnly(result) | Self::RemoteConfirmed(result) => result,
            Self::Degraded { result, .. } => result,
        }
    }

    pub fn source(&self) -> ResultSource {
        match self {
            Self::RemoteConfirmed(_) => ResultSource::Remote,
            Self::LocalOnly(_) | Self::Degraded { .. } => ResultSource::Local,
        }
    }

    pub fn to_displayed(&self) -> DisplayedEstimate {
        DisplayedEstimate::from_result(self.result(), self.source())
    }
}

pub async fn estimate_with_fallback(
    backend: Option<&dyn EstimatorBackend>,
    input: &SurveyInput,
) -> EstimateOutcome {
    let local = estimator::estimate(input);

    let Some(backend) = backend else {
        return EstimateOutcome::LocalOnly(local);
    };

    if let Err(reason) = backend.probe().await {
        warn!(error = %reason, "estimator service not reachable, using local estimate");
        return EstimateOutcome::Degraded {
            result: local,
            reason,
        };
    }

    let remote = backend
        .calculate_emissions(&EmissionRequest::from(input))
        .await
        .and_then(EstimationResult::try_from);

    match remote {
        Ok(result) => {
            info!(total = result.breakdown.total, "remote estimate accepted");
            EstimateOutcome::RemoteConfirmed(result)
        }
        Err(reason) => {
            warn!(error = %reason, "remote estimate failed, using local estimate");
            EstimateOutcome::Degraded {
                result: local,
                reason,
            }
        }
    }
}

#[derive(Debug)]
pub enum ReportOutcome {
    Pdf(PdfDocument),
    Text {
        body: String,
        /// Why the remote renderer was not used; `None` in offline mode.
        reason: Option<RemoteError>,
    },
}

impl ReportOutcome {
    /// The one message to show the user, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::Text {
                reason: Some(_), ..
            } => Some(REPORT_FALLBACK_NOTICE),
            _ => None,
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "pdf",
            Self::Text { .. } => "txt",
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Pdf(document) => &document.0,
            Self::Text { body, .. } => body.as_bytes(),
        }
    }
}

/// Asks the remote renderer for a PDF of `input`; otherwise composes the
/// text report from `displayed`, which is what the user currently sees.
pub async fn request_report(
    backend: Option<&dyn EstimatorBackend>,
    input: &SurveyInput,
    displayed: &DisplayedEstimate,
    date: NaiveDate,
) -> ReportOutcome {
    let reason = match backend {
        None => None,
        Some(backend) => match remote_report(backend, input).await {
            Ok(document) => return ReportOutcome::Pdf(document),
            Err(reason) => {
                warn!(error = %reason, "remote report failed, composing text report");
                Some(reason)
            }
        },
    };

    ReportOutcome::Text {
        body: report::compose_text_report(displayed, input, date),
        reason,
    }
}

async fn remote_report(
    backend: &dyn EstimatorBackend,
    input: &SurveyInput,
) -> Result<PdfDocument, RemoteError> {
    backend.probe().await?;
    backend
        .generate_report(&EmissionRequest::from(input))
        .await
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::client::{ensure_pdf, EmissionResponse};
    use crate::models::{DietType, VehicleType};

    /// Scripted estimator service.
    pub(crate) struct FakeEstimator {
        pub live: bool,
        pub calculate: Option<EmissionResponse>,
        pub content_type: &'static str,
        pub calls: AtomicUsize,
    }

    impl FakeEstimator {
        pub(crate) fn down() -> Self {
            Self {
                live: false,
                calculate: None,
                content_type: "",
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn serving(response: EmissionResponse, content_type: &'static str) -> Self {
            Self {
                live: true,
                calculate: Some(response),
                content_type,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EstimatorBackend for FakeEstimator {
        async fn probe(&self) -> Result<(), RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.live {
                Ok(())
            } else {
                Err(RemoteError::Unreachable {
                    url: "http://fake/".to_string(),
                    message: "connection refused".to_string(),
                })
            }
        }

        async fn calculate_emissions(
            &self,
            _request: &EmissionRequest,
        ) -> Result<EmissionResponse, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.calculate
                .clone()
                .ok_or(RemoteError::Rejected { status: 500 })
        }

        async fn generate_report(
            &self,
            _request: &EmissionRequest,
        ) -> Result<PdfDocument, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ensure_pdf(self.content_type)?;
            Ok(PdfDocument(b"%PDF-1.4".to_vec()))
        }
    }

    pub(crate) fn remote_response() -> EmissionResponse {
        EmissionResponse {
            total_emissions: 7.5,
            transportation_emissions: 4.0,
            energy_emissions: 2.0,
            diet_emissions: 1.5,
            recommendations: vec!["Remote-only advice.".to_string()],
            exceeds_threshold: Some(false),
        }
    }

    fn survey() -> SurveyInput {
        SurveyInput {
            vehicle_type: VehicleType::LargeCar,
            km_per_day: 25.0,
            electricity_kwh_per_month: 250.0,
            diet_type: Some(DietType::MeatHeavy),
            ..SurveyInput::default()
        }
    }

    #[tokio::test]
    async fn without_backend_result_is_local() {
        let outcome = estimate_with_fallback(None, &survey()).await;
        assert!(matches!(outcome, EstimateOutcome::LocalOnly(_)));
        assert_eq!(outcome.result(), &estimator::estimate(&survey()));
    }

    #[tokio::test]
    async fn unreachable_service_yields_local_result() {
        let fake = FakeEstimator::down();
        let outcome = estimate_with_fallback(Some(&fake), &survey()).await;

        assert!(matches!(
            outcome,
            EstimateOutcome::Degraded {
                reason: RemoteError::Unreachable { .. },
                ..
            }
        ));
        assert_eq!(outcome.result(), &estimator::estimate(&survey()));
        assert!(!outcome
            .result()
            .recommendations
            .contains(&"Remote-only advice.".to_string()));
        // only the probe was attempted
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn live_service_result_wins() {
        let fake = FakeEstimator::serving(remote_response(), "application/pdf");
        let outcome = estimate_with_fallback(Some(&fake), &survey()).await;

        assert!(matches!(outcome, EstimateOutcome::RemoteConfirmed(_)));
        assert_eq!(outcome.source(), ResultSource::Remote);
        assert_eq!(outcome.result().breakdown.total, 7.5);
    }

    #[tokio::test]
    async fn rejection_after_live_probe_falls_back() {
        let fake = FakeEstimator {
            live: true,
            calculate: None,
            content_type: "",
            calls: AtomicUsize::new(0),
        };
        let outcome = estimate_with_fallback(Some(&fake), &survey()).await;

        assert!(matches!(
            outcome,
            EstimateOutcome::Degraded {
                reason: RemoteError::Rejected { status: 500 },
                ..
            }
        ));
        assert_eq!(outcome.result(), &estimator::estimate(&survey()));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn inconsistent_remote_body_falls_back() {
        let mut response = remote_response();
        response.total_emissions = 42.0;
        let fake = FakeEstimator::serving(response, "application/pdf");
        let outcome = estimate_with_fallback(Some(&fake), &survey()).await;

        assert!(matches!(
            outcome,
            EstimateOutcome::Degraded {
                reason: RemoteError::Malformed { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn live_renderer_returns_pdf() {
        let fake = FakeEstimator::serving(remote_response(), "application/pdf");
        let displayed = estimate_with_fallback(None, &survey()).await.to_displayed();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let outcome = request_report(Some(&fake), &survey(), &displayed, date).await;
        assert!(matches!(outcome, ReportOutcome::Pdf(_)));
        assert_eq!(outcome.notice(), None);
        assert_eq!(outcome.file_extension(), "pdf");
    }

    #[tokio::test]
    async fn wrong_content_type_falls_back_to_text_with_notice() {
        let fake = FakeEstimator::serving(remote_response(), "text/html");
        let displayed = estimate_with_fallback(None, &survey()).await.to_displayed();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let outcome = request_report(Some(&fake), &survey(), &displayed, date).await;
        assert!(matches!(
            outcome,
            ReportOutcome::Text {
                reason: Some(RemoteError::UnexpectedContentType { .. }),
                ..
            }
        ));
        assert_eq!(outcome.notice(), Some(REPORT_FALLBACK_NOTICE));
        assert_eq!(outcome.file_extension(), "txt");
    }

    #[tokio::test]
    async fn text_report_reflects_displayed_figures_not_current_input() {
        let displayed = estimate_with_fallback(None, &survey()).await.to_displayed();
        let changed = SurveyInput {
            km_per_day: 500.0,
            ..survey()
        };
        let fake = FakeEstimator::down();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let outcome = request_report(Some(&fake), &changed, &displayed, date).await;
        let ReportOutcome::Text { body, .. } = outcome else {
            panic!("expected text report");
        };

        let displayed_line = format!("Total Annual Emissions: {} metric tons CO2e", displayed.total);
        assert!(body.contains(&displayed_line));

        let fresh = DisplayedEstimate::from_result(&estimator::estimate(&changed), ResultSource::Local);
        assert_ne!(fresh.total, displayed.total);
        assert!(!body.contains(&format!("Total Annual Emissions: {} ", fresh.total)));
    }

    #[tokio::test]
    async fn live_service_rejecting_the_report_still_yields_displayed_figures() {
        let displayed = estimate_with_fallback(None, &survey()).await.to_displayed();
        let changed = SurveyInput {
            km_per_day: 500.0,
            ..survey()
        };
        let fake = FakeEstimator::serving(remote_response(), "text/html");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let outcome = request_report(Some(&fake), &changed, &displayed, date).await;
        assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.notice(), Some(REPORT_FALLBACK_NOTICE));
        let ReportOutcome::Text { body, .. } = outcome else {
            panic!("expected text report");
        };

        for line in [
            format!("Total Annual Emissions: {} metric tons CO2e", displayed.total),
            format!("Transportation Emissions: {} tons", displayed.transportation),
            format!("Home Energy Emissions: {} tons", displayed.energy),
            format!("Diet & Lifestyle Emissions: {} tons", displayed.diet),
        ] {
            assert!(body.contains(&line), "missing {line:?}");
        }
        assert!(body.contains("Kilometers Per Day: 500\n"));
    }

    #[tokio::test]
    async fn offline_report_has_no_notice() {
        let displayed = estimate_with_fallback(None, &survey()).await.to_displayed();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let outcome = request_report(None, &survey(), &displayed, date).await;
        assert!(matches!(outcome, ReportOutcome::Text { reason: None, .. }));
        assert_eq!(outcome.notice(), None);
    }
}
