//! Dashboard controllers.
//!
//! Each controller owns the state a page would keep between user actions:
//! the last displayed estimate for the calculator, the live chart for the
//! air-quality viewer. Runs take `&mut self`, so a controller never has two
//! runs in flight.

use chrono::NaiveDate;
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::aggregate::{self, SummaryStats, Trend};
use crate::chart::{ChartHandle, LineChart};
use crate::client::{AirQualityBackend, EstimatorBackend};
use crate::error::{DashboardError, RemoteError};
use crate::fallback::{self, EstimateOutcome, ReportOutcome};
use crate::models::{DisplayedEstimate, PredictionQuery, RawPollutionRecord, SurveyInput};
use crate::narrative;

pub struct EstimatorDashboard {
    backend: Option<Box<dyn EstimatorBackend>>,
    displayed: Option<DisplayedEstimate>,
}

impl EstimatorDashboard {
    pub fn new(backend: Option<Box<dyn EstimatorBackend>>) -> Self {
        Self {
            backend,
            displayed: None,
        }
    }

    pub fn displayed(&self) -> Option<&DisplayedEstimate> {
        self.displayed.as_ref()
    }

    /// Estimates `input` and replaces the displayed figures.
    pub async fn calculate(&mut self, input: &SurveyInput) -> Result<EstimateOutcome, DashboardError> {
        input.validate()?;

        let outcome = fallback::estimate_with_fallback(self.backend.as_deref(), input).await;
        if let EstimateOutcome::Degraded { reason, .. } = &outcome {
            debug!(
                error = %reason,
                unreachable = reason.is_unreachable(),
                "displaying local estimate"
            );
        }
        let displayed = outcome.to_displayed();
        info!(
            total = displayed.total,
            source = ?displayed.source,
            "estimate displayed"
        );
        self.displayed = Some(displayed);

        Ok(outcome)
    }

    /// Produces a report for the current form. Needs a displayed estimate,
    /// which the text fallback reads its figures from.
    pub async fn download_report(
        &mut self,
        input: &SurveyInput,
        date: NaiveDate,
    ) -> Result<ReportOutcome, DashboardError> {
        let displayed = self.displayed.as_ref().ok_or(DashboardError::NothingDisplayed)?;
        Ok(fallback::request_report(self.backend.as_deref(), input, displayed, date).await)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CatalogKind {
    Cities,
    Pollutants,
    Models,
}

impl CatalogKind {
    fn noun(&self) -> &'static str {
        match self {
            Self::Cities => "cities",
            Self::Pollutants => "pollutants",
            Self::Models => "models",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Catalog {
    Available(Vec<String>),
    Empty,
    Failed,
}

impl Catalog {
    /// Placeholder shown in place of the choices.
    pub fn placeholder(&self, kind: &CatalogKind) -> Option<String> {
        match self {
            Self::Available(_) => None,
            Self::Empty => Some(format!("No {} available", kind.noun())),
            Self::Failed => Some(format!("Error loading {}", kind.noun())),
        }
    }
}

/// Everything one visualization run shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    pub city: String,
    pub pollutant: String,
    pub stats: SummaryStats,
    pub trend: Option<Trend>,
    pub summary: String,
    pub health: String,
    pub trend_text: String,
    pub map_url: Option<Url>,
}

pub struct AirQualityDashboard {
    backend: Option<Box<dyn AirQualityBackend>>,
    chart: Option<ChartHandle>,
    charts_drawn: u64,
}

impl AirQualityDashboard {
    pub fn new(backend: Option<Box<dyn AirQualityBackend>>) -> Self {
        Self {
            backend,
            chart: None,
            charts_drawn: 0,
        }
    }

    pub fn chart(&self) -> Option<&ChartHandle> {
        self.chart.as_ref()
    }

    fn backend(&self) -> Result<&dyn AirQualityBackend, DashboardError> {
        self.backend.as_deref().ok_or(DashboardError::Offline)
    }

    pub async fn load_catalog(&self, kind: CatalogKind) -> Catalog {
        let Some(backend) = self.backend.as_deref() else {
            return Catalog::Failed;
        };
        load_catalog_from(backend, &kind).await
    }

    /// Fetches one city/pollutant series and renders it.
    pub async fn visualize(
        &mut self,
        city: &str,
        pollutant: &str,
    ) -> Result<Visualization, DashboardError> {
        require_selection(city, pollutant)?;
        let backend = self.backend()?;
        let map_url = match backend.folium_map_url(city, pollutant) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "could not build map url");
                None
            }
        };
        let records = backend.pollution_data(city, pollutant).await?;

        self.show_records(city, pollutant, &records, map_url)
    }

    /// Same as [`visualize`](Self::visualize) for records loaded elsewhere.
    pub fn visualize_records(
        &mut self,
        city: &str,
        pollutant: &str,
        records: &[RawPollutionRecord],
    ) -> Result<Visualization, DashboardError> {
        require_selection(city, pollutant)?;
        self.show_records(city, pollutant, records, None)
    }

    fn show_records(
        &mut self,
        city: &str,
        pollutant: &str,
        records: &[RawPollutionRecord],
        map_url: Option<Url>,
    ) -> Result<Visualization, DashboardError> {
        let stats = aggregate::summary_stats(records).ok_or_else(|| DashboardError::NoData {
            city: city.to_string(),
            pollutant: pollutant.to_string(),
        })?;

        let buckets = aggregate::bucket_records(records);
        let yearly = aggregate::yearly_averages(records);
        let trend = aggregate::analyze_trend(&yearly);

        self.replace_chart(LineChart::monthly_by_year(pollutant, &buckets));
        info!(city, pollutant, records = records.len(), "series charted");

        Ok(Visualization {
            city: city.to_string(),
            pollutant: pollutant.to_string(),
            summary: narrative::summary_text(city, pollutant, &stats, yearly.len()),
            health: narrative::health_implications(pollutant, stats.mean),
            trend_text: narrative::trend_analysis(pollutant, trend.as_ref()),
            stats,
            trend,
            map_url,
        })
    }

    /// Fetches a prediction series and charts it.
    pub async fn predict(&mut self, query: &PredictionQuery) -> Result<&ChartHandle, DashboardError> {
        if [&query.model, &query.city, &query.year, &query.emission_type]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(DashboardError::MissingPredictionFields);
        }

        let points = self.backend()?.prediction_data(query).await?;
        if points.is_empty() {
            return Err(DashboardError::NoPredictionData);
        }

        Ok(self.replace_chart(LineChart::predictions(&points)))
    }

    /// Tears down the current chart, if any, then installs `chart`.
    fn replace_chart(&mut self, chart: LineChart) -> &ChartHandle {
        if let Some(old) = self.chart.take() {
            debug!(chart = old.id, "tearing down chart");
        }
        self.charts_drawn += 1;
        self.chart.insert(ChartHandle {
            id: self.charts_drawn,
            chart,
        })
    }
}

async fn load_catalog_from(backend: &dyn AirQualityBackend, kind: &CatalogKind) -> Catalog {
    let listing: Result<Vec<String>, RemoteError> = match kind {
        CatalogKind::Cities => backend.cities().await,
        CatalogKind::Pollutants => backend.pollutants().await,
        CatalogKind::Models => backend.models().await,
    };

    match listing {
        Ok(items) if items.is_empty() => Catalog::Empty,
        Ok(items) => Catalog::Available(items),
        Err(e) => {
            warn!(error = %e, catalog = kind.noun(), "error loading catalog");
            Catalog::Failed
        }
    }
}

fn require_selection(city: &str, pollutant: &str) -> Result<(), DashboardError> {
    if city.trim().is_empty() || pollutant.trim().is_empty() {
        return Err(DashboardError::MissingSelection);
    }
    Ok(())
}
