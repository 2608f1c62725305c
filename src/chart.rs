use crate::aggregate::{YearlyMonthly, MONTH_LABELS};
use crate::models::PredictionPoint;

const PALETTE: [&str; 6] = [
    "#4C6EF5", "#F59E0B", "#EF4444", "#10B981", "#8B5CF6", "#EC4899",
];
const PREDICTION_COLOR: &str = "rgba(75, 192, 192, 1)";

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub color: &'static str,
    /// `None` marks a slot with no data; renderers leave a gap there.
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl LineChart {
    /// One line per year across the twelve months.
    pub fn monthly_by_year(pollutant: &str, buckets: &YearlyMonthly) -> Self {
        let datasets = buckets
            .monthly_averages()
            .into_iter()
            .enumerate()
            .map(|(index, (year, months))| Dataset {
                label: year.to_string(),
                color: PALETTE[index % PALETTE.len()],
                points: months.to_vec(),
            })
            .collect();

        Self {
            title: format!("Monthly Average {pollutant} Levels By Year"),
            x_label: "Month".to_string(),
            y_label: format!("{pollutant} Level"),
            labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
            datasets,
        }
    }

    pub fn predictions(points: &[PredictionPoint]) -> Self {
        Self {
            title: "Prediction Values".to_string(),
            x_label: "Year".to_string(),
            y_label: "Prediction Value".to_string(),
            labels: points.iter().map(|p| p.date.clone()).collect(),
            datasets: vec![Dataset {
                label: "Prediction Values".to_string(),
                color: PREDICTION_COLOR,
                points: points.iter().map(|p| Some(p.prediction_value)).collect(),
            }],
        }
    }
}

/// The single live chart owned by a dashboard. A new handle is issued for
/// every chart drawn; the old one is torn down first.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub id: u64,
    pub chart: LineChart,
}
