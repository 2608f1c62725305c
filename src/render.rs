//! Plain-text rendering for the terminal.

use std::fmt::Write;

use crate::chart::LineChart;
use crate::dashboard::Visualization;
use crate::metrics::PredictionModel;
use crate::models::{DisplayedEstimate, ResultSource};

const BAR_WIDTH: usize = 30;

fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn estimate(displayed: &DisplayedEstimate) -> String {
    let mut output = String::new();
    let source = match displayed.source {
        ResultSource::Remote => "estimator service",
        ResultSource::Local => "local model",
    };

    let _ = writeln!(output, "Annual footprint: {} tons CO2e ({source})", displayed.total);
    let _ = writeln!(
        output,
        "  vs. US average {} {:.0}%",
        bar(displayed.footprint_percent()),
        displayed.footprint_percent()
    );
    if let Some(exceeds) = displayed.exceeds_threshold {
        let _ = writeln!(
            output,
            "  {}",
            if exceeds {
                "Above the recommended threshold."
            } else {
                "Within the recommended threshold."
            }
        );
    }

    let [transport, energy, diet] = displayed.category_shares();
    let _ = writeln!(output);
    for (label, tons, share) in [
        ("Transportation", displayed.transportation, transport),
        ("Home energy", displayed.energy, energy),
        ("Diet & lifestyle", displayed.diet, diet),
    ] {
        let _ = writeln!(output, "  {label:<17} {} {tons} tons", bar(share));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Recommendations:");
    for recommendation in &displayed.recommendations {
        let _ = writeln!(output, "- {recommendation}");
    }

    output
}

pub fn chart(chart: &LineChart) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", chart.title);
    let _ = writeln!(output, "{} / {}", chart.x_label, chart.y_label);

    let _ = write!(output, "{:<12}", "");
    for dataset in &chart.datasets {
        let _ = write!(output, "{:>12}", dataset.label);
    }
    let _ = writeln!(output);

    for (row, label) in chart.labels.iter().enumerate() {
        let _ = write!(output, "{label:<12}");
        for dataset in &chart.datasets {
            match dataset.points.get(row).copied().flatten() {
                Some(value) => {
                    let _ = write!(output, "{value:>12.2}");
                }
                None => {
                    let _ = write!(output, "{:>12}", "-");
                }
            }
        }
        let _ = writeln!(output);
    }

    output
}

pub fn visualization(view: &Visualization) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{} / {}", view.city, view.pollutant);
    let _ = writeln!(
        output,
        "Average {:.2}  Max {:.2}  Min {:.2}  ({} readings)",
        view.stats.mean, view.stats.max, view.stats.min, view.stats.count
    );
    if let Some(trend) = &view.trend {
        let _ = writeln!(
            output,
            "Trend {}-{}: {}",
            trend.first_year,
            trend.last_year,
            trend.direction.as_str()
        );
    }
    if let Some(url) = &view.map_url {
        let _ = writeln!(output, "Map: {url}");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "{}", view.summary);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Health Implications");
    let _ = writeln!(output, "{}", view.health);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend Analysis");
    let _ = writeln!(output, "{}", view.trend_text);

    output
}

pub fn model_info(model: PredictionModel) -> String {
    let metrics = model.metrics();
    let mut output = String::new();

    let _ = writeln!(output, "{} ({})", model.display_name(), model.code());
    let _ = writeln!(output, "{}", model.description());
    let _ = writeln!(output);
    let _ = writeln!(output, "MAE   {}", metrics.mae_text());
    let _ = writeln!(output, "R2    {}", metrics.r2_text());
    let _ = writeln!(output, "MAPE  {}", metrics.mape_text());

    output
}
