use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod chart;
mod client;
mod config;
mod dashboard;
mod error;
mod estimator;
mod fallback;
mod import;
mod metrics;
mod models;
mod narrative;
mod render;
mod report;

use crate::client::{AirQualityBackend, EstimatorBackend};
use crate::config::Settings;
use crate::dashboard::{AirQualityDashboard, CatalogKind, EstimatorDashboard};
use crate::metrics::PredictionModel;
use crate::models::{
    parse_quantity, DietType, FoodWaste, FuelType, LocalFood, PredictionQuery, RecyclingLevel,
    RenewableEnergy, SurveyInput, UnitSystem, VehicleType,
};

#[derive(Parser)]
#[command(name = "carbon-air-dashboard")]
#[command(about = "Carbon footprint estimator and air-quality viewer", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate an annual carbon footprint
    Estimate {
        #[command(flatten)]
        survey: SurveyArgs,
    },
    /// Estimate, then save a report of the displayed figures
    Report {
        #[command(flatten)]
        survey: SurveyArgs,
        /// Output path; the extension follows the report format
        #[arg(long, default_value = "carbon-footprint-report")]
        out: PathBuf,
    },
    /// List the cities, pollutants or prediction models on offer
    Catalog {
        #[arg(value_enum)]
        kind: CatalogKind,
    },
    /// Chart a city's pollutant history with summary and trend narrative
    Visualize {
        #[arg(long)]
        city: String,
        #[arg(long)]
        pollutant: String,
        /// Read `year,date,value` rows from a CSV file instead of the service
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Chart a model's predicted series
    Predict {
        #[arg(long)]
        model: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        year: String,
        #[arg(long)]
        emission_type: String,
    },
    /// Show accuracy figures and a description for a prediction model
    ModelInfo {
        #[arg(long)]
        model: String,
    },
    /// Print the URL of a map with a single marker
    Marker {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        label: Option<String>,
    },
}

#[derive(Debug, Args)]
struct SurveyArgs {
    #[arg(long, value_enum, default_value_t)]
    vehicle_type: VehicleType,
    #[arg(long, value_enum, default_value_t)]
    fuel_type: FuelType,
    /// Daily driving distance (km, or miles with --units imperial)
    #[arg(long)]
    distance_per_day: Option<String>,
    #[arg(long)]
    transit_hours_per_week: Option<String>,
    #[arg(long)]
    flights_per_year: Option<String>,
    #[arg(long)]
    hours_per_flight: Option<String>,
    #[arg(long)]
    electricity_kwh: Option<String>,
    #[arg(long)]
    gas_therms: Option<String>,
    /// Daily water use (litres, or US gallons with --units imperial)
    #[arg(long)]
    water_per_day: Option<String>,
    #[arg(long, value_enum, default_value_t)]
    renewable_energy: RenewableEnergy,
    #[arg(long, value_enum)]
    diet_type: Option<DietType>,
    #[arg(long, value_enum, default_value_t)]
    local_food: LocalFood,
    #[arg(long, value_enum, default_value_t)]
    food_waste: FoodWaste,
    #[arg(long, value_enum, default_value_t)]
    recycling_level: RecyclingLevel,
    #[arg(long, value_enum, default_value_t)]
    units: UnitSystem,
}

impl SurveyArgs {
    fn to_input(&self) -> SurveyInput {
        SurveyInput {
            vehicle_type: self.vehicle_type,
            fuel_type: self.fuel_type,
            km_per_day: parse_quantity(self.distance_per_day.as_deref()),
            transit_hours_per_week: parse_quantity(self.transit_hours_per_week.as_deref()),
            flights_per_year: parse_quantity(self.flights_per_year.as_deref()),
            hours_per_flight: parse_quantity(self.hours_per_flight.as_deref()),
            electricity_kwh_per_month: parse_quantity(self.electricity_kwh.as_deref()),
            gas_therms_per_month: parse_quantity(self.gas_therms.as_deref()),
            water_liters_per_day: parse_quantity(self.water_per_day.as_deref()),
            renewable_energy: self.renewable_energy,
            diet_type: self.diet_type,
            local_food: self.local_food,
            food_waste: self.food_waste,
            recycling_level: self.recycling_level,
        }
        .normalized(self.units)
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 if quiet => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn estimator_dashboard(settings: &Settings) -> anyhow::Result<EstimatorDashboard> {
    let backend = settings
        .estimator_backend()
        .context("failed to set up the estimator client")?
        .map(|b| {
            debug!(url = b.base_url(), "estimator service configured");
            Box::new(b) as Box<dyn EstimatorBackend>
        });
    Ok(EstimatorDashboard::new(backend))
}

fn air_quality_dashboard(settings: &Settings) -> anyhow::Result<AirQualityDashboard> {
    let backend = settings
        .air_quality_backend()
        .context("failed to set up the air-quality client")?
        .map(|b| {
            debug!(url = b.base_url(), "air-quality service configured");
            Box::new(b) as Box<dyn AirQualityBackend>
        });
    Ok(AirQualityDashboard::new(backend))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Estimate { survey } => {
            let mut dashboard = estimator_dashboard(&cli.settings)?;
            dashboard.calculate(&survey.to_input()).await?;
            if let Some(displayed) = dashboard.displayed() {
                print!("{}", render::estimate(displayed));
            }
        }
        Commands::Report { survey, out } => {
            let input = survey.to_input();
            let mut dashboard = estimator_dashboard(&cli.settings)?;
            dashboard.calculate(&input).await?;
            if let Some(displayed) = dashboard.displayed() {
                print!("{}", render::estimate(displayed));
            }

            let today = chrono::Local::now().date_naive();
            let report = dashboard.download_report(&input, today).await?;
            if let Some(notice) = report.notice() {
                eprintln!("{notice}");
            }

            let path = out.with_extension(report.file_extension());
            std::fs::write(&path, report.bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        Commands::Catalog { kind } => {
            let dashboard = air_quality_dashboard(&cli.settings)?;
            let catalog = dashboard.load_catalog(kind).await;
            match catalog.placeholder(&kind) {
                Some(placeholder) => println!("{placeholder}"),
                None => {
                    if let dashboard::Catalog::Available(items) = catalog {
                        for item in items {
                            println!("{item}");
                        }
                    }
                }
            }
        }
        Commands::Visualize {
            city,
            pollutant,
            csv,
        } => {
            let mut dashboard = air_quality_dashboard(&cli.settings)?;
            let view = match csv {
                Some(path) => {
                    let records = import::read_pollution_csv(&path)?;
                    dashboard.visualize_records(&city, &pollutant, &records)?
                }
                None => dashboard.visualize(&city, &pollutant).await?,
            };

            print!("{}", render::visualization(&view));
            if let Some(handle) = dashboard.chart() {
                println!();
                print!("{}", render::chart(&handle.chart));
            }
        }
        Commands::Predict {
            model,
            city,
            year,
            emission_type,
        } => {
            let mut dashboard = air_quality_dashboard(&cli.settings)?;
            let query = PredictionQuery {
                model,
                city,
                year,
                emission_type,
            };
            let handle = dashboard.predict(&query).await?;
            print!("{}", render::chart(&handle.chart));

            if let Some(model) = PredictionModel::lookup(&query.model) {
                println!();
                print!("{}", render::model_info(model));
            }
        }
        Commands::ModelInfo { model } => {
            let known = PredictionModel::lookup(&model)
                .with_context(|| format!("no description available for model {model}"))?;
            print!("{}", render::model_info(known));
        }
        Commands::Marker { lat, lon, label } => {
            let backend = cli
                .settings
                .air_quality_backend()?
                .context("map URLs need the air-quality service; drop --offline")?;
            let url = backend.leaflet_marker_url(lat, lon, label.as_deref())?;
            println!("{url}");
        }
    }

    Ok(())
}
