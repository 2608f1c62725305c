use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InputError;

pub const KM_PER_MILE: f64 = 1.609344;
pub const LITERS_PER_GALLON: f64 = 3.785411784;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleType {
    #[default]
    None,
    SmallCar,
    MediumCar,
    LargeCar,
    Motorcycle,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SmallCar => "small-car",
            Self::MediumCar => "medium-car",
            Self::LargeCar => "large-car",
            Self::Motorcycle => "motorcycle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FuelType {
    #[default]
    Gasoline,
    Petrol,
    Diesel,
    Hybrid,
    Electric,
}

impl FuelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gasoline => "gasoline",
            Self::Petrol => "petrol",
            Self::Diesel => "diesel",
            Self::Hybrid => "hybrid",
            Self::Electric => "electric",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenewableEnergy {
    #[default]
    None,
    Partial,
    Significant,
    Complete,
}

impl RenewableEnergy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Partial => "partial",
            Self::Significant => "significant",
            Self::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietType {
    MeatHeavy,
    MeatMedium,
    Pescatarian,
    Vegetarian,
    Vegan,
}

impl DietType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MeatHeavy => "meat-heavy",
            Self::MeatMedium => "meat-medium",
            Self::Pescatarian => "pescatarian",
            Self::Vegetarian => "vegetarian",
            Self::Vegan => "vegan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalFood {
    Mostly,
    Half,
    #[value(name = "some")]
    #[serde(rename = "some")]
    Occasionally,
    #[default]
    VeryLittle,
}

impl LocalFood {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mostly => "mostly",
            Self::Half => "half",
            Self::Occasionally => "some",
            Self::VeryLittle => "very-little",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodWaste {
    #[default]
    Minimal,
    Low,
    Average,
    High,
    VeryHigh,
}

impl FoodWaste {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Average => "average",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecyclingLevel {
    #[default]
    None,
    Minimal,
    Moderate,
    Extensive,
    ZeroWaste,
}

impl RecyclingLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minimal => "minimal",
            Self::Moderate => "moderate",
            Self::Extensive => "extensive",
            Self::ZeroWaste => "zero-waste",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// One filled-in survey, always held in metric working units
/// (kilometres per day, litres per day).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyInput {
    pub vehicle_type: VehicleType,
    pub fuel_type: FuelType,
    pub km_per_day: f64,
    pub transit_hours_per_week: f64,
    pub flights_per_year: f64,
    pub hours_per_flight: f64,
    pub electricity_kwh_per_month: f64,
    pub gas_therms_per_month: f64,
    pub water_liters_per_day: f64,
    pub renewable_energy: RenewableEnergy,
    pub diet_type: Option<DietType>,
    pub local_food: LocalFood,
    pub food_waste: FoodWaste,
    pub recycling_level: RecyclingLevel,
}

impl SurveyInput {
    /// Converts distance and volume fields entered in `units` into the
    /// metric working units.
    pub fn normalized(mut self, units: UnitSystem) -> Self {
        if units == UnitSystem::Imperial {
            self.km_per_day *= KM_PER_MILE;
            self.water_liters_per_day *= LITERS_PER_GALLON;
        }
        self
    }

    pub fn quantities(&self) -> [(&'static str, f64); 7] {
        [
            ("km_per_day", self.km_per_day),
            ("transit_hours_per_week", self.transit_hours_per_week),
            ("flights_per_year", self.flights_per_year),
            ("hours_per_flight", self.hours_per_flight),
            ("electricity_kwh_per_month", self.electricity_kwh_per_month),
            ("gas_therms_per_month", self.gas_therms_per_month),
            ("water_liters_per_day", self.water_liters_per_day),
        ]
    }

    pub fn validate(&self) -> Result<(), InputError> {
        for (field, value) in self.quantities() {
            if !value.is_finite() {
                return Err(InputError::NotFinite { field });
            }
            if value < 0.0 {
                return Err(InputError::Negative { field, value });
            }
        }
        Ok(())
    }
}

/// Reads a form quantity the way the survey treats free text: blank or
/// non-numeric entries count as zero. `nan` and `inf` are text here too.
pub fn parse_quantity(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Annual emissions in metric tons CO2e.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionBreakdown {
    pub transportation: f64,
    pub energy: f64,
    pub diet: f64,
    pub total: f64,
}

impl EmissionBreakdown {
    pub fn new(transportation: f64, energy: f64, diet: f64) -> Self {
        Self {
            transportation,
            energy,
            diet,
            total: transportation + energy + diet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationResult {
    pub breakdown: EmissionBreakdown,
    pub recommendations: Vec<String>,
    pub exceeds_threshold: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Local,
    Remote,
}

/// Figures as they were last shown to the user, rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedEstimate {
    pub total: f64,
    pub transportation: f64,
    pub energy: f64,
    pub diet: f64,
    pub recommendations: Vec<String>,
    pub exceeds_threshold: Option<bool>,
    pub source: ResultSource,
}

pub const REFERENCE_AVERAGE_TONS: f64 = 16.0;

impl DisplayedEstimate {
    pub fn from_result(result: &EstimationResult, source: ResultSource) -> Self {
        let breakdown = &result.breakdown;
        Self {
            total: round2(breakdown.total),
            transportation: round2(breakdown.transportation),
            energy: round2(breakdown.energy),
            diet: round2(breakdown.diet),
            recommendations: result.recommendations.clone(),
            exceeds_threshold: result.exceeds_threshold,
            source,
        }
    }

    /// Width of the footprint bar as a percentage of the reference average.
    pub fn footprint_percent(&self) -> f64 {
        (self.total / REFERENCE_AVERAGE_TONS * 100.0).min(100.0)
    }

    /// Each category's share of the displayed category sum, in percent.
    pub fn category_shares(&self) -> [f64; 3] {
        let sum = self.transportation + self.energy + self.diet;
        if sum <= 0.0 {
            return [0.0; 3];
        }
        [
            self.transportation / sum * 100.0,
            self.energy / sum * 100.0,
            self.diet / sum * 100.0,
        ]
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A pollution reading exactly as the feed delivered it. Any field may be
/// missing or carry the wrong JSON type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPollutionRecord {
    pub year: Option<Value>,
    pub date: Option<String>,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollutionRecord {
    pub year: i32,
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: String,
    pub prediction_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionQuery {
    pub model: String,
    pub city: String,
    pub year: String,
    pub emission_type: String,
}
