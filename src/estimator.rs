use crate::models::{
    DietType, EmissionBreakdown, EstimationResult, FoodWaste, FuelType, LocalFood,
    RecyclingLevel, RenewableEnergy, SurveyInput, VehicleType,
};

const DAYS_PER_YEAR: f64 = 365.0;
const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;
const KG_PER_TON: f64 = 1000.0;

const TRANSIT_KG_PER_HOUR: f64 = 2.5;
const FLIGHT_KG_PER_HOUR: f64 = 90.0;
const GRID_KG_PER_KWH: f64 = 0.42;
const GAS_KG_PER_THERM: f64 = 5.3;
const WATER_KG_PER_KILOLITER: f64 = 1.2;
const WASTE_BASE_TONS: f64 = 1.5;

pub const LOCAL_RECOMMENDATIONS: [&str; 3] = [
    "Consider using public transportation more frequently to reduce emissions.",
    "Reducing meat consumption can significantly lower your carbon footprint.",
    "Installing energy-efficient appliances can help reduce your home energy emissions.",
];

pub fn estimate(input: &SurveyInput) -> EstimationResult {
    let breakdown = EmissionBreakdown::new(
        transportation_tons(input),
        energy_tons(input),
        diet_tons(input),
    );

    EstimationResult {
        breakdown,
        recommendations: LOCAL_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        exceeds_threshold: None,
    }
}

/// kg CO2 per kilometre for a vehicle class burning a given fuel.
/// `None` when there is no vehicle.
pub fn vehicle_factor(vehicle: VehicleType, fuel: FuelType) -> Option<f64> {
    use FuelType::*;

    let factor = match (vehicle, fuel) {
        (VehicleType::None, _) => return None,
        (VehicleType::Motorcycle, _) => 0.11,
        (VehicleType::SmallCar, Gasoline | Petrol) => 0.2,
        (VehicleType::SmallCar, Diesel) => 0.17,
        (VehicleType::SmallCar, Hybrid) => 0.12,
        (VehicleType::MediumCar, Gasoline | Petrol) => 0.26,
        (VehicleType::MediumCar, Diesel) => 0.23,
        (VehicleType::MediumCar, Hybrid) => 0.14,
        (VehicleType::LargeCar, Gasoline | Petrol) => 0.36,
        (VehicleType::LargeCar, Diesel) => 0.32,
        (VehicleType::LargeCar, Hybrid) => 0.19,
        (_, Electric) => 0.06,
    };
    Some(factor)
}

pub fn renewable_multiplier(level: RenewableEnergy) -> f64 {
    match level {
        RenewableEnergy::None => 1.0,
        RenewableEnergy::Partial => 0.7,
        RenewableEnergy::Significant => 0.3,
        RenewableEnergy::Complete => 0.0,
    }
}

pub fn diet_base_tons(diet: Option<DietType>) -> f64 {
    match diet {
        Some(DietType::MeatHeavy) => 3.3,
        Some(DietType::MeatMedium) => 2.5,
        Some(DietType::Pescatarian) => 1.9,
        Some(DietType::Vegetarian) => 1.7,
        Some(DietType::Vegan) => 1.5,
        None => 0.0,
    }
}

pub fn local_food_factor(level: LocalFood) -> f64 {
    match level {
        LocalFood::Mostly => 0.9,
        LocalFood::Half => 0.95,
        LocalFood::Occasionally => 0.98,
        LocalFood::VeryLittle => 1.0,
    }
}

pub fn food_waste_factor(level: FoodWaste) -> f64 {
    match level {
        FoodWaste::Minimal => 1.0,
        FoodWaste::Low => 1.05,
        FoodWaste::Average => 1.1,
        FoodWaste::High => 1.2,
        FoodWaste::VeryHigh => 1.3,
    }
}

pub fn recycling_reduction(level: RecyclingLevel) -> f64 {
    match level {
        RecyclingLevel::None => 0.0,
        RecyclingLevel::Minimal => 0.1,
        RecyclingLevel::Moderate => 0.3,
        RecyclingLevel::Extensive => 0.5,
        RecyclingLevel::ZeroWaste => 0.8,
    }
}

pub fn transportation_tons(input: &SurveyInput) -> f64 {
    let mut kg = 0.0;

    if input.km_per_day > 0.0 {
        if let Some(factor) = vehicle_factor(input.vehicle_type, input.fuel_type) {
            kg += input.km_per_day * DAYS_PER_YEAR * factor;
        }
    }

    kg += input.transit_hours_per_week * WEEKS_PER_YEAR * TRANSIT_KG_PER_HOUR;
    kg += input.flights_per_year * input.hours_per_flight * FLIGHT_KG_PER_HOUR;

    kg / KG_PER_TON
}

pub fn energy_tons(input: &SurveyInput) -> f64 {
    let grid_factor = GRID_KG_PER_KWH * renewable_multiplier(input.renewable_energy);
    let electricity_kg = input.electricity_kwh_per_month * MONTHS_PER_YEAR * grid_factor;
    let gas_kg = input.gas_therms_per_month * MONTHS_PER_YEAR * GAS_KG_PER_THERM;
    // litres -> kilolitres, then the factor is per kilolitre
    let water_kg = input.water_liters_per_day * DAYS_PER_YEAR * WATER_KG_PER_KILOLITER / 1000.0;

    (electricity_kg + gas_kg + water_kg) / KG_PER_TON
}

pub fn diet_tons(input: &SurveyInput) -> f64 {
    let food = diet_base_tons(input.diet_type)
        * local_food_factor(input.local_food)
        * food_waste_factor(input.food_waste);
    let waste = WASTE_BASE_TONS * (1.0 - recycling_reduction(input.recycling_level));

    food + waste
}
