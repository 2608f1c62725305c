use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{DisplayedEstimate, SurveyInput, REFERENCE_AVERAGE_TONS};

/// Builds the plain-text report used when the PDF renderer is unavailable.
///
/// Figures come from `displayed` rather than a fresh estimate, so the
/// report matches what the user has on screen; `input` is echoed as the
/// form currently stands.
pub fn compose_text_report(
    displayed: &DisplayedEstimate,
    input: &SurveyInput,
    date: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "CARBON FOOTPRINT REPORT");
    let _ = writeln!(output);
    let _ = writeln!(output, "Date: {}", date.format("%-m/%-d/%Y"));
    let _ = writeln!(output);

    let _ = writeln!(output, "EMISSIONS SUMMARY");
    let _ = writeln!(
        output,
        "Total Annual Emissions: {} metric tons CO2e",
        displayed.total
    );
    let _ = writeln!(
        output,
        "Transportation Emissions: {} tons",
        displayed.transportation
    );
    let _ = writeln!(output, "Home Energy Emissions: {} tons", displayed.energy);
    let _ = writeln!(output, "Diet & Lifestyle Emissions: {} tons", displayed.diet);
    let _ = writeln!(output);

    let _ = writeln!(
        output,
        "Your carbon footprint is {}% of the US average ({} tons CO2e per year).",
        percent_of_reference(displayed.total),
        REFERENCE_AVERAGE_TONS
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "RECOMMENDATIONS");
    for (index, recommendation) in displayed.recommendations.iter().enumerate() {
        let _ = writeln!(output, "{}. {}", index + 1, recommendation);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "YOUR INPUT DATA");
    let _ = writeln!(output, "Vehicle Type: {}", input.vehicle_type.as_str());
    let _ = writeln!(output, "Fuel Type: {}", input.fuel_type.as_str());
    let _ = writeln!(output, "Kilometers Per Day: {}", input.km_per_day);
    let _ = writeln!(
        output,
        "Public Transport (hours/week): {}",
        input.transit_hours_per_week
    );
    let _ = writeln!(output, "Flights Per Year: {}", input.flights_per_year);
    let _ = writeln!(output, "Flight Hours: {}", input.hours_per_flight);
    let _ = writeln!(output);

    let _ = writeln!(
        output,
        "Electricity (kWh/month): {}",
        input.electricity_kwh_per_month
    );
    let _ = writeln!(
        output,
        "Natural Gas (therms/month): {}",
        input.gas_therms_per_month
    );
    let _ = writeln!(
        output,
        "Water Usage (liters/day): {}",
        input.water_liters_per_day
    );
    let _ = writeln!(
        output,
        "Renewable Energy: {}",
        input.renewable_energy.as_str()
    );
    let _ = writeln!(output);

    let _ = writeln!(
        output,
        "Diet Type: {}",
        input.diet_type.map(|d| d.as_str()).unwrap_or("")
    );
    let _ = writeln!(output, "Local Food Consumption: {}", input.local_food.as_str());
    let _ = writeln!(output, "Food Waste: {}", input.food_waste.as_str());
    let _ = writeln!(output, "Recycling Level: {}", input.recycling_level.as_str());
    let _ = writeln!(output);

    let _ = writeln!(output, "Generated by Carbon Footprint Tracker");
    let _ = write!(
        output,
        "Note: This is a simplified text report as the PDF generation service was unavailable."
    );

    output
}

pub fn percent_of_reference(total: f64) -> i64 {
    (total / REFERENCE_AVERAGE_TONS * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DietType, FoodWaste, FuelType, LocalFood, RecyclingLevel, RenewableEnergy, ResultSource,
        VehicleType,
    };

    fn displayed() -> DisplayedEstimate {
        DisplayedEstimate {
            total: 8.42,
            transportation: 4.1,
            energy: 2.32,
            diet: 2.0,
            recommendations: vec![
                "Walk more.".to_string(),
                "Eat local produce.".to_string(),
            ],
            exceeds_threshold: None,
            source: ResultSource::Local,
        }
    }

    fn input() -> SurveyInput {
        SurveyInput {
            vehicle_type: VehicleType::SmallCar,
            fuel_type: FuelType::Hybrid,
            km_per_day: 30.0,
            transit_hours_per_week: 2.5,
            flights_per_year: 1.0,
            hours_per_flight: 3.0,
            electricity_kwh_per_month: 220.0,
            gas_therms_per_month: 0.0,
            water_liters_per_day: 300.0,
            renewable_energy: RenewableEnergy::Significant,
            diet_type: Some(DietType::Pescatarian),
            local_food: LocalFood::Occasionally,
            food_waste: FoodWaste::Low,
            recycling_level: RecyclingLevel::Extensive,
        }
    }

    #[test]
    fn text_report_layout_is_stable() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let expected = "CARBON FOOTPRINT REPORT\n\
\n\
Date: 3/9/2024\n\
\n\
EMISSIONS SUMMARY\n\
Total Annual Emissions: 8.42 metric tons CO2e\n\
Transportation Emissions: 4.1 tons\n\
Home Energy Emissions: 2.32 tons\n\
Diet & Lifestyle Emissions: 2 tons\n\
\n\
Your carbon footprint is 53% of the US average (16 tons CO2e per year).\n\
\n\
RECOMMENDATIONS\n\
1. Walk more.\n\
2. Eat local produce.\n\
\n\
YOUR INPUT DATA\n\
Vehicle Type: small-car\n\
Fuel Type: hybrid\n\
Kilometers Per Day: 30\n\
Public Transport (hours/week): 2.5\n\
Flights Per Year: 1\n\
Flight Hours: 3\n\
\n\
Electricity (kWh/month): 220\n\
Natural Gas (therms/month): 0\n\
Water Usage (liters/day): 300\n\
Renewable Energy: significant\n\
\n\
Diet Type: pescatarian\n\
Local Food Consumption: some\n\
Food Waste: low\n\
Recycling Level: extensive\n\
\n\
Generated by Carbon Footprint Tracker\n\
Note: This is a simplified text report as the PDF generation service was unavailable.";

        assert_eq!(compose_text_report(&displayed(), &input(), date), expected);
    }

    #[test]
    fn percent_of_reference_rounds_to_whole_percent() {
        assert_eq!(percent_of_reference(8.0), 50);
        assert_eq!(percent_of_reference(8.42), 53);
        assert_eq!(percent_of_reference(32.0), 200);
    }

    #[test]
    fn missing_diet_is_echoed_blank() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let input = SurveyInput::default();
        let report = compose_text_report(&displayed(), &input, date);
        assert!(report.contains("Date: 12/25/2024\n"));
        assert!(report.contains("\nDiet Type: \n"));
    }
}
