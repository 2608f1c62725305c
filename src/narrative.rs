//! Canned text describing an air-quality result set.

use crate::aggregate::{SummaryStats, Trend, TrendDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    Ozone,
}

impl Pollutant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PM2.5" => Some(Self::Pm25),
            "PM10" => Some(Self::Pm10),
            "NO2" => Some(Self::No2),
            "SO2" => Some(Self::So2),
            "CO" => Some(Self::Co),
            "Ozone" => Some(Self::Ozone),
            _ => None,
        }
    }

    /// Upper bounds of the lower tiers, in ascending order. A level at or
    /// above the last bound falls in the top tier.
    fn tier_bounds(self) -> &'static [f64] {
        match self {
            Self::Pm25 => &[12.0, 35.0],
            Self::Pm10 => &[20.0, 50.0],
            Self::No2 => &[40.0],
            Self::So2 => &[20.0],
            Self::Co => &[4.0],
            Self::Ozone => &[100.0],
        }
    }

    fn tier_texts(self) -> &'static [&'static str] {
        match self {
            Self::Pm25 => &[
                "Current PM2.5 levels are within the WHO annual air quality guideline. At these levels, health risks are minimal for most people.",
                "Moderate PM2.5 levels may cause respiratory symptoms in sensitive individuals. People with respiratory or heart conditions, the elderly, and children should limit prolonged outdoor exertion.",
                "High PM2.5 levels can cause respiratory and cardiovascular effects in the general population. People with respiratory or heart conditions, the elderly, and children should avoid outdoor activities.",
            ],
            Self::Pm10 => &[
                "Current PM10 levels are within the WHO annual air quality guideline. At these levels, health risks are minimal for most people.",
                "Moderate PM10 levels may cause minor respiratory irritation. Sensitive individuals may experience more serious health effects.",
                "High PM10 levels can cause respiratory issues in the general population. People with respiratory conditions should limit outdoor exposure.",
            ],
            Self::No2 => &[
                "Current NO2 levels are within acceptable limits. At these levels, health risks are minimal for most people.",
                "Elevated NO2 levels can cause respiratory irritation and airway inflammation. People with asthma and other respiratory conditions may experience increased symptoms.",
            ],
            Self::So2 => &[
                "Current SO2 levels are within acceptable limits. At these levels, health risks are minimal for most people.",
                "Elevated SO2 levels can cause respiratory irritation and may trigger asthma symptoms. People with asthma should limit outdoor activities.",
            ],
            Self::Co => &[
                "Current CO levels are within acceptable limits. At these levels, health risks are minimal for most people.",
                "Elevated CO levels can reduce the blood's ability to transport oxygen, causing headaches, dizziness, and fatigue. People with heart disease may experience chest pain.",
            ],
            Self::Ozone => &[
                "Current Ozone levels are within acceptable limits. At these levels, health risks are minimal for most people.",
                "Elevated Ozone levels can cause respiratory irritation, reduced lung function, and aggravate asthma. Sensitive individuals should limit outdoor activities.",
            ],
        }
    }

    /// Index of the tier `level` falls in.
    pub fn tier(self, level: f64) -> usize {
        self.tier_bounds()
            .iter()
            .position(|bound| level < *bound)
            .unwrap_or(self.tier_bounds().len())
    }
}

pub fn health_implications(pollutant: &str, level: f64) -> String {
    match Pollutant::from_name(pollutant) {
        Some(known) => known.tier_texts()[known.tier(level)].to_string(),
        None => format!(
            "{pollutant} can have various health effects depending on concentration levels. The current average level is {level:.2}."
        ),
    }
}

pub fn summary_text(city: &str, pollutant: &str, stats: &SummaryStats, years: usize) -> String {
    format!(
        "{city} shows an average {pollutant} level of {:.2} across the analyzed time period. \
         The highest recorded value was {:.2}, while the lowest was {:.2}. \
         The data covers {years} years of measurements.",
        stats.mean, stats.max, stats.min
    )
}

pub fn trend_recommendation(pollutant: &str, direction: TrendDirection) -> String {
    match direction {
        TrendDirection::Increasing => format!(
            "This increasing trend suggests that air quality management strategies may need to be strengthened to control {pollutant} emissions in this area."
        ),
        TrendDirection::Decreasing => format!(
            "This decreasing trend suggests that current air quality management strategies may be effective in reducing {pollutant} levels in this area."
        ),
        TrendDirection::Stable => format!(
            "The stable trend suggests that current emissions of {pollutant} are neither increasing nor decreasing significantly over time."
        ),
    }
}

pub fn trend_analysis(pollutant: &str, trend: Option<&Trend>) -> String {
    let Some(trend) = trend else {
        return format!(
            "There is insufficient multi-year data to establish a clear trend for {pollutant} levels in this area."
        );
    };

    let verb = match trend.direction {
        TrendDirection::Increasing => "increased",
        TrendDirection::Decreasing => "decreased",
        TrendDirection::Stable => "remained relatively stable",
    };
    let movement = match (trend.direction, trend.percent_change) {
        (TrendDirection::Stable, _) | (_, None) => verb.to_string(),
        (_, Some(change)) => format!("{verb} by {:.1}%", change.abs()),
    };

    format!(
        "From {} to {}, {pollutant} levels have {movement}. \
         The average level in {} was {:.2}, while in {} it was {:.2}. {}",
        trend.first_year,
        trend.last_year,
        trend.first_year,
        trend.first_average,
        trend.last_year,
        trend.last_average,
        trend_recommendation(pollutant, trend.direction)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pm25_has_three_tiers() {
        assert!(health_implications("PM2.5", 8.0).starts_with("Current PM2.5 levels are within"));
        assert!(health_implications("PM2.5", 12.0).starts_with("Moderate PM2.5"));
        assert!(health_implications("PM2.5", 34.9).starts_with("Moderate PM2.5"));
        assert!(health_implications("PM2.5", 35.0).starts_with("High PM2.5"));
    }

    #[test]
    fn two_tier_pollutants_switch_at_their_bound() {
        assert!(health_implications("CO", 3.99).starts_with("Current CO"));
        assert!(health_implications("CO", 4.0).starts_with("Elevated CO"));
        assert!(health_implications("Ozone", 99.0).starts_with("Current Ozone"));
        assert!(health_implications("Ozone", 120.0).starts_with("Elevated Ozone"));
        assert_eq!(Pollutant::No2.tier(40.0), 1);
        assert_eq!(Pollutant::Pm10.tier(49.0), 1);
        assert_eq!(Pollutant::Pm10.tier(50.0), 2);
    }

    #[test]
    fn unknown_pollutant_gets_generic_sentence() {
        assert_eq!(
            health_implications("NH3", 17.456),
            "NH3 can have various health effects depending on concentration levels. The current average level is 17.46."
        );
    }

    #[test]
    fn every_tier_has_a_sentence() {
        for name in ["PM2.5", "PM10", "NO2", "SO2", "CO", "Ozone"] {
            let p = Pollutant::from_name(name).unwrap();
            assert_eq!(p.tier_texts().len(), p.tier_bounds().len() + 1);
        }
        assert_eq!(Pollutant::from_name("pm2.5"), None);
    }

    #[test]
    fn summary_mentions_stats_and_year_count() {
        let stats = SummaryStats {
            mean: 41.234,
            max: 90.0,
            min: 3.5,
            count: 10,
        };
        assert_eq!(
            summary_text("Colaba", "PM10", &stats, 3),
            "Colaba shows an average PM10 level of 41.23 across the analyzed time period. \
             The highest recorded value was 90.00, while the lowest was 3.50. \
             The data covers 3 years of measurements."
        );
    }

    #[test]
    fn increasing_trend_reports_magnitude() {
        let trend = Trend {
            first_year: 2018,
            last_year: 2022,
            first_average: 10.0,
            last_average: 11.0,
            percent_change: Some(10.000000000000002),
            direction: TrendDirection::Increasing,
        };
        let text = trend_analysis("NO2", Some(&trend));
        assert!(text.starts_with("From 2018 to 2022, NO2 levels have increased by 10.0%."));
        assert!(text.contains("The average level in 2018 was 10.00, while in 2022 it was 11.00."));
        assert!(text.ends_with("strengthened to control NO2 emissions in this area."));
    }

    #[test]
    fn rise_from_zero_has_no_percentage() {
        let trend = Trend {
            first_year: 2018,
            last_year: 2022,
            first_average: 0.0,
            last_average: 4.0,
            percent_change: None,
            direction: TrendDirection::Increasing,
        };
        let text = trend_analysis("PM10", Some(&trend));
        assert!(text.starts_with("From 2018 to 2022, PM10 levels have increased. "));
        assert!(!text.contains('%'));
        assert!(text.contains("This increasing trend suggests"));
    }

    #[test]
    fn stable_trend_wording() {
        let trend = Trend {
            first_year: 2019,
            last_year: 2020,
            first_average: 10.0,
            last_average: 10.3,
            percent_change: Some(3.0),
            direction: TrendDirection::Stable,
        };
        let text = trend_analysis("SO2", Some(&trend));
        assert!(text.contains("SO2 levels have remained relatively stable."));
        assert!(text.ends_with("neither increasing nor decreasing significantly over time."));
    }

    #[test]
    fn single_year_is_insufficient() {
        assert_eq!(
            trend_analysis("CO", None),
            "There is insufficient multi-year data to establish a clear trend for CO levels in this area."
        );
    }
}
