//! HTTP access to the estimator and air-quality services.
//!
//! Both services are consumed through the [`EstimatorBackend`] and
//! [`AirQualityBackend`] traits so the fallback logic never depends on a
//! live network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RemoteError;
use crate::models::{
    EmissionBreakdown, EstimationResult, PredictionPoint, PredictionQuery, RawPollutionRecord,
    SurveyInput,
};

pub const PDF_MIME: &str = "application/pdf";

/// Largest gap tolerated between a remote total and the sum of its parts.
const TOTAL_TOLERANCE_TONS: f64 = 0.01;

/// Request body for both `/api/calculate-emissions` and
/// `/api/generate-report`. Distances travel in kilometres and water in
/// litres, under the service's historical field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionRequest {
    pub vehicle_type: &'static str,
    pub fuel_type: &'static str,
    pub miles_per_day: f64,
    pub public_transport: f64,
    pub flights_per_year: f64,
    pub flight_hours: f64,
    pub electricity_kwh: f64,
    pub gas_usage: f64,
    pub water_usage: f64,
    pub renewable_energy: &'static str,
    pub diet_type: &'static str,
    pub local_food: &'static str,
    pub food_waste: &'static str,
    pub recycling_level: &'static str,
}

impl From<&SurveyInput> for EmissionRequest {
    fn from(input: &SurveyInput) -> Self {
        Self {
            vehicle_type: input.vehicle_type.as_str(),
            fuel_type: input.fuel_type.as_str(),
            miles_per_day: input.km_per_day,
            public_transport: input.transit_hours_per_week,
            flights_per_year: input.flights_per_year,
            flight_hours: input.hours_per_flight,
            electricity_kwh: input.electricity_kwh_per_month,
            gas_usage: input.gas_therms_per_month,
            water_usage: input.water_liters_per_day,
            renewable_energy: input.renewable_energy.as_str(),
            diet_type: input.diet_type.map(|d| d.as_str()).unwrap_or(""),
            local_food: input.local_food.as_str(),
            food_waste: input.food_waste.as_str(),
            recycling_level: input.recycling_level.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmissionResponse {
    pub total_emissions: f64,
    pub transportation_emissions: f64,
    pub energy_emissions: f64,
    pub diet_emissions: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub exceeds_threshold: Option<bool>,
}

impl TryFrom<EmissionResponse> for EstimationResult {
    type Error = RemoteError;

    fn try_from(response: EmissionResponse) -> Result<Self, Self::Error> {
        let parts = [
            response.total_emissions,
            response.transportation_emissions,
            response.energy_emissions,
            response.diet_emissions,
        ];
        if parts.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RemoteError::Malformed {
                message: "emission figures must be non-negative numbers".to_string(),
            });
        }

        let breakdown = EmissionBreakdown::new(
            response.transportation_emissions,
            response.energy_emissions,
            response.diet_emissions,
        );
        if (breakdown.total - response.total_emissions).abs() > TOTAL_TOLERANCE_TONS {
            return Err(RemoteError::Malformed {
                message: format!(
                    "total {} does not match category sum {}",
                    response.total_emissions, breakdown.total
                ),
            });
        }

        Ok(EstimationResult {
            breakdown,
            recommendations: response.recommendations,
            exceeds_threshold: response.exceeds_threshold,
        })
    }
}

/// A rendered report as returned by the remote renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfDocument(pub Vec<u8>);

#[async_trait]
pub trait EstimatorBackend: Send + Sync {
    /// Liveness probe; any success status counts as live.
    async fn probe(&self) -> Result<(), RemoteError>;

    async fn calculate_emissions(
        &self,
        request: &EmissionRequest,
    ) -> Result<EmissionResponse, RemoteError>;

    async fn generate_report(&self, request: &EmissionRequest) -> Result<PdfDocument, RemoteError>;
}

#[async_trait]
pub trait AirQualityBackend: Send + Sync {
    async fn cities(&self) -> Result<Vec<String>, RemoteError>;

    async fn pollutants(&self) -> Result<Vec<String>, RemoteError>;

    async fn models(&self) -> Result<Vec<String>, RemoteError>;

    async fn pollution_data(
        &self,
        city: &str,
        pollutant: &str,
    ) -> Result<Vec<RawPollutionRecord>, RemoteError>;

    async fn prediction_data(
        &self,
        query: &PredictionQuery,
    ) -> Result<Vec<PredictionPoint>, RemoteError>;

    /// URL of the embeddable heat map for a city and pollutant.
    fn folium_map_url(&self, city: &str, pollutant: &str) -> Result<Url, RemoteError>;

    /// URL of an embeddable map with a single labelled marker.
    fn leaflet_marker_url(&self, lat: f64, lon: f64, label: Option<&str>)
        -> Result<Url, RemoteError>;
}

#[derive(Deserialize)]
struct CitiesResponse {
    #[serde(default)]
    cities: Vec<String>,
}

#[derive(Deserialize)]
struct PollutantsResponse {
    #[serde(default)]
    pollutants: Vec<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<String>,
}

#[derive(Deserialize)]
struct DataResponse<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        probe_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RemoteError::from_transport(base_url, e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            probe_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn document_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, RemoteError> {
        let endpoint = self.endpoint(path);
        Url::parse_with_params(&endpoint, params).map_err(|e| RemoteError::Malformed {
            message: format!("invalid url {endpoint}: {e}"),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let url = self.endpoint(path);
        debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| RemoteError::from_transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Malformed {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl EstimatorBackend for HttpBackend {
    async fn probe(&self) -> Result<(), RemoteError> {
        let url = self.endpoint("/");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| RemoteError::from_transport(&url, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RemoteError::Rejected {
                status: response.status().as_u16(),
            })
        }
    }

    async fn calculate_emissions(
        &self,
        request: &EmissionRequest,
    ) -> Result<EmissionResponse, RemoteError> {
        let url = self.endpoint("/api/calculate-emissions");
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RemoteError::from_transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
            });
        }

        response
            .json::<EmissionResponse>()
            .await
            .map_err(|e| RemoteError::Malformed {
                message: e.to_string(),
            })
    }

    async fn generate_report(&self, request: &EmissionRequest) -> Result<PdfDocument, RemoteError> {
        let url = self.endpoint("/api/generate-report");
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, PDF_MIME)
            .json(request)
            .send()
            .await
            .map_err(|e| RemoteError::from_transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        ensure_pdf(&content_type)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::from_transport(&url, e))?;
        Ok(PdfDocument(bytes.to_vec()))
    }
}

#[async_trait]
impl AirQualityBackend for HttpBackend {
    async fn cities(&self) -> Result<Vec<String>, RemoteError> {
        let body: CitiesResponse = self.get_json("/api/cities", &[]).await?;
        Ok(body.cities)
    }

    async fn pollutants(&self) -> Result<Vec<String>, RemoteError> {
        let body: PollutantsResponse = self.get_json("/api/pollutants", &[]).await?;
        Ok(body.pollutants)
    }

    async fn models(&self) -> Result<Vec<String>, RemoteError> {
        let body: ModelsResponse = self.get_json("/api/models", &[]).await?;
        Ok(body.models)
    }

    async fn pollution_data(
        &self,
        city: &str,
        pollutant: &str,
    ) -> Result<Vec<RawPollutionRecord>, RemoteError> {
        let body: DataResponse<RawPollutionRecord> = self
            .get_json(
                "/api/pollution-data",
                &[("city", city), ("pollutant", pollutant)],
            )
            .await?;
        Ok(body.data)
    }

    async fn prediction_data(
        &self,
        query: &PredictionQuery,
    ) -> Result<Vec<PredictionPoint>, RemoteError> {
        let body: DataResponse<PredictionPoint> = self
            .get_json(
                "/api/prediction-data",
                &[
                    ("model", query.model.as_str()),
                    ("city", query.city.as_str()),
                    ("year", query.year.as_str()),
                    ("emission_type", query.emission_type.as_str()),
                ],
            )
            .await?;
        Ok(body.data)
    }

    fn folium_map_url(&self, city: &str, pollutant: &str) -> Result<Url, RemoteError> {
        self.document_url(
            "/api/folium-map",
            &[("city", city.to_string()), ("pollutant", pollutant.to_string())],
        )
    }

    fn leaflet_marker_url(
        &self,
        lat: f64,
        lon: f64,
        label: Option<&str>,
    ) -> Result<Url, RemoteError> {
        self.document_url(
            "/api/leaflet-marker",
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("label", label.unwrap_or("Selected Location").to_string()),
            ],
        )
    }
}

/// Accepts only a PDF content type, ignoring parameters such as charset.
pub fn ensure_pdf(content_type: &str) -> Result<(), RemoteError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if essence == PDF_MIME {
        Ok(())
    } else {
        Err(RemoteError::UnexpectedContentType {
            expected: PDF_MIME,
            received: if essence.is_empty() {
                "no content type".to_string()
            } else {
                essence
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DietType, FuelType, VehicleType};

    fn backend() -> HttpBackend {
        HttpBackend::new(
            "http://localhost:8001/",
            Duration::from_millis(3000),
            Duration::from_secs(30),
        )
        .unwrap()
    }

    #[test]
    fn request_carries_metric_units_under_service_names() {
        let input = SurveyInput {
            vehicle_type: VehicleType::SmallCar,
            fuel_type: FuelType::Petrol,
            km_per_day: 12.0,
            water_liters_per_day: 150.0,
            diet_type: Some(DietType::Vegan),
            ..SurveyInput::default()
        };
        let body = serde_json::to_value(EmissionRequest::from(&input)).unwrap();
        assert_eq!(body["vehicle_type"], "small-car");
        assert_eq!(body["fuel_type"], "petrol");
        assert_eq!(body["miles_per_day"], 12.0);
        assert_eq!(body["water_usage"], 150.0);
        assert_eq!(body["diet_type"], "vegan");
        assert_eq!(body["recycling_level"], "none");
    }

    #[test]
    fn missing_diet_is_sent_as_empty_string() {
        let body = serde_json::to_value(EmissionRequest::from(&SurveyInput::default())).unwrap();
        assert_eq!(body["diet_type"], "");
    }

    #[test]
    fn response_with_consistent_total_converts() {
        let response: EmissionResponse = serde_json::from_str(
            r#"{"total_emissions": 6.0, "transportation_emissions": 3.0,
                "energy_emissions": 2.0, "diet_emissions": 1.0,
                "recommendations": ["Fly less."], "exceeds_threshold": false}"#,
        )
        .unwrap();
        let result = EstimationResult::try_from(response).unwrap();
        assert_eq!(result.breakdown.total, 6.0);
        assert_eq!(result.recommendations, vec!["Fly less.".to_string()]);
        assert_eq!(result.exceeds_threshold, Some(false));
    }

    #[test]
    fn response_with_inconsistent_total_is_malformed() {
        let response = EmissionResponse {
            total_emissions: 9.0,
            transportation_emissions: 3.0,
            energy_emissions: 2.0,
            diet_emissions: 1.0,
            recommendations: vec![],
            exceeds_threshold: None,
        };
        assert!(matches!(
            EstimationResult::try_from(response),
            Err(RemoteError::Malformed { .. })
        ));
    }

    #[test]
    fn negative_remote_figures_are_malformed() {
        let response = EmissionResponse {
            total_emissions: 0.0,
            transportation_emissions: -1.0,
            energy_emissions: 1.0,
            diet_emissions: 0.0,
            recommendations: vec![],
            exceeds_threshold: None,
        };
        assert!(EstimationResult::try_from(response).is_err());
    }

    #[test]
    fn pdf_content_type_check() {
        assert!(ensure_pdf("application/pdf").is_ok());
        assert!(ensure_pdf("Application/PDF; charset=binary").is_ok());
        assert!(matches!(
            ensure_pdf("text/html; charset=utf-8"),
            Err(RemoteError::UnexpectedContentType { .. })
        ));
        assert!(ensure_pdf("").is_err());
    }

    #[test]
    fn map_urls_are_query_encoded() {
        let backend = backend();
        assert_eq!(backend.base_url(), "http://localhost:8001");

        let url = backend.folium_map_url("Navi Mumbai", "PM2.5").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8001/api/folium-map?city=Navi+Mumbai&pollutant=PM2.5"
        );

        let marker = backend.leaflet_marker_url(18.99, 72.81, None).unwrap();
        assert_eq!(
            marker.as_str(),
            "http://localhost:8001/api/leaflet-marker?lat=18.99&lon=72.81&label=Selected+Location"
        );
    }

    #[test]
    fn pollution_feed_tolerates_string_years_and_extra_fields() {
        let body: DataResponse<RawPollutionRecord> = serde_json::from_str(
            r#"{"data": [{"date": "2020-01-15", "year": "2020", "value": 41.5,
                          "latitude": 19.0, "longitude": 72.8, "city": "Colaba"},
                         {"date": "2020-01-16"}]}"#,
        )
        .unwrap();
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data[0].year, Some(serde_json::json!("2020")));
        assert_eq!(body.data[1].value, None);
    }
}
