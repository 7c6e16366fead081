//! Google Geocoding API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    Res,
    config::GeocodingSettings,
    error::{AppError, Service},
    types::Coordinates,
};

/// Resolves a place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service knows no such place.
    async fn geocode(&self, place: &str) -> Res<Option<Coordinates>>;
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    http: Client,
    settings: GeocodingSettings,
}

impl GoogleGeocoder {
    pub fn new(settings: &GeocodingSettings, timeout: Duration) -> Res<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::from_reqwest(Service::Geocoding, e))?;

        Ok(Self {
            http,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, place: &str) -> Res<Option<Coordinates>> {
        let response = self
            .http
            .get(&self.settings.url)
            .query(&[("address", place), ("key", self.settings.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(Service::Geocoding, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                Service::Geocoding,
                Some(status.as_u16()),
                status.to_string(),
            ));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| AppError::from_reqwest(Service::Geocoding, e))?;

        // The API reports most failures in the body with a 200 status.
        match body.status.as_str() {
            "OK" => Ok(body.results.into_iter().next().map(|r| Coordinates {
                latitude: r.geometry.location.lat,
                longitude: r.geometry.location.lng,
            })),
            "ZERO_RESULTS" => Ok(None),
            other => Err(AppError::upstream(
                Service::Geocoding,
                None,
                body.error_message
                    .unwrap_or_else(|| format!("status {other}")),
            )),
        }
    }
}
