// src/geocoding/google.rs
// Google Maps geocoding JSON API client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{GeocodeError, Geocoder, Location};
use crate::geo::Coordinate;

pub struct GoogleGeocoder {
    base_url: Url,
    api_key: Option<String>,
    http_client: Client,
}

impl GoogleGeocoder {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, GeocodeError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("adopt-a-drain/0.1")
            .build()?;

        // Endpoint paths are joined relative to the base, so keep any prefix it has.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            api_key,
            http_client,
        })
    }

    fn endpoint(&self, param: (&str, &str)) -> Result<Url, GeocodeError> {
        let mut url = self.base_url.join("maps/api/geocode/json")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(param.0, param.1);
            query.append_pair("sensor", "false");
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<Location, GeocodeError> {
        debug!("Geocoding request: {}", url.path());
        let response = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<GeocodeResponse>()
            .await?;
        response.into_location()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse_geocode(&self, at: Coordinate) -> Result<Location, GeocodeError> {
        let latlng = at.to_query();
        let url = self.endpoint(("latlng", latlng.as_str()))?;
        self.fetch(url).await
    }

    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError> {
        let url = self.endpoint(("address", address))?;
        self.fetch(url).await
    }
}

// ── Wire format

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeResponse {
    pub fn into_location(self) -> Result<Location, GeocodeError> {
        match self.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Err(GeocodeError::NoResults),
            other => {
                let detail = self.error_message.unwrap_or_default();
                return Err(GeocodeError::Api(format!("{other} {detail}").trim().to_string()));
            }
        }

        let result = self.results.into_iter().next().ok_or(GeocodeError::NoResults)?;
        Ok(result.into())
    }
}

impl GeocodeResult {
    fn component(&self, kind: &str, short: bool) -> Option<String> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
            .map(|c| if short { c.short_name.clone() } else { c.long_name.clone() })
    }
}

impl From<GeocodeResult> for Location {
    fn from(result: GeocodeResult) -> Self {
        let name = result
            .component("premise", false)
            .or_else(|| result.component("point_of_interest", false))
            .or_else(|| result.component("establishment", false));

        let street = match (result.component("street_number", false), result.component("route", false)) {
            (Some(number), Some(route)) => Some(format!("{number} {route}")),
            (None, route) => route,
            (number, None) => number,
        };

        Location {
            name,
            street,
            city: result.component("locality", false),
            state: result.component("administrative_area_level_1", true),
            postal_code: result.component("postal_code", false),
            coordinate: Coordinate {
                lat: result.geometry.location.lat,
                lng: result.geometry.location.lng,
            },
            formatted_address: result.formatted_address,
        }
    }
}
