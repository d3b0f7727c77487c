//! Nearby restaurant search
//!
//! Thin client over the Google Places nearby-search endpoint. Only
//! well-rated places are returned; a missing API key or an unusable response
//! degrades to an empty list so callers never have to special-case it.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PlacesConfig;
use crate::trip::Coordinates;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Places request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Places API error: {0}")]
    Status(u16),
}

/// A place that passed the rating filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub name: String,
    pub address: Option<String>,
    pub rating: f64,
    pub price_level: Option<u8>,
    pub location: Coordinates,
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    name: String,
    vicinity: Option<String>,
    rating: Option<f64>,
    price_level: Option<u8>,
    geometry: NearbyGeometry,
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct NearbyGeometry {
    location: Coordinates,
}

pub struct PlacesClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    min_rating: f64,
    radius_m: u32,
    default_query: String,
}

impl PlacesClient {
    pub fn from_config(config: &PlacesConfig) -> Result<Self, PlacesError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.get_api_key(),
            min_rating: config.min_rating,
            radius_m: config.radius_m,
            default_query: config.default_query.clone(),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search restaurants around a point; `query` falls back to the configured default
    pub async fn search(&self, lat: f64, lng: f64, query: Option<&str>) -> Result<Vec<Place>, PlacesError> {
        let query = query.filter(|q| !q.trim().is_empty()).unwrap_or(&self.default_query);
        debug!(%lat, %lng, %query, "PlacesClient::search: called");

        let Some(key) = &self.api_key else {
            debug!("search: no API key configured, returning no places");
            return Ok(Vec::new());
        };

        let location = format!("{},{}", lat, lng);
        let radius = self.radius_m.to_string();
        let response = self
            .http
            .get(format!("{}/nearbysearch/json", self.base_url))
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", "restaurant"),
                ("keyword", query),
                ("key", key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::Status(status.as_u16()));
        }

        let body: NearbyResponse = response.json().await?;
        Ok(self.filter(body))
    }

    fn filter(&self, body: NearbyResponse) -> Vec<Place> {
        if body.status != "OK" && body.status != "ZERO_RESULTS" {
            warn!(
                status = %body.status,
                message = body.error_message.as_deref().unwrap_or(""),
                "Places API returned an error status"
            );
            return Vec::new();
        }

        let total = body.results.len();
        let places: Vec<Place> = body
            .results
            .into_iter()
            .filter_map(|r| {
                let rating = r.rating.filter(|rating| *rating >= self.min_rating)?;
                Some(Place {
                    name: r.name,
                    address: r.vicinity,
                    rating,
                    price_level: r.price_level,
                    location: r.geometry.location,
                    place_id: r.place_id,
                })
            })
            .collect();
        debug!(total, kept = places.len(), "filter: applied rating threshold");
        places
    }
}
