//! Driving directions lookup

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RouteConfig;
use crate::trip::{Coordinates, Geometry, RouteSegment, Stop};

/// Straight-line distance above which a long detour counts as a water crossing
const WATER_DETOUR_MIN_KM: f64 = 50.0;

/// Driving distance over straight-line distance that marks a detour
const WATER_DETOUR_FACTOR: f64 = 3.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Routing token not configured: set {0}")]
    MissingToken(String),

    #[error("Directions request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Directions API error: {0}")]
    Status(u16),

    #[error("Directions API returned no routes (code: {0})")]
    NoRoute(String),
}

/// Looks up the travel path between two stops
#[async_trait]
pub trait PathLookup: Send + Sync {
    async fn lookup(&self, from: &Stop, to: &Stop) -> Result<RouteSegment, RouteError>;
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    code: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: Geometry,
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    #[serde(default)]
    steps: Vec<DirectionsStep>,
}

#[derive(Debug, Deserialize)]
struct DirectionsStep {
    mode: Option<String>,
}

/// Mapbox Directions API client
pub struct MapboxDirections {
    http: Client,
    base_url: String,
    token: String,
}

impl MapboxDirections {
    pub fn from_config(config: &RouteConfig) -> Result<Self, RouteError> {
        let token = config
            .get_token()
            .ok_or_else(|| RouteError::MissingToken(config.token_env.clone()))?;
        Self::new(&config.base_url, token, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self, RouteError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, from: Coordinates, to: Coordinates) -> String {
        format!(
            "{}/directions/v5/mapbox/driving/{},{};{},{}?geometries=geojson&overview=full&steps=true&access_token={}",
            self.base_url, from.lng, from.lat, to.lng, to.lat, self.token
        )
    }
}

#[async_trait]
impl PathLookup for MapboxDirections {
    async fn lookup(&self, from: &Stop, to: &Stop) -> Result<RouteSegment, RouteError> {
        debug!(from = %from.name, to = %to.name, "MapboxDirections::lookup: called");
        let response = self.http.get(self.url(from.coordinates, to.coordinates)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Status(status.as_u16()));
        }
        let body: DirectionsResponse = response.json().await?;
        segment_from_response(from, to, body)
    }
}

fn segment_from_response(from: &Stop, to: &Stop, body: DirectionsResponse) -> Result<RouteSegment, RouteError> {
    if body.code != "Ok" {
        return Err(RouteError::NoRoute(body.code));
    }
    let Some(route) = body.routes.into_iter().next() else {
        return Err(RouteError::NoRoute(body.code));
    };

    let has_ferry_step = route
        .legs
        .iter()
        .flat_map(|leg| &leg.steps)
        .any(|step| step.mode.as_deref() == Some("ferry"));

    let straight_km = haversine_km(from.coordinates, to.coordinates);
    let driving_km = route.distance / 1000.0;
    let water_detour = straight_km > WATER_DETOUR_MIN_KM && driving_km > straight_km * WATER_DETOUR_FACTOR;

    if water_detour && !has_ferry_step {
        info!(
            from = %from.name,
            to = %to.name,
            straight_km,
            driving_km,
            "lookup: driving route detours around water, using straight crossing"
        );
        return Ok(RouteSegment::straight_fallback(from, to));
    }

    Ok(RouteSegment {
        from_stop_id: from.id.clone(),
        to_stop_id: to.id.clone(),
        geometry: Some(route.geometry),
        distance_km: Some(driving_km),
        duration_hours: Some(route.duration / 3600.0),
        is_ferry: has_ferry_step.then_some(true),
    })
}

/// Great-circle distance in kilometers
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}
