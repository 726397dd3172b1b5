//! Place-to-coordinates lookup through a Nominatim-compatible search API.
//!
//! A search with no hits is a normal outcome: it is logged as a warning and
//! the post simply goes out without coordinates. Network failures, timeouts
//! and garbled responses are errors.

use crate::config::GeocoderConfig;
use crate::error::{Error, Result};
use crate::models::GeoPoint;
use reqwest::{Client, Request};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Resolve free text to coordinates.
pub trait Geocode {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>>;
}

/// Client for the Nominatim `/search` endpoint.
#[derive(Debug, Clone)]
pub struct Nominatim {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl Nominatim {
    pub fn new(client: Client, config: &GeocoderConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// The search request for `query`: first hit only, JSON, bounded by the
    /// configured timeout.
    pub fn search_request(&self, query: &str) -> Result<Request> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("format", "json"), ("limit", "1"), ("q", query)])
            .timeout(self.timeout)
            .build()?;
        Ok(request)
    }
}

impl Geocode for Nominatim {
    #[instrument(level = "info", skip(self))]
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>> {
        let t0 = Instant::now();
        let request = self.search_request(query)?;
        let body = self
            .client
            .execute(request)
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let point = resolve(query, &body)?;
        if let Some(point) = point {
            info!(
                %point,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Geocoded place"
            );
        }
        Ok(point)
    }
}

/// Pull the first hit's coordinates out of a search response body.
pub fn resolve(query: &str, body: &[u8]) -> Result<Option<GeoPoint>> {
    let results: Vec<Value> = serde_json::from_slice(body)?;
    let first = results.first();
    let lat = first.and_then(|r| r.get("lat"));
    let lon = first.and_then(|r| r.get("lon"));

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(GeoPoint {
            lat: coordinate(lat)?,
            lng: coordinate(lon)?,
        })),
        _ => {
            warn!(query, "Geocoder returned no results");
            Ok(None)
        }
    }
}

// Nominatim sends coordinates as strings; accept bare numbers too.
fn coordinate(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::Coordinate {
        value: value.to_string(),
    })
}
