//! Dealership REST backend client.
//!
//! # Architecture
//!
//! - One outbound request per call, no retries
//! - Every call returns `Result<T, DealerError>` so pages can render an
//!   explicit error state instead of spinning forever
//! - Vehicle, feature, photo and list reads are cached in memory via `moka`
//!   (TTL from configuration, disabled when zero); orders are never cached
//!
//! # Endpoints
//!
//! ```text
//! GET  /getVehicleDetails/{vin}   listing tile data
//! GET  /getVehicle/{vin}          purchase page data
//! GET  /getAllVehicles            full inventory list
//! GET  /getVehicleFeatures/{vin}  feature strings
//! GET  /getVehiclePhotos/{vin}    photo records
//! POST /newOrder                  create an order
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let client = DealerClient::new(&config.dealer)?;
//! let vehicle = client.get_vehicle(&vin).await?;
//! let features = client.get_vehicle_features(&vin).await?;
//! ```

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use online_dealership_core::{NewOrder, Vehicle, VehiclePhoto, VehicleSummary, Vin};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::DealerApiConfig;

pub use cache::{CacheKey, CacheValue};

/// Longest slice of a response body kept in errors and logs.
const MAX_BODY_EXCERPT: usize = 200;

/// Errors that can occur when talking to the dealership backend.
#[derive(Debug, Error)]
pub enum DealerError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with another non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the dealership REST backend.
///
/// Cheap to clone; all clones share the connection pool and cache.
#[derive(Clone)]
pub struct DealerClient {
    inner: Arc<DealerClientInner>,
}

struct DealerClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl DealerClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &DealerApiConfig) -> Result<Self, DealerError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(DealerClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Build the absolute URL for an endpoint path.
    fn endpoint(&self, path: &str) -> Result<Url, DealerError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Fail with a typed error unless the response is a success.
    async fn check_status(
        path: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DealerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(DealerError::NotFound(path.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            status = %status,
            path,
            body = %excerpt(&body),
            "Dealer backend returned non-success status"
        );
        Err(DealerError::Status {
            status: status.as_u16(),
            body: excerpt(&body),
        })
    }

    /// Issue a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DealerError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.get(url).send().await?;
        let response = Self::check_status(path, response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %excerpt(&text),
                "Failed to parse dealer backend response"
            );
            DealerError::Parse(e)
        })
    }

    async fn cache_get(&self, key: &CacheKey) -> Option<CacheValue> {
        let cache = self.inner.cache.as_ref()?;
        cache.get(key).await
    }

    async fn cache_put(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    // =========================================================================
    // Vehicle Methods
    // =========================================================================

    /// Get the listing-tile record for a vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle is not found or the request fails.
    #[instrument(skip(self), fields(vin = %vin))]
    pub async fn get_vehicle_details(&self, vin: &Vin) -> Result<Vehicle, DealerError> {
        let key = CacheKey::VehicleDetails(vin.clone());
        if let Some(CacheValue::Vehicle(vehicle)) = self.cache_get(&key).await {
            debug!("Cache hit for vehicle details");
            return Ok(*vehicle);
        }

        let vehicle: Vehicle = self.get_json(&format!("getVehicleDetails/{vin}")).await?;
        self.cache_put(key, CacheValue::Vehicle(Box::new(vehicle.clone())))
            .await;
        Ok(vehicle)
    }

    /// Get the full record for a vehicle (purchase and detail pages).
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle is not found or the request fails.
    #[instrument(skip(self), fields(vin = %vin))]
    pub async fn get_vehicle(&self, vin: &Vin) -> Result<Vehicle, DealerError> {
        let key = CacheKey::Vehicle(vin.clone());
        if let Some(CacheValue::Vehicle(vehicle)) = self.cache_get(&key).await {
            debug!("Cache hit for vehicle");
            return Ok(*vehicle);
        }

        let vehicle: Vehicle = self.get_json(&format!("getVehicle/{vin}")).await?;
        self.cache_put(key, CacheValue::Vehicle(Box::new(vehicle.clone())))
            .await;
        Ok(vehicle)
    }

    /// Get every vehicle in inventory.
    ///
    /// Records are decoded one by one: a record that does not parse (for
    /// example a VIN that cannot appear in a URL path) is logged and skipped
    /// instead of failing the whole list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON list.
    #[instrument(skip(self))]
    pub async fn get_all_vehicles(&self) -> Result<Vec<VehicleSummary>, DealerError> {
        let key = CacheKey::AllVehicles;
        if let Some(CacheValue::Vehicles(vehicles)) = self.cache_get(&key).await {
            debug!("Cache hit for all vehicles");
            return Ok(vehicles);
        }

        let records: Vec<serde_json::Value> = self.get_json("getAllVehicles").await?;
        let vehicles = decode_summaries(records);
        self.cache_put(key, CacheValue::Vehicles(vehicles.clone()))
            .await;
        Ok(vehicles)
    }

    /// Get the feature list for a vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(vin = %vin))]
    pub async fn get_vehicle_features(&self, vin: &Vin) -> Result<Vec<String>, DealerError> {
        let key = CacheKey::Features(vin.clone());
        if let Some(CacheValue::Features(features)) = self.cache_get(&key).await {
            debug!("Cache hit for vehicle features");
            return Ok(features);
        }

        let features: Vec<String> = self.get_json(&format!("getVehicleFeatures/{vin}")).await?;
        self.cache_put(key, CacheValue::Features(features.clone()))
            .await;
        Ok(features)
    }

    /// Get the photo records for a vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(vin = %vin))]
    pub async fn get_vehicle_photos(&self, vin: &Vin) -> Result<Vec<VehiclePhoto>, DealerError> {
        let key = CacheKey::Photos(vin.clone());
        if let Some(CacheValue::Photos(photos)) = self.cache_get(&key).await {
            debug!("Cache hit for vehicle photos");
            return Ok(photos);
        }

        let photos: Vec<VehiclePhoto> = self.get_json(&format!("getVehiclePhotos/{vin}")).await?;
        self.cache_put(key, CacheValue::Photos(photos.clone())).await;
        Ok(photos)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create an order.
    ///
    /// The backend's response shape is not fixed, so the body is returned as
    /// raw JSON; an empty or non-JSON body yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the order.
    #[instrument(skip(self, order), fields(vin = %order.vin, customer_id = %order.customer_id))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<serde_json::Value, DealerError> {
        let path = "newOrder";
        let url = self.endpoint(path)?;
        let response = self.inner.client.post(url).json(order).send().await?;
        let response = Self::check_status(path, response).await?;

        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);

        tracing::info!("Order created");
        Ok(body)
    }

    /// Check that the backend answers at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn check_health(&self) -> Result<(), DealerError> {
        let path = "getAllVehicles";
        let url = self.endpoint(path)?;
        let response = self.inner.client.get(url).send().await?;
        Self::check_status(path, response).await.map(|_| ())
    }
}

/// Keep the `getAllVehicles` records that parse, warning about the rest.
fn decode_summaries(records: Vec<serde_json::Value>) -> Vec<VehicleSummary> {
    records
        .into_iter()
        .filter_map(|record| {
            let vin = record.get("vin").cloned().unwrap_or_default();
            serde_json::from_value(record)
                .inspect_err(|e| tracing::warn!(vin = %vin, "Skipping vehicle record: {e}"))
                .ok()
        })
        .collect()
}

/// First [`MAX_BODY_EXCERPT`] characters of a response body.
fn excerpt(body: &str) -> String {
    body.chars().take(MAX_BODY_EXCERPT).collect()
}
