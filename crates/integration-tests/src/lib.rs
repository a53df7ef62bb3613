//! Integration test harness for the Online Dealership storefront.
//!
//! Every test runs two in-process servers on ephemeral ports:
//!
//! - [`FakeDealer`]: a stand-in for the dealership REST backend that serves
//!   a fixed inventory and records every order it receives
//! - the storefront itself, built with [`online_dealership_storefront::build_app`]
//!
//! [`TestContext`] drives the storefront with a cookie-keeping `reqwest`
//! client that does not follow redirects, so tests can assert on each 303.
//!
//! # Example
//!
//! ```rust,ignore
//! let dealer = FakeDealer::start(FakeDealerConfig::with_vehicles([civic()])).await;
//! let ctx = TestContext::start(&dealer).await;
//! let page = ctx.get_text("/").await;
//! assert!(page.contains("2019 Honda Civic"));
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use online_dealership_core::CustomerId;
use online_dealership_storefront::{
    build_app,
    config::{DealerApiConfig, DealershipConfig, StorefrontConfig, parse_base_url},
    state::AppState,
};
use secrecy::SecretString;
use serde_json::{Value, json};

/// Signing secret used by every test storefront.
const TEST_COOKIE_SECRET: &str =
    "q8Zr2vLx7NpT4kWc9HsB3mYf6JdG1aQe5UoR0iXt8VnK2wPz7CyM4bLh9SjD3gFu";

// =============================================================================
// Fixtures
// =============================================================================

/// A backend vehicle record.
#[must_use]
pub fn vehicle(vin: &str, make: &str, model: &str, year: i32, msrp: i64) -> Value {
    json!({
        "vin": vin,
        "make": make,
        "model": model,
        "year": year,
        "mileage": 42000,
        "msrp": msrp,
        "color": "Silver",
        "type": "Sedan",
        "mpg-city": 30,
        "mpg-hwy": 38,
        "photos": [format!("https://img.example.com/{vin}.jpg")],
        "features": ["Backup Camera", "Bluetooth"],
    })
}

/// A 2019 Honda Civic listed at $20,000.
#[must_use]
pub fn civic() -> Value {
    vehicle("VIN1", "Honda", "Civic", 2019, 20_000)
}

/// A 2018 Toyota Camry listed at $18,500.
#[must_use]
pub fn camry() -> Value {
    vehicle("VIN2", "Toyota", "Camry", 2018, 18_500)
}

/// A 2020 Ford F-150 listed at $32,000.
#[must_use]
pub fn truck() -> Value {
    vehicle("VIN3", "Ford", "F-150", 2020, 32_000)
}

// =============================================================================
// Fake Dealer Backend
// =============================================================================

/// Behavior of a [`FakeDealer`].
#[derive(Debug, Clone, Default)]
pub struct FakeDealerConfig {
    /// Inventory, in `getAllVehicles` order.
    pub vehicles: Vec<Value>,
    /// VINs whose per-vehicle endpoints answer 500.
    pub broken_vins: HashSet<String>,
    /// Whether `getAllVehicles` answers 500.
    pub list_fails: bool,
}

impl FakeDealerConfig {
    /// Serve `vehicles` with every endpoint healthy.
    pub fn with_vehicles(vehicles: impl IntoIterator<Item = Value>) -> Self {
        Self {
            vehicles: vehicles.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Make the per-vehicle endpoints fail for `vin`.
    #[must_use]
    pub fn broken(mut self, vin: &str) -> Self {
        self.broken_vins.insert(vin.to_string());
        self
    }

    /// Make `getAllVehicles` fail.
    #[must_use]
    pub const fn failing_list(mut self) -> Self {
        self.list_fails = true;
        self
    }
}

struct FakeDealerState {
    config: FakeDealerConfig,
    orders: Mutex<Vec<Value>>,
    orders_fail: AtomicBool,
    requests: AtomicUsize,
}

impl FakeDealerState {
    fn find(&self, vin: &str) -> Result<&Value, StatusCode> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.config.broken_vins.contains(vin) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        self.config
            .vehicles
            .iter()
            .find(|v| v["vin"] == vin)
            .ok_or(StatusCode::NOT_FOUND)
    }
}

/// In-process dealership backend.
pub struct FakeDealer {
    url: String,
    state: Arc<FakeDealerState>,
}

impl FakeDealer {
    /// Start the backend on an ephemeral port.
    pub async fn start(config: FakeDealerConfig) -> Self {
        let state = Arc::new(FakeDealerState {
            config,
            orders: Mutex::new(Vec::new()),
            orders_fail: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/getAllVehicles", get(all_vehicles))
            .route("/getVehicleDetails/{vin}", get(vehicle_record))
            .route("/getVehicle/{vin}", get(vehicle_record))
            .route("/getVehicleFeatures/{vin}", get(vehicle_features))
            .route("/getVehiclePhotos/{vin}", get(vehicle_photos))
            .route("/newOrder", post(new_order))
            .with_state(Arc::clone(&state));

        let addr = serve(app).await;
        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL the storefront should call.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Orders received so far, as posted.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.state.orders.lock().unwrap().clone()
    }

    /// Total requests received by any endpoint.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Make `newOrder` answer 500 (or recover with `false`).
    pub fn set_orders_fail(&self, fail: bool) {
        self.state.orders_fail.store(fail, Ordering::SeqCst);
    }
}

async fn all_vehicles(State(state): State<Arc<FakeDealerState>>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.config.list_fails {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let summaries: Vec<Value> = state
        .config
        .vehicles
        .iter()
        .enumerate()
        .map(|(i, v)| {
            json!({
                "id": i + 1,
                "vin": v["vin"],
                "make": v["make"],
                "model": v["model"],
                "year": v["year"],
            })
        })
        .collect();
    Json(summaries).into_response()
}

async fn vehicle_record(
    State(state): State<Arc<FakeDealerState>>,
    Path(vin): Path<String>,
) -> Response {
    match state.find(&vin) {
        Ok(vehicle) => Json(vehicle.clone()).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn vehicle_features(
    State(state): State<Arc<FakeDealerState>>,
    Path(vin): Path<String>,
) -> Response {
    match state.find(&vin) {
        Ok(vehicle) => Json(vehicle["features"].clone()).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn vehicle_photos(
    State(state): State<Arc<FakeDealerState>>,
    Path(vin): Path<String>,
) -> Response {
    match state.find(&vin) {
        Ok(vehicle) => {
            let photos: Vec<Value> = vehicle["photos"]
                .as_array()
                .into_iter()
                .flatten()
                .map(|url| json!({ "photo": url }))
                .collect();
            Json(photos).into_response()
        }
        Err(status) => status.into_response(),
    }
}

async fn new_order(State(state): State<Arc<FakeDealerState>>, Json(order): Json<Value>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.orders_fail.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let mut orders = state.orders.lock().unwrap();
    orders.push(order);
    Json(json!({ "order_id": orders.len() })).into_response()
}

// =============================================================================
// Storefront Under Test
// =============================================================================

/// A running storefront plus a browser-like client.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront that talks to `dealer`.
    pub async fn start(dealer: &FakeDealer) -> Self {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            cookie_secret: SecretString::from(TEST_COOKIE_SECRET.to_string()),
            dealer: DealerApiConfig {
                base_url: parse_base_url(dealer.url()).unwrap(),
                timeout: Duration::from_secs(5),
                cache_ttl: Duration::ZERO,
                customer_id: CustomerId::new(1),
            },
            dealership: DealershipConfig::default(),
            featured_vehicle_count: 4,
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static")),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let app = build_app(AppState::new(config).unwrap());
        let addr = serve(app).await;

        Self {
            client: Self::browser(),
            base_url: format!("http://{addr}"),
        }
    }

    /// A client that keeps cookies and leaves redirects to the test.
    #[must_use]
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// GET a page, assert 200 and return its body.
    pub async fn get_text(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK, "GET {path}");
        response.text().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// POST a form and assert it answers 303 to `location`.
    pub async fn post_redirect(&self, path: &str, form: &[(&str, &str)], location: &str) {
        let response = self.post_form(path, form).await;
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER, "POST {path}");
        assert_eq!(location_of(&response), location, "POST {path}");
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location_of(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// A complete shipping address form.
#[must_use]
pub fn address_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("street_name", "Summit St"),
        ("street_number", "111"),
        ("apartment_number", ""),
        ("city", "Kent"),
        ("state", "OH"),
        ("zip", "44240"),
    ]
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
