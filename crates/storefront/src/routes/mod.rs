//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (Today's Deals)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Backend readiness check
//!
//! # Vehicles
//! GET  /vehicles                  - List all vehicles
//! GET  /saved-vehicles            - Saved vehicle tiles
//! GET  /vehicles/{vin}/about      - Record VIN, redirect to /about-vehicle
//! POST /vehicles/{vin}/save       - Save VIN, redirect to return_to
//! POST /vehicles/{vin}/purchase   - Select VIN, redirect to /purchase
//! GET  /about-vehicle             - Vehicle detail
//!
//! # Purchase
//! GET  /purchase                  - Purchase page (?review=1 opens the modal)
//! POST /purchase/address          - Submit the address form
//! POST /purchase/payment          - Connect virtual payment
//! POST /purchase/confirm          - Place the order
//! GET  /trade-in                  - Trade-in value form
//! POST /trade-in                  - Record trade-in value
//! ```

pub mod about;
pub mod health;
pub mod home;
pub mod listings;
pub mod purchase;
pub mod trade_in;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the vehicle routes router.
pub fn vehicle_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(listings::index))
        .route("/{vin}/about", get(about::select))
        .route("/{vin}/save", post(listings::save))
        .route("/{vin}/purchase", post(listings::select_for_purchase))
}

/// Create the purchase routes router.
pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(purchase::show))
        .route("/address", post(purchase::submit_address))
        .route("/payment", post(purchase::connect_payment))
        .route("/confirm", post(purchase::confirm))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/vehicles", vehicle_routes())
        .route("/saved-vehicles", get(listings::saved))
        .route("/about-vehicle", get(about::show))
        .nest("/purchase", purchase_routes())
        .route("/trade-in", get(trade_in::show).post(trade_in::update))
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
