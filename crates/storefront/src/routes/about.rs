//! Vehicle detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use online_dealership_core::{Vehicle, VehiclePhoto, Vin};
use rust_decimal::Decimal;
use tracing::instrument;

use super::listings::parse_vin;
use crate::dealer::{DealerClient, DealerError};
use crate::error::Result;
use crate::filters;
use crate::middleware::ClientState;
use crate::state::AppState;

/// Full vehicle record as shown on the detail and purchase pages.
#[derive(Clone)]
pub struct VehicleDetailView {
    pub vin: String,
    pub title: String,
    pub photo: Option<String>,
    pub condition: &'static str,
    pub mileage: u64,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub color: String,
    pub body_type: String,
    pub msrp: Decimal,
    pub msrp_display: String,
    pub mpg_city: String,
    pub mpg_hwy: String,
    pub features: Vec<String>,
}

impl VehicleDetailView {
    /// Build the view from the vehicle record and its feature and photo lists.
    #[must_use]
    pub fn new(vehicle: &Vehicle, features: Vec<String>, photos: &[VehiclePhoto]) -> Self {
        Self {
            vin: vehicle.vin.to_string(),
            title: vehicle.title(),
            photo: photos.first().map(|p| p.photo.clone()),
            // Every vehicle on the lot is sold used.
            condition: "Used",
            mileage: vehicle.mileage,
            year: vehicle.year,
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            color: vehicle.color.clone(),
            body_type: vehicle.body_type.clone(),
            msrp: vehicle.msrp,
            msrp_display: vehicle.msrp_price().to_string(),
            mpg_city: mpg_display(vehicle.mpg_city),
            mpg_hwy: mpg_display(vehicle.mpg_hwy),
            features,
        }
    }
}

fn mpg_display(mpg: Option<u32>) -> String {
    mpg.map_or_else(|| "N/A".to_string(), |m| m.to_string())
}

/// Fetch the vehicle, its features and its photos concurrently.
///
/// # Errors
///
/// Returns the first backend error; the page then renders as unavailable.
pub async fn load_vehicle_detail(
    dealer: &DealerClient,
    vin: &Vin,
) -> std::result::Result<VehicleDetailView, DealerError> {
    let (vehicle, features, photos) = tokio::try_join!(
        dealer.get_vehicle(vin),
        dealer.get_vehicle_features(vin),
        dealer.get_vehicle_photos(vin),
    )?;

    Ok(VehicleDetailView::new(&vehicle, features, &photos))
}

/// Vehicle detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    /// `None` renders the unavailable state.
    pub vehicle: Option<VehicleDetailView>,
}

/// Record the vehicle to show and go to the detail page.
#[instrument(skip(client))]
pub async fn select(Path(vin): Path<String>, client: ClientState) -> Result<impl IntoResponse> {
    let vin = parse_vin(&vin)?;
    Ok((client.with_about_vin(&vin), Redirect::to("/about-vehicle")))
}

/// Display the recorded vehicle.
#[instrument(skip(state, client))]
pub async fn show(State(state): State<AppState>, client: ClientState) -> impl IntoResponse {
    let Some(vin) = client.about_vin() else {
        tracing::debug!("No vehicle recorded for detail page");
        return AboutTemplate { vehicle: None };
    };

    let vehicle = load_vehicle_detail(state.dealer(), &vin)
        .await
        .inspect_err(|e| tracing::error!(vin = %vin, "Failed to load vehicle detail: {e}"))
        .ok();

    AboutTemplate { vehicle }
}
