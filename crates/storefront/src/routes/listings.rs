//! Vehicle listing route handlers.
//!
//! Listing tiles, the list-all page, the saved-vehicles page and the
//! save/purchase actions a tile posts to.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use futures::future::join_all;
use online_dealership_core::{Vehicle, Vin};
use serde::Deserialize;
use tracing::instrument;

use crate::dealer::DealerClient;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::ClientState;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Display data for one loaded listing tile.
#[derive(Clone)]
pub struct ListingView {
    pub title: String,
    pub photo: Option<String>,
    pub mileage: u64,
    pub price: String,
    pub features: Vec<String>,
}

impl From<&Vehicle> for ListingView {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            title: vehicle.title(),
            photo: vehicle.primary_photo().map(String::from),
            mileage: vehicle.mileage,
            price: vehicle.msrp_price().to_string(),
            features: vehicle.features.clone(),
        }
    }
}

/// A listing tile: the VIN plus its data, or `None` when the fetch failed.
#[derive(Clone)]
pub struct TileView {
    pub vin: String,
    pub listing: Option<ListingView>,
}

/// Fetch tile data for every VIN concurrently.
///
/// A failed fetch yields a tile without data, rendered as the "unavailable"
/// placeholder; it never fails the page.
pub async fn load_tiles<I>(dealer: &DealerClient, vins: I) -> Vec<TileView>
where
    I: IntoIterator<Item = Vin>,
{
    join_all(vins.into_iter().map(|vin| async move {
        let listing = match dealer.get_vehicle_details(&vin).await {
            Ok(vehicle) => Some(ListingView::from(&vehicle)),
            Err(e) => {
                tracing::warn!(vin = %vin, error = %e, "Listing tile unavailable");
                None
            }
        };
        TileView {
            vin: vin.into_inner(),
            listing,
        }
    }))
    .await
}

// =============================================================================
// Templates
// =============================================================================

/// List-all page template.
#[derive(Template, WebTemplate)]
#[template(path = "vehicles/index.html")]
pub struct VehicleListTemplate {
    /// `"{make} {model} - {year} - {vin}"` lines.
    pub vehicles: Vec<String>,
}

/// Saved vehicles page template.
#[derive(Template, WebTemplate)]
#[template(path = "vehicles/saved.html")]
pub struct SavedVehiclesTemplate {
    pub tiles: Vec<TileView>,
    /// Tiles on this page never offer Save.
    pub show_save: bool,
    pub return_to: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display every vehicle in inventory as a flat list.
///
/// A backend failure is logged and renders an empty list.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let vehicles = state.dealer().get_all_vehicles().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch vehicle list: {e}");
            Vec::new()
        },
        |vehicles| vehicles.iter().map(|v| v.label()).collect(),
    );

    VehicleListTemplate { vehicles }
}

/// Display a tile for every saved vehicle.
#[instrument(skip(state, client))]
pub async fn saved(State(state): State<AppState>, client: ClientState) -> impl IntoResponse {
    let tiles = load_tiles(state.dealer(), client.saved_vehicles()).await;

    SavedVehiclesTemplate {
        tiles,
        show_save: false,
        return_to: "/saved-vehicles",
    }
}

/// Form body of the save action.
#[derive(Debug, Default, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Add a vehicle to the saved list and return to the page it was saved from.
#[instrument(skip(client, form))]
pub async fn save(
    Path(vin): Path<String>,
    client: ClientState,
    Form(form): Form<SaveForm>,
) -> Result<impl IntoResponse> {
    let vin = parse_vin(&vin)?;
    let (client, added) = client.save_vehicle(vin);
    if added {
        tracing::info!("Vehicle saved");
    }

    let target = local_return_path(form.return_to.as_deref(), "/");
    Ok((client, Redirect::to(&target)))
}

/// Select a vehicle for purchase.
#[instrument(skip(client))]
pub async fn select_for_purchase(
    Path(vin): Path<String>,
    client: ClientState,
) -> Result<impl IntoResponse> {
    let vin = parse_vin(&vin)?;
    add_breadcrumb("purchase", "Selected vehicle", Some(&[("vin", vin.as_str())]));

    Ok((client.with_purchase_vin(&vin), Redirect::to("/purchase")))
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse a VIN from a path segment.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the VIN is malformed.
pub fn parse_vin(raw: &str) -> Result<Vin> {
    Vin::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid VIN: {e}")))
}

/// A redirect target that stays on this site.
///
/// Accepts absolute paths only (`/saved-vehicles`), rejecting
/// protocol-relative (`//host`) and backslash forms browsers treat as
/// another origin; anything else yields `fallback`.
#[must_use]
pub fn local_return_path(raw: Option<&str>, fallback: &str) -> String {
    raw.map(str::trim)
        .filter(|path| {
            path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control)
        })
        .unwrap_or(fallback)
        .to_string()
}
