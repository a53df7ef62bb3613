//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::listings::{TileView, load_tiles};
use crate::filters;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Today's Deals tiles.
    pub tiles: Vec<TileView>,
    pub show_save: bool,
    pub return_to: &'static str,
}

/// Display the home page.
///
/// Shows the first few vehicles in inventory as listing tiles. If the
/// inventory itself cannot be fetched the section is rendered empty.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let count = state.config().featured_vehicle_count;

    let vins = state.dealer().get_all_vehicles().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch featured vehicles: {e}");
            Vec::new()
        },
        |vehicles| {
            vehicles
                .into_iter()
                .take(count)
                .map(|v| v.vin)
                .collect()
        },
    );

    let tiles = load_tiles(state.dealer(), vins).await;

    HomeTemplate {
        tiles,
        show_save: true,
        return_to: "/",
    }
}
