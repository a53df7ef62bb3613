//! Purchase page route handlers.
//!
//! # Flow
//!
//! ```text
//! GET  /purchase            page for the selected VIN (+ modal with ?review=1)
//! POST /purchase/address    store the address in the draft, no backend call
//! POST /purchase/payment    mark the virtual payment connected
//! POST /purchase/confirm    place the order once readiness allows it
//! ```
//!
//! Orders are created only by `confirm`, and only once per draft: a draft
//! that already records a placed order re-renders the completion modal
//! instead of posting again.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use online_dealership_core::{
    NewOrder, OrderReadiness, Price, ShippingAddress, Vin, current_price,
};
use serde::Deserialize;
use tracing::instrument;

use super::about::{VehicleDetailView, load_vehicle_detail};
use crate::config::DealershipConfig;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::ClientState;
use crate::models::PurchaseDraft;
use crate::state::AppState;

/// Notice shown when the backend rejected or never answered the order.
const ORDER_FAILED_NOTICE: &str = "Your order could not be placed. Please try again.";

// =============================================================================
// View Models
// =============================================================================

/// Order modal content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderModal {
    pub title: &'static str,
    /// `"You Will Owe: $15,000"` or `"Order Total: $15,000"`.
    pub total_line: Option<String>,
    pub errors: Vec<&'static str>,
    /// Whether the Confirm Purchase button is offered.
    pub confirmable: bool,
}

impl OrderModal {
    /// The modal for a review request: confirmation when ready, errors otherwise.
    #[must_use]
    pub fn for_readiness(readiness: OrderReadiness, total: Price) -> Self {
        if readiness.is_ready() {
            Self {
                title: "Ready to Order?",
                total_line: Some(format!("You Will Owe: {total}")),
                errors: Vec::new(),
                confirmable: true,
            }
        } else {
            Self {
                title: "Error",
                total_line: None,
                errors: readiness.error_messages(),
                confirmable: false,
            }
        }
    }

    /// The modal shown once the order has been placed.
    #[must_use]
    pub fn complete(total: Price) -> Self {
        Self {
            title: "Purchase Complete",
            total_line: Some(format!("Order Total: {total}")),
            errors: Vec::new(),
            confirmable: false,
        }
    }
}

/// Purchase page template.
#[derive(Template, WebTemplate)]
#[template(path = "purchase/show.html")]
pub struct PurchaseTemplate {
    pub vehicle: VehicleDetailView,
    pub dealership: DealershipConfig,
    pub vehicle_price: String,
    pub trade_in_discount: String,
    pub current_price: String,
    pub address: ShippingAddress,
    pub status: Option<String>,
    pub address_error: Option<String>,
    pub payment_label: &'static str,
    pub payment_connected: bool,
    pub order_placed: bool,
    pub notice: Option<&'static str>,
    pub modal: Option<OrderModal>,
}

/// Shown when no vehicle is selected or its data cannot be loaded.
#[derive(Template, WebTemplate)]
#[template(path = "purchase/unavailable.html")]
pub struct PurchaseUnavailableTemplate {
    pub message: &'static str,
}

impl PurchaseUnavailableTemplate {
    const fn no_selection() -> Self {
        Self {
            message: "No vehicle selected. Choose a vehicle to purchase from the listings.",
        }
    }

    const fn load_failed() -> Self {
        Self {
            message: "This vehicle is unavailable right now. Please try again later.",
        }
    }
}

/// Per-request additions to the purchase page.
#[derive(Default)]
struct PageExtras {
    modal: Option<ModalRequest>,
    notice: Option<&'static str>,
    address_error: Option<String>,
}

#[derive(Clone, Copy)]
enum ModalRequest {
    Review,
    Complete,
}

/// Render the purchase page for `vin`, always returning `client` so cookie
/// writes reach the browser even when the page itself is unavailable.
/// `status` applies to the unavailable page too, so a rejected form stays a
/// 422 when the vehicle cannot be reloaded.
async fn render_page(
    state: &AppState,
    client: ClientState,
    vin: &Vin,
    draft: &PurchaseDraft,
    extras: PageExtras,
    status: StatusCode,
) -> Response {
    let vehicle = match load_vehicle_detail(state.dealer(), vin).await {
        Ok(vehicle) => vehicle,
        Err(e) => {
            tracing::error!(vin = %vin, "Failed to load purchase vehicle: {e}");
            return (status, client, PurchaseUnavailableTemplate::load_failed()).into_response();
        }
    };

    let client = client.with_vehicle_value(vehicle.msrp);
    let trade_in = client.trade_in_value();
    let total = current_price(vehicle.msrp, trade_in);

    let modal = extras.modal.map(|request| match request {
        ModalRequest::Complete => OrderModal::complete(total),
        ModalRequest::Review if draft.order_placed => OrderModal::complete(total),
        ModalRequest::Review => OrderModal::for_readiness(draft.readiness(), total),
    });

    let template = PurchaseTemplate {
        vehicle_price: vehicle.msrp_display.clone(),
        trade_in_discount: Price::new(trade_in.unwrap_or_default()).to_string(),
        current_price: total.to_string(),
        vehicle,
        dealership: state.config().dealership.clone(),
        address: draft.address.clone(),
        status: draft.status.clone(),
        address_error: extras.address_error,
        payment_label: draft.payment_button_label(),
        payment_connected: draft.payment_connected,
        order_placed: draft.order_placed,
        notice: extras.notice,
        modal,
    };

    (status, client, template).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Query string of the purchase page.
#[derive(Debug, Default, Deserialize)]
pub struct PurchaseQuery {
    /// Non-empty to open the order modal.
    #[serde(default)]
    pub review: Option<String>,
}

impl PurchaseQuery {
    fn wants_review(&self) -> bool {
        self.review
            .as_deref()
            .is_some_and(|v| !v.is_empty() && v != "0")
    }
}

/// Display the purchase page.
///
/// Never creates an order.
#[instrument(skip(state, client, query))]
pub async fn show(
    State(state): State<AppState>,
    client: ClientState,
    Query(query): Query<PurchaseQuery>,
) -> Response {
    let Some(vin) = client.purchase_vin() else {
        return PurchaseUnavailableTemplate::no_selection().into_response();
    };

    let draft = client.purchase_draft_for(&vin);
    let extras = PageExtras {
        modal: query.wants_review().then_some(ModalRequest::Review),
        ..PageExtras::default()
    };

    render_page(&state, client, &vin, &draft, extras, StatusCode::OK).await
}

/// Accept the address form.
///
/// Stores the address in the draft without contacting the backend. Blank
/// required fields re-render the page with a validation message.
#[instrument(skip(state, client, address))]
pub async fn submit_address(
    State(state): State<AppState>,
    client: ClientState,
    Form(address): Form<ShippingAddress>,
) -> Response {
    let Some(vin) = client.purchase_vin() else {
        return Redirect::to("/purchase").into_response();
    };

    let mut draft = client.purchase_draft_for(&vin);
    let result = draft.submit_address(address);
    let client = client.with_purchase_draft(&draft);

    match result {
        Ok(()) => {
            tracing::info!("Order form submitted");
            (client, Redirect::to("/purchase")).into_response()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Order form rejected");
            let extras = PageExtras {
                address_error: Some(e.to_string()),
                ..PageExtras::default()
            };
            render_page(
                &state,
                client,
                &vin,
                &draft,
                extras,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
    }
}

/// Connect the virtual payment method.
#[instrument(skip(client))]
pub async fn connect_payment(client: ClientState) -> Response {
    let Some(vin) = client.purchase_vin() else {
        return Redirect::to("/purchase").into_response();
    };

    let mut draft = client.purchase_draft_for(&vin);
    draft.connect_payment();
    tracing::info!("Virtual payment connected");

    (client.with_purchase_draft(&draft), Redirect::to("/purchase")).into_response()
}

/// Place the order.
///
/// Redirects to the review modal while the draft is not ready. Posts the
/// order at most once per draft; a failed post leaves the draft unplaced so
/// the customer can retry.
#[instrument(skip(state, client))]
pub async fn confirm(State(state): State<AppState>, client: ClientState) -> Response {
    let Some(vin) = client.purchase_vin() else {
        return Redirect::to("/purchase").into_response();
    };

    let mut draft = client.purchase_draft_for(&vin);
    if !draft.readiness().is_ready() {
        return Redirect::to("/purchase?review=1").into_response();
    }

    if draft.order_placed {
        tracing::debug!("Order already placed, not posting again");
        let extras = PageExtras {
            modal: Some(ModalRequest::Complete),
            ..PageExtras::default()
        };
        return render_page(&state, client, &vin, &draft, extras, StatusCode::OK).await;
    }

    let order = NewOrder::new(
        vin.clone(),
        state.config().dealer.customer_id,
        draft.address.clone(),
    );

    match state.dealer().create_order(&order).await {
        Ok(_) => {
            add_breadcrumb("purchase", "Order placed", Some(&[("vin", vin.as_str())]));
            draft.mark_order_placed();
            let client = client.with_purchase_draft(&draft);
            let extras = PageExtras {
                modal: Some(ModalRequest::Complete),
                ..PageExtras::default()
            };
            render_page(&state, client, &vin, &draft, extras, StatusCode::OK).await
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Failed to place order"
            );
            let extras = PageExtras {
                notice: Some(ORDER_FAILED_NOTICE),
                ..PageExtras::default()
            };
            render_page(
                &state,
                client,
                &vin,
                &draft,
                extras,
                StatusCode::BAD_GATEWAY,
            )
            .await
        }
    }
}
