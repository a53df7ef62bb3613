//! Trade-in value form.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use online_dealership_core::Price;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use super::listings::local_return_path;
use crate::filters;
use crate::middleware::ClientState;

/// Trade-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "trade_in.html")]
pub struct TradeInTemplate {
    /// Current value formatted as a price, if one is recorded.
    pub current: Option<String>,
    /// Raw value for the input field.
    pub value: String,
    pub error: Option<String>,
}

/// Form body of the trade-in update.
#[derive(Debug, Default, Deserialize)]
pub struct TradeInForm {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Parse the submitted trade-in value.
///
/// An empty value clears the trade-in. A leading `$` and thousands
/// separators are tolerated.
///
/// # Errors
///
/// Returns a message if the value is not a non-negative number.
pub fn parse_trade_in(raw: &str) -> Result<Option<Decimal>, String> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    if cleaned.is_empty() {
        return Ok(None);
    }

    let value = Decimal::from_str(&cleaned).map_err(|_| format!("'{raw}' is not a number"))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err("Trade-in value cannot be negative".to_string());
    }
    Ok(Some(value))
}

/// Display the trade-in form.
#[instrument(skip(client))]
pub async fn show(client: ClientState) -> impl IntoResponse {
    let current = client.trade_in_value();

    TradeInTemplate {
        current: current.map(|v| Price::new(v).to_string()),
        value: current.map(|v| v.normalize().to_string()).unwrap_or_default(),
        error: None,
    }
}

/// Record the trade-in value and return to the purchase page.
#[instrument(skip(client, form))]
pub async fn update(client: ClientState, Form(form): Form<TradeInForm>) -> Response {
    match parse_trade_in(&form.value) {
        Ok(value) => {
            tracing::info!(cleared = value.is_none(), "Trade-in value updated");
            let target = local_return_path(form.return_to.as_deref(), "/purchase");
            (client.with_trade_in_value(value), Redirect::to(&target)).into_response()
        }
        Err(message) => {
            let current = client.trade_in_value();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                TradeInTemplate {
                    current: current.map(|v| Price::new(v).to_string()),
                    value: form.value,
                    error: Some(message),
                },
            )
                .into_response()
        }
    }
}
