//! Cookie-backed client state.
//!
//! `ClientState` is the single place handlers read and write the
//! storefront's browser cookies. It wraps a signed cookie jar so values the
//! storefront did not write (or that were edited in the browser) read as
//! absent. Each cookie has a typed accessor and the expiry declared in
//! [`crate::models::cookies`].
//!
//! # Example
//!
//! ```rust,ignore
//! async fn handler(state: ClientState) -> impl IntoResponse {
//!     let (state, added) = state.save_vehicle(vin);
//!     (state, Redirect::to("/saved-vehicles"))
//! }
//! ```

use std::convert::Infallible;
use std::str::FromStr;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use online_dealership_core::{SavedVehicles, Vin};
use rust_decimal::Decimal;

use crate::models::cookies::{
    ABOUT_VIN, PURCHASE_DRAFT, PURCHASE_VEHICLE, SAVED_VEHICLES, TRADE_IN_VALUE, VEHICLE_VALUE,
};
use crate::models::{CookieExpiry, CookieSpec, PurchaseDraft};
use crate::state::AppState;

/// Typed view over the storefront's signed cookies.
///
/// Writers consume `self` and return the updated state; return it from the
/// handler (it implements `IntoResponseParts`) to emit the `Set-Cookie`
/// headers.
#[derive(Clone)]
pub struct ClientState {
    jar: SignedCookieJar,
    secure: bool,
}

impl ClientState {
    /// Wrap an existing jar.
    #[must_use]
    pub const fn new(jar: SignedCookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    fn get(&self, spec: CookieSpec) -> Option<String> {
        self.jar.get(spec.name).map(|c| c.value().to_owned())
    }

    fn set(self, spec: CookieSpec, value: String) -> Self {
        let mut cookie = Cookie::build((spec.name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);

        if let CookieExpiry::Days(days) = spec.expiry {
            cookie = cookie.max_age(time::Duration::days(days));
        }

        Self {
            jar: self.jar.add(cookie),
            secure: self.secure,
        }
    }

    fn remove(self, spec: CookieSpec) -> Self {
        Self {
            jar: self.jar.remove(Cookie::build(spec.name).path("/")),
            secure: self.secure,
        }
    }

    // =========================================================================
    // Purchase selection
    // =========================================================================

    /// VIN the customer chose to purchase.
    #[must_use]
    pub fn purchase_vin(&self) -> Option<Vin> {
        self.get(PURCHASE_VEHICLE)
            .and_then(|value| Vin::parse(&value).ok())
    }

    /// Select `vin` for purchase, dropping a draft that belongs to another VIN.
    #[must_use]
    pub fn with_purchase_vin(self, vin: &Vin) -> Self {
        let stale_draft = self
            .purchase_draft()
            .is_some_and(|draft| &draft.vin != vin);

        let state = self.set(PURCHASE_VEHICLE, vin.to_string());
        if stale_draft {
            state.remove(PURCHASE_DRAFT)
        } else {
            state
        }
    }

    // =========================================================================
    // Saved vehicles
    // =========================================================================

    /// The saved-vehicle list; empty when missing or unreadable.
    #[must_use]
    pub fn saved_vehicles(&self) -> SavedVehicles {
        let Some(json) = self.get(SAVED_VEHICLES) else {
            return SavedVehicles::default();
        };

        SavedVehicles::from_json(&json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable saved vehicles cookie");
            SavedVehicles::default()
        })
    }

    /// Add `vin` to the saved list unless it is already there.
    ///
    /// Returns the updated state and whether the VIN was added. The cookie
    /// is only rewritten when the list changed.
    #[must_use]
    pub fn save_vehicle(self, vin: Vin) -> (Self, bool) {
        let mut saved = self.saved_vehicles();
        if !saved.insert(vin) {
            return (self, false);
        }

        tracing::debug!(count = saved.len(), "Saved vehicles updated");
        (self.set(SAVED_VEHICLES, saved.to_json()), true)
    }

    // =========================================================================
    // Vehicle detail
    // =========================================================================

    #[must_use]
    pub fn about_vin(&self) -> Option<Vin> {
        self.get(ABOUT_VIN).and_then(|value| Vin::parse(&value).ok())
    }

    #[must_use]
    pub fn with_about_vin(self, vin: &Vin) -> Self {
        self.set(ABOUT_VIN, vin.to_string())
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Trade-in discount, if one was recorded.
    #[must_use]
    pub fn trade_in_value(&self) -> Option<Decimal> {
        self.get(TRADE_IN_VALUE)
            .and_then(|value| Decimal::from_str(value.trim()).ok())
    }

    /// Record (or clear, with `None`) the trade-in discount.
    #[must_use]
    pub fn with_trade_in_value(self, value: Option<Decimal>) -> Self {
        match value {
            Some(amount) => self.set(TRADE_IN_VALUE, amount.normalize().to_string()),
            None => self.remove(TRADE_IN_VALUE),
        }
    }

    /// MSRP of the vehicle last shown on the purchase page.
    #[must_use]
    pub fn vehicle_value(&self) -> Option<Decimal> {
        self.get(VEHICLE_VALUE)
            .and_then(|value| Decimal::from_str(value.trim()).ok())
    }

    #[must_use]
    pub fn with_vehicle_value(self, msrp: Decimal) -> Self {
        self.set(VEHICLE_VALUE, msrp.normalize().to_string())
    }

    // =========================================================================
    // Purchase draft
    // =========================================================================

    /// The stored purchase draft, whatever VIN it belongs to.
    #[must_use]
    pub fn purchase_draft(&self) -> Option<PurchaseDraft> {
        let json = self.get(PURCHASE_DRAFT)?;
        serde_json::from_str(&json)
            .inspect_err(|e| tracing::warn!(error = %e, "Discarding unreadable purchase draft"))
            .ok()
    }

    /// The draft for `vin`, or a fresh one if none matches.
    #[must_use]
    pub fn purchase_draft_for(&self, vin: &Vin) -> PurchaseDraft {
        self.purchase_draft()
            .filter(|draft| &draft.vin == vin)
            .unwrap_or_else(|| PurchaseDraft::new(vin.clone()))
    }

    #[must_use]
    pub fn with_purchase_draft(self, draft: &PurchaseDraft) -> Self {
        match serde_json::to_string(draft) {
            Ok(json) => self.set(PURCHASE_DRAFT, json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize purchase draft");
                self
            }
        }
    }
}

impl<S> FromRequestParts<S> for ClientState
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let jar = SignedCookieJar::from_headers(&parts.headers, app.cookie_key().clone());
        Ok(Self::new(jar, app.config().secure_cookies()))
    }
}

impl IntoResponseParts for ClientState {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
    use axum_extra::extract::cookie::Key;

    use super::*;

    fn key() -> Key {
        Key::from(&[7u8; 64])
    }

    fn empty_state() -> ClientState {
        ClientState::new(SignedCookieJar::new(key()), false)
    }

    fn vin(s: &str) -> Vin {
        Vin::parse(s).unwrap()
    }

    fn saved_list(state: &ClientState) -> Vec<String> {
        state
            .saved_vehicles()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_save_vehicle_initializes_singleton() {
        let (state, added) = empty_state().save_vehicle(vin("VIN3"));
        assert!(added);
        assert_eq!(saved_list(&state), vec!["VIN3"]);
    }

    #[test]
    fn test_save_vehicle_is_idempotent() {
        let (state, _) = empty_state().save_vehicle(vin("VIN1"));
        let (state, added) = state.save_vehicle(vin("VIN1"));
        assert!(!added);
        assert_eq!(saved_list(&state), vec!["VIN1"]);

        let (state, added) = state.save_vehicle(vin("VIN2"));
        assert!(added);
        assert_eq!(saved_list(&state), vec!["VIN1", "VIN2"]);
    }

    #[test]
    fn test_saved_vehicles_cookie_expires_in_seven_days() {
        let (state, _) = empty_state().save_vehicle(vin("VIN1"));
        let cookie = state.jar.get(SAVED_VEHICLES.name).unwrap();
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_vehicle_value_expires_in_ten_days() {
        let state = empty_state().with_vehicle_value(Decimal::new(20_000, 0));
        let cookie = state.jar.get(VEHICLE_VALUE.name).unwrap();
        assert_eq!(cookie.max_age(), Some(time::Duration::days(10)));
        assert_eq!(state.vehicle_value(), Some(Decimal::new(20_000, 0)));
    }

    #[test]
    fn test_purchase_vin_is_a_session_cookie() {
        let state = empty_state().with_purchase_vin(&vin("VIN1"));
        let cookie = state.jar.get(PURCHASE_VEHICLE.name).unwrap();
        assert_eq!(cookie.max_age(), None);
        assert_eq!(state.purchase_vin(), Some(vin("VIN1")));
    }

    #[test]
    fn test_unsigned_cookie_reads_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("purchaseVehicle=VIN9; savedVehicles=%5B%22VIN9%22%5D"),
        );
        let state = ClientState::new(SignedCookieJar::from_headers(&headers, key()), false);

        assert_eq!(state.purchase_vin(), None);
        assert!(state.saved_vehicles().is_empty());
    }

    #[test]
    fn test_trade_in_value_roundtrip_and_clear() {
        let state = empty_state().with_trade_in_value(Some(Decimal::new(5_000, 0)));
        assert_eq!(state.trade_in_value(), Some(Decimal::new(5_000, 0)));

        let state = state.with_trade_in_value(None);
        assert_eq!(state.trade_in_value(), None);
    }

    #[test]
    fn test_purchase_draft_bound_to_vin() {
        let mut draft = PurchaseDraft::new(vin("VIN1"));
        draft.connect_payment();
        let state = empty_state()
            .with_purchase_vin(&vin("VIN1"))
            .with_purchase_draft(&draft);

        assert!(state.purchase_draft_for(&vin("VIN1")).payment_connected);
        assert!(!state.purchase_draft_for(&vin("VIN2")).payment_connected);
    }

    #[test]
    fn test_selecting_other_vin_drops_draft() {
        let draft = PurchaseDraft::new(vin("VIN1"));
        let state = empty_state()
            .with_purchase_vin(&vin("VIN1"))
            .with_purchase_draft(&draft);

        let same = state.clone().with_purchase_vin(&vin("VIN1"));
        assert!(same.purchase_draft().is_some());

        let other = state.with_purchase_vin(&vin("VIN2"));
        assert!(other.purchase_draft().is_none());
        assert_eq!(other.purchase_vin(), Some(vin("VIN2")));
    }
}
