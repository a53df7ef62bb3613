//! Client-state cookie definitions.
//!
//! Every cookie the storefront reads or writes is declared here together
//! with its expiry, so no handler invents a cookie name inline.

/// How long a client-state cookie lives in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieExpiry {
    /// Dropped when the browser session ends.
    Session,
    /// Persisted for a fixed number of days.
    Days(i64),
}

/// A cookie name paired with its expiry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: &'static str,
    pub expiry: CookieExpiry,
}

impl CookieSpec {
    const fn session(name: &'static str) -> Self {
        Self {
            name,
            expiry: CookieExpiry::Session,
        }
    }

    const fn days(name: &'static str, days: i64) -> Self {
        Self {
            name,
            expiry: CookieExpiry::Days(days),
        }
    }
}

/// VIN selected for purchase.
pub const PURCHASE_VEHICLE: CookieSpec = CookieSpec::session("purchaseVehicle");

/// JSON list of saved VINs.
pub const SAVED_VEHICLES: CookieSpec = CookieSpec::days("savedVehicles", 7);

/// VIN shown on the vehicle detail page.
pub const ABOUT_VIN: CookieSpec = CookieSpec::session("aboutVin");

/// Trade-in discount in dollars.
pub const TRADE_IN_VALUE: CookieSpec = CookieSpec::days("trade-in-value", 10);

/// MSRP of the vehicle on the purchase page.
pub const VEHICLE_VALUE: CookieSpec = CookieSpec::days("vehicle-value", 10);

/// JSON-encoded [`PurchaseDraft`](super::PurchaseDraft).
pub const PURCHASE_DRAFT: CookieSpec = CookieSpec::session("purchase-draft");
