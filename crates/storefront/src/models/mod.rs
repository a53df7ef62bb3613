//! Domain models for the storefront.
//!
//! - [`cookies`] - Names and expiry policy of the client-state cookies
//! - [`purchase`] - Per-browser purchase form state

pub mod cookies;
pub mod purchase;

pub use cookies::{CookieExpiry, CookieSpec};
pub use purchase::PurchaseDraft;
