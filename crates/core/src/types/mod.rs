//! Core types for the dealership storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod order;
pub mod price;
pub mod saved;
pub mod vehicle;
pub mod vin;

pub use id::*;
pub use order::{AddressError, MAX_ADDRESS_FIELD_CHARS, NewOrder, OrderReadiness, ShippingAddress};
pub use price::{Price, current_price};
pub use saved::SavedVehicles;
pub use vehicle::{Vehicle, VehiclePhoto, VehicleSummary};
pub use vin::{Vin, VinError};
