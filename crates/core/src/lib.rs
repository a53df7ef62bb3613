//! Online Dealership Core - Shared domain types.
//!
//! This crate provides the types used by the storefront and its tests:
//! vehicles, VINs, orders, shipping addresses, prices and the saved-vehicle
//! set.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no cookies. Everything here can be unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and records for the dealership domain

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
