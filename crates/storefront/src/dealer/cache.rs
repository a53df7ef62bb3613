//! Cache types for dealership backend reads.

use online_dealership_core::{Vehicle, VehiclePhoto, VehicleSummary, Vin};

/// Cache key, one variant per cached endpoint.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    VehicleDetails(Vin),
    Vehicle(Vin),
    AllVehicles,
    Features(Vin),
    Photos(Vin),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Vehicle(Box<Vehicle>),
    Vehicles(Vec<VehicleSummary>),
    Features(Vec<String>),
    Photos(Vec<VehiclePhoto>),
}
