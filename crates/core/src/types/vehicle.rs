//! Vehicle records as served by the dealership backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::VehicleId;
use super::price::Price;
use super::vin::Vin;

/// A single vehicle (`getVehicleDetails` / `getVehicle`).
///
/// Only the VIN, make, model, year and MSRP are required. Every other field
/// falls back to its default when the backend omits it or sends `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vin: Vin,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mileage: u64,
    pub msrp: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub body_type: String,
    #[serde(default, rename = "mpg-city")]
    pub mpg_city: Option<u32>,
    #[serde(default, rename = "mpg-hwy")]
    pub mpg_hwy: Option<u32>,
    /// Photo URLs, first one is the listing image.
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Vehicle {
    /// Display title, e.g. `2019 Honda Civic`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    /// The listing photo, if any.
    #[must_use]
    pub fn primary_photo(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }

    #[must_use]
    pub const fn msrp_price(&self) -> Price {
        Price::new(self.msrp)
    }
}

/// Record returned by `getAllVehicles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSummary {
    #[serde(default)]
    pub id: Option<VehicleId>,
    pub vin: Vin,
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl VehicleSummary {
    /// One-line label used by the full vehicle list: `make model - year - vin`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {} - {} - {}", self.make, self.model, self.year, self.vin)
    }
}

/// Record returned by `getVehiclePhotos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclePhoto {
    pub photo: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_vehicle() {
        let json = r#"{
            "vin": "1HGCM82633A004352",
            "make": "Honda",
            "model": "Accord",
            "year": 2003,
            "mileage": 120500,
            "msrp": 6500,
            "color": "Silver",
            "type": "Sedan",
            "mpg-city": 24,
            "mpg-hwy": 34,
            "photos": ["https://img.example.com/a.jpg", "https://img.example.com/b.jpg"],
            "features": ["Sunroof", "Heated Seats"]
        }"#;

        let vehicle: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(vehicle.title(), "2003 Honda Accord");
        assert_eq!(vehicle.body_type, "Sedan");
        assert_eq!(vehicle.mpg_city, Some(24));
        assert_eq!(vehicle.mpg_hwy, Some(34));
        assert_eq!(vehicle.msrp, Decimal::new(6500, 0));
        assert_eq!(vehicle.primary_photo(), Some("https://img.example.com/a.jpg"));
        assert_eq!(vehicle.features.len(), 2);
    }

    #[test]
    fn test_deserialize_minimal_vehicle_defaults() {
        let json = r#"{"vin": "VIN1", "make": "Ford", "model": "F-150", "year": 2020, "msrp": "32000.50"}"#;

        let vehicle: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(vehicle.mileage, 0);
        assert!(vehicle.photos.is_empty());
        assert!(vehicle.features.is_empty());
        assert_eq!(vehicle.primary_photo(), None);
        assert_eq!(vehicle.msrp, Decimal::new(3_200_050, 2));
    }

    #[test]
    fn test_deserialize_null_optional_fields() {
        let json = r#"{"vin": "VIN1", "make": "Honda", "model": "Civic", "year": 2019,
            "msrp": 20000, "mileage": null, "color": null, "type": null,
            "mpg-city": null, "photos": null, "features": null}"#;

        let vehicle: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(vehicle.mileage, 0);
        assert_eq!(vehicle.color, "");
        assert_eq!(vehicle.mpg_city, None);
        assert!(vehicle.photos.is_empty());
        assert!(vehicle.features.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_invalid_vin() {
        let json = r#"{"vin": "no/good", "make": "Ford", "model": "Focus", "year": 2015, "msrp": 1}"#;
        assert!(serde_json::from_str::<Vehicle>(json).is_err());
    }

    #[test]
    fn test_summary_label() {
        let json = r#"[{"id": 3, "vin": "VIN1", "make": "Toyota", "model": "Corolla", "year": 2018}]"#;
        let summaries: Vec<VehicleSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(summaries[0].id, Some(VehicleId::new(3)));
        assert_eq!(summaries[0].label(), "Toyota Corolla - 2018 - VIN1");
    }

    #[test]
    fn test_photo_record() {
        let photos: Vec<VehiclePhoto> =
            serde_json::from_str(r#"[{"photo": "https://img.example.com/front.jpg"}]"#).unwrap();
        assert_eq!(photos[0].photo, "https://img.example.com/front.jpg");
    }
}
