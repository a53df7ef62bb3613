//! Purchase order types: shipping address, wire payload and readiness.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;
use super::vin::Vin;

/// Errors from validating a [`ShippingAddress`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A field is longer than the purchase draft cookie can carry.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Longest accepted value for any address field, in characters.
pub const MAX_ADDRESS_FIELD_CHARS: usize = 100;

/// Shipping address collected by the purchase form.
///
/// All fields are free text. Only the apartment number may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub street_name: String,
    #[serde(default)]
    pub street_number: String,
    #[serde(default)]
    pub apartment_number: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

impl ShippingAddress {
    /// Trim every field in place.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            street_name: self.street_name.trim().to_string(),
            street_number: self.street_number.trim().to_string(),
            apartment_number: self.apartment_number.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip: self.zip.trim().to_string(),
        }
    }

    fn labeled_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Street name", self.street_name.as_str()),
            ("Street number", self.street_number.as_str()),
            ("Apartment number", self.apartment_number.as_str()),
            ("City", self.city.as_str()),
            ("State", self.state.as_str()),
            ("Zip code", self.zip.as_str()),
        ]
    }

    /// Check that every required field is filled in and no field exceeds
    /// [`MAX_ADDRESS_FIELD_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first blank
    /// required field, in form order, or [`AddressError::TooLong`] for the
    /// first oversized field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let fields = self.labeled_fields();

        if let Some((label, _)) = fields
            .iter()
            .find(|(label, value)| *label != "Apartment number" && value.trim().is_empty())
        {
            return Err(AddressError::MissingField(*label));
        }

        match fields
            .iter()
            .find(|(_, value)| value.chars().count() > MAX_ADDRESS_FIELD_CHARS)
        {
            Some((label, _)) => Err(AddressError::TooLong {
                field: *label,
                max: MAX_ADDRESS_FIELD_CHARS,
            }),
            None => Ok(()),
        }
    }

    /// Human-readable single line: `number name apt city state zip`.
    #[must_use]
    pub fn summary(&self) -> String {
        [
            self.street_number.as_str(),
            self.street_name.as_str(),
            self.apartment_number.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Status line shown after the address form is accepted.
    #[must_use]
    pub fn submission_status(&self) -> String {
        format!("Form has been submitted with Input: {}", self.summary())
    }
}

/// Body of `POST /newOrder`.
///
/// Serializes flat: `{vin, customer_id, street_name, street_number,
/// apartment_number, city, state, zip}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub vin: Vin,
    pub customer_id: CustomerId,
    #[serde(flatten)]
    pub address: ShippingAddress,
}

impl NewOrder {
    #[must_use]
    pub const fn new(vin: Vin, customer_id: CustomerId, address: ShippingAddress) -> Self {
        Self {
            vin,
            customer_id,
            address,
        }
    }
}

/// Whether an order can be confirmed, derived from the two purchase flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderReadiness {
    /// Payment connected and address form submitted.
    Ready,
    /// Address submitted, no payment method yet.
    NeedsPayment,
    /// Payment connected, address form not submitted.
    NeedsForm,
    NeedsBoth,
}

impl OrderReadiness {
    pub const PAYMENT_MESSAGE: &'static str = "Add Payment Method";
    pub const FORM_MESSAGE: &'static str = "Submit The Order Form";

    #[must_use]
    pub const fn from_flags(payment_connected: bool, form_submitted: bool) -> Self {
        match (payment_connected, form_submitted) {
            (true, true) => Self::Ready,
            (false, true) => Self::NeedsPayment,
            (true, false) => Self::NeedsForm,
            (false, false) => Self::NeedsBoth,
        }
    }

    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Messages for the error dialog, payment first.
    #[must_use]
    pub fn error_messages(self) -> Vec<&'static str> {
        match self {
            Self::Ready => Vec::new(),
            Self::NeedsPayment => vec![Self::PAYMENT_MESSAGE],
            Self::NeedsForm => vec![Self::FORM_MESSAGE],
            Self::NeedsBoth => vec![Self::PAYMENT_MESSAGE, Self::FORM_MESSAGE],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            street_name: "Summit St".to_string(),
            street_number: "111".to_string(),
            apartment_number: String::new(),
            city: "Kent".to_string(),
            state: "OH".to_string(),
            zip: "44240".to_string(),
        }
    }

    #[test]
    fn test_readiness_table() {
        assert_eq!(OrderReadiness::from_flags(true, true), OrderReadiness::Ready);
        assert_eq!(
            OrderReadiness::from_flags(false, false),
            OrderReadiness::NeedsBoth
        );
        assert_eq!(
            OrderReadiness::from_flags(true, false),
            OrderReadiness::NeedsForm
        );
        assert_eq!(
            OrderReadiness::from_flags(false, true),
            OrderReadiness::NeedsPayment
        );
    }

    #[test]
    fn test_readiness_messages() {
        assert!(OrderReadiness::Ready.error_messages().is_empty());
        assert_eq!(
            OrderReadiness::NeedsBoth.error_messages(),
            vec!["Add Payment Method", "Submit The Order Form"]
        );
        assert_eq!(
            OrderReadiness::NeedsForm.error_messages(),
            vec!["Submit The Order Form"]
        );
        assert_eq!(
            OrderReadiness::NeedsPayment.error_messages(),
            vec!["Add Payment Method"]
        );
    }

    #[test]
    fn test_validate_accepts_blank_apartment() {
        assert!(address().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_field() {
        let mut addr = address();
        addr.apartment_number = "x".repeat(MAX_ADDRESS_FIELD_CHARS);
        assert!(addr.validate().is_ok());

        addr.street_name = "x".repeat(MAX_ADDRESS_FIELD_CHARS + 1);
        let err = addr.validate().unwrap_err();
        assert_eq!(
            err,
            AddressError::TooLong {
                field: "Street name",
                max: MAX_ADDRESS_FIELD_CHARS,
            }
        );
        assert_eq!(err.to_string(), "Street name must be at most 100 characters");
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut addr = address();
        addr.city = "  ".to_string();
        addr.zip = String::new();
        assert_eq!(addr.validate(), Err(AddressError::MissingField("City")));
    }

    #[test]
    fn test_submission_status_skips_blank_parts() {
        assert_eq!(
            address().submission_status(),
            "Form has been submitted with Input: 111 Summit St Kent OH 44240"
        );

        let mut addr = address();
        addr.apartment_number = "4B".to_string();
        assert_eq!(addr.summary(), "111 Summit St 4B Kent OH 44240");
    }

    #[test]
    fn test_trimmed() {
        let mut addr = address();
        addr.city = "  Kent ".to_string();
        assert_eq!(addr.trimmed().city, "Kent");
    }

    #[test]
    fn test_new_order_wire_format() {
        let order = NewOrder::new(Vin::parse("VIN1").unwrap(), CustomerId::new(1), address());
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "vin": "VIN1",
                "customer_id": 1,
                "street_name": "Summit St",
                "street_number": "111",
                "apartment_number": "",
                "city": "Kent",
                "state": "OH",
                "zip": "44240"
            })
        );
    }
}
