//! Purchase page state.
//!
//! The purchase page collects an address, a (virtual) payment connection and
//! an explicit confirmation across several requests. `PurchaseDraft` holds
//! that state between them; it is stored in the `purchase-draft` cookie and
//! bound to the VIN it was started for.

use online_dealership_core::{AddressError, OrderReadiness, ShippingAddress, Vin};
use serde::{Deserialize, Serialize};

/// Per-browser purchase form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    /// Vehicle this draft belongs to.
    pub vin: Vin,
    #[serde(default)]
    pub address: ShippingAddress,
    #[serde(default)]
    pub payment_connected: bool,
    #[serde(default)]
    pub form_submitted: bool,
    /// Status line shown under the address form.
    #[serde(default)]
    pub status: Option<String>,
    /// Set once the backend accepted the order.
    #[serde(default)]
    pub order_placed: bool,
}

impl PurchaseDraft {
    /// A fresh draft for `vin`.
    #[must_use]
    pub fn new(vin: Vin) -> Self {
        Self {
            vin,
            address: ShippingAddress::default(),
            payment_connected: false,
            form_submitted: false,
            status: None,
            order_placed: false,
        }
    }

    #[must_use]
    pub const fn readiness(&self) -> OrderReadiness {
        OrderReadiness::from_flags(self.payment_connected, self.form_submitted)
    }

    /// Label of the payment button.
    #[must_use]
    pub const fn payment_button_label(&self) -> &'static str {
        if self.payment_connected {
            "Virtual Payment Connected"
        } else {
            "Connect Virtual Payment Method"
        }
    }

    /// Accept the address form.
    ///
    /// The submitted values are kept when a required field is blank so the
    /// form re-renders with what the customer typed. Oversized values are
    /// never stored, since the draft travels in a cookie.
    ///
    /// # Errors
    ///
    /// Returns the validation error if a required field is blank or too
    /// long; the draft is then left unsubmitted.
    pub fn submit_address(&mut self, address: ShippingAddress) -> Result<(), AddressError> {
        let address = address.trimmed();
        let result = address.validate();

        match &result {
            Ok(()) => {
                self.status = Some(address.submission_status());
                self.form_submitted = true;
            }
            Err(_) => {
                self.status = None;
                self.form_submitted = false;
            }
        }

        if !matches!(result, Err(AddressError::TooLong { .. })) {
            self.address = address;
        }
        result
    }

    pub const fn connect_payment(&mut self) {
        self.payment_connected = true;
    }

    pub const fn mark_order_placed(&mut self) {
        self.order_placed = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> PurchaseDraft {
        PurchaseDraft::new(Vin::parse("VIN1").unwrap())
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            street_name: " Summit St ".to_string(),
            street_number: "111".to_string(),
            apartment_number: String::new(),
            city: "Kent".to_string(),
            state: "OH".to_string(),
            zip: "44240".to_string(),
        }
    }

    #[test]
    fn test_new_draft_needs_both() {
        let draft = draft();
        assert_eq!(draft.readiness(), OrderReadiness::NeedsBoth);
        assert_eq!(draft.payment_button_label(), "Connect Virtual Payment Method");
    }

    #[test]
    fn test_submit_address_flips_form_flag() {
        let mut draft = draft();
        draft.submit_address(address()).unwrap();

        assert!(draft.form_submitted);
        assert_eq!(draft.address.street_name, "Summit St");
        assert_eq!(
            draft.status.as_deref(),
            Some("Form has been submitted with Input: 111 Summit St Kent OH 44240")
        );
        assert_eq!(draft.readiness(), OrderReadiness::NeedsPayment);
    }

    #[test]
    fn test_submit_invalid_address_keeps_values_and_unsets_flag() {
        let mut draft = draft();
        draft.submit_address(address()).unwrap();

        let mut incomplete = address();
        incomplete.zip = " ".to_string();
        assert!(draft.submit_address(incomplete).is_err());

        assert!(!draft.form_submitted);
        assert!(draft.status.is_none());
        assert_eq!(draft.address.city, "Kent");
    }

    #[test]
    fn test_submit_oversized_address_is_not_stored() {
        let mut draft = draft();
        draft.submit_address(address()).unwrap();

        let mut oversized = address();
        oversized.street_name = "x".repeat(5000);
        let err = draft.submit_address(oversized).unwrap_err();

        assert!(matches!(err, AddressError::TooLong { field: "Street name", .. }));
        assert!(!draft.form_submitted);
        assert_eq!(draft.address.street_name, "Summit St");
        assert!(serde_json::to_string(&draft).unwrap().len() < 1024);
    }

    #[test]
    fn test_connect_payment() {
        let mut draft = draft();
        draft.connect_payment();
        assert_eq!(draft.readiness(), OrderReadiness::NeedsForm);
        assert_eq!(draft.payment_button_label(), "Virtual Payment Connected");

        draft.submit_address(address()).unwrap();
        assert!(draft.readiness().is_ready());
    }

    #[test]
    fn test_draft_json_roundtrip_tolerates_missing_fields() {
        let parsed: PurchaseDraft = serde_json::from_str(r#"{"vin": "VIN1"}"#).unwrap();
        assert_eq!(parsed, draft());
    }
}
