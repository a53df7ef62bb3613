//! Type-safe price representation using decimal arithmetic.
//!
//! Every amount in the storefront is US dollars, so unlike a general money
//! type there is no currency code to carry around.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A dollar amount.
///
/// Displays with thousands separators and drops the cents when they are
/// zero: `$15,000`, `$15,000.50`, `-$500`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    /// Amount in dollars (not cents).
    pub amount: Decimal,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self { amount }
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = format!("{:.2}", self.amount.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if self.amount.is_sign_negative() && !self.amount.is_zero() {
            "-"
        } else {
            ""
        };

        if cents == "00" {
            write!(f, "{sign}${grouped}")
        } else {
            write!(f, "{sign}${grouped}.{cents}")
        }
    }
}

/// Price the customer pays after the trade-in discount.
///
/// A missing trade-in value counts as zero. The result is not clamped, so a
/// trade-in worth more than the vehicle yields a negative price.
#[must_use]
pub fn current_price(msrp: Decimal, trade_in: Option<Decimal>) -> Price {
    Price::new(msrp - trade_in.unwrap_or_default())
}
