//! Vehicle Identification Number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Vin`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VinError {
    /// The input string is empty (after trimming).
    #[error("VIN cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("VIN must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character other than an ASCII letter or digit.
    #[error("VIN contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A Vehicle Identification Number.
///
/// The VIN is the primary lookup key for every backend endpoint, and it is
/// interpolated into request paths and stored in cookies. Parsing therefore
/// only accepts ASCII letters and digits.
///
/// ## Constraints
///
/// - Length: 1-32 characters after trimming surrounding whitespace
/// - ASCII alphanumeric only
///
/// Real VINs are 17 characters, but inventory imports and test data use
/// shorter stock numbers, so the length is not pinned.
///
/// ## Examples
///
/// ```
/// use online_dealership_core::Vin;
///
/// assert!(Vin::parse("1HGCM82633A004352").is_ok());
/// assert!(Vin::parse(" VIN1 ").is_ok());
///
/// assert!(Vin::parse("").is_err());
/// assert!(Vin::parse("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    /// Maximum accepted length.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `Vin` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// [`Vin::MAX_LENGTH`], or contains a non-alphanumeric character.
    pub fn parse(s: &str) -> Result<Self, VinError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(VinError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(VinError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(VinError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the VIN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Vin` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Vin {
    type Err = VinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Vin {
    type Error = VinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_vins() {
        assert!(Vin::parse("1HGCM82633A004352").is_ok());
        assert!(Vin::parse("VIN1").is_ok());
        assert!(Vin::parse("abc123").is_ok());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let vin = Vin::parse("  VIN1\n").unwrap();
        assert_eq!(vin.as_str(), "VIN1");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Vin::parse(""), Err(VinError::Empty));
        assert_eq!(Vin::parse("   "), Err(VinError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "A".repeat(Vin::MAX_LENGTH + 1);
        assert!(matches!(Vin::parse(&long), Err(VinError::TooLong { .. })));
        assert!(Vin::parse(&"A".repeat(Vin::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert_eq!(Vin::parse("../x"), Err(VinError::InvalidCharacter('.')));
        assert_eq!(Vin::parse("a/b"), Err(VinError::InvalidCharacter('/')));
        assert_eq!(Vin::parse("a b"), Err(VinError::InvalidCharacter(' ')));
    }

    #[test]
    fn test_deserialize_validates() {
        let vin: Vin = serde_json::from_str("\"VIN2\"").unwrap();
        assert_eq!(vin.to_string(), "VIN2");

        assert!(serde_json::from_str::<Vin>("\"bad vin\"").is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let vin = Vin::parse("VIN3").unwrap();
        assert_eq!(serde_json::to_string(&vin).unwrap(), "\"VIN3\"");
    }
}
