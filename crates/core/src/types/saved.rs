//! The customer's saved-vehicle list.

use serde::{Deserialize, Serialize};

use super::vin::Vin;

/// Insertion-ordered set of saved VINs.
///
/// Serializes as a plain JSON list (`["VIN1","VIN2"]`), which is also the
/// format of the `savedVehicles` cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedVehicles(Vec<Vin>);

impl SavedVehicles {
    /// A list holding a single VIN.
    #[must_use]
    pub fn singleton(vin: Vin) -> Self {
        Self(vec![vin])
    }

    /// Append `vin` unless it is already saved.
    ///
    /// Returns `true` if the VIN was added.
    pub fn insert(&mut self, vin: Vin) -> bool {
        if self.contains(&vin) {
            return false;
        }
        self.0.push(vin);
        true
    }

    #[must_use]
    pub fn contains(&self, vin: &Vin) -> bool {
        self.0.contains(vin)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vin> {
        self.0.iter()
    }

    /// Parse the JSON list form.
    ///
    /// Duplicates in the input are dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON list of valid VINs.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let vins: Vec<Vin> = serde_json::from_str(json)?;
        let mut saved = Self::default();
        for vin in vins {
            saved.insert(vin);
        }
        Ok(saved)
    }

    /// Serialize to the JSON list form.
    #[must_use]
    pub fn to_json(&self) -> String {
        // A list of plain strings cannot fail to serialize.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }
}

impl IntoIterator for SavedVehicles {
    type Item = Vin;
    type IntoIter = std::vec::IntoIter<Vin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SavedVehicles {
    type Item = &'a Vin;
    type IntoIter = std::slice::Iter<'a, Vin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
