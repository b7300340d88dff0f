//! House Models
//!
//! Data structures matching the collection endpoint, plus input validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ValidationError};

/// Allergen classification used when the user picks nothing
pub const NO_ALLERGEN_INFO: &str = "none";

/// Allergen options offered by the add-house form
pub const ALLERGEN_OPTIONS: &[&str] = &[NO_ALLERGEN_INFO, "gluten-free", "nut-free", "dairy-free", "vegan"];

/// One participating household (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    /// Assigned by the remote store
    pub id: u32,
    pub name: String,
    pub address: String,
    pub candy_in_stock: bool,
    pub allergen_free: String,
}

impl House {
    /// Label shown in the allergen column
    pub fn allergen_label(&self) -> &str {
        if self.allergen_free.trim().is_empty() {
            NO_ALLERGEN_INFO
        } else {
            &self.allergen_free
        }
    }
}

/// Validated input for creating a house
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHouse {
    name: String,
    address: String,
    allergen_free: String,
}

impl NewHouse {
    /// Trims and checks user input; name and address are required
    pub fn new(name: &str, address: &str, allergen_free: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let address = address.trim();
        if address.is_empty() {
            return Err(ValidationError::MissingAddress);
        }
        let allergen_free = match allergen_free.trim() {
            "" => NO_ALLERGEN_INFO,
            other => other,
        };
        Ok(Self {
            name: name.to_string(),
            address: address.to_string(),
            allergen_free: allergen_free.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn allergen_free(&self) -> &str {
        &self.allergen_free
    }
}

// ========================
// Request Bodies
// ========================

/// POST body; new houses always start stocked
#[derive(Debug, Serialize)]
pub struct CreateHouseBody<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub candy_in_stock: bool,
    pub allergen_free: &'a str,
}

impl<'a> From<&'a NewHouse> for CreateHouseBody<'a> {
    fn from(house: &'a NewHouse) -> Self {
        Self {
            name: &house.name,
            address: &house.address,
            candy_in_stock: true,
            allergen_free: &house.allergen_free,
        }
    }
}

/// PATCH body, exactly one field
#[derive(Debug, Serialize)]
pub struct CandyPatchBody {
    pub candy_in_stock: bool,
}

// ========================
// Boundary Validation
// ========================

/// Decode a list response and check it against the house shape
pub fn decode_houses(body: &[u8]) -> Result<Vec<House>, ApiError> {
    let houses: Vec<House> =
        serde_json::from_slice(body).map_err(|e| ApiError::Protocol(e.to_string()))?;
    validate_houses(&houses)?;
    Ok(houses)
}

/// Checks the invariants serde cannot express: non-empty text and unique ids
pub fn validate_houses(houses: &[House]) -> Result<(), ApiError> {
    let mut seen = HashSet::with_capacity(houses.len());
    for house in houses {
        if house.name.trim().is_empty() {
            return Err(ApiError::Protocol(format!("house {} has an empty name", house.id)));
        }
        if house.address.trim().is_empty() {
            return Err(ApiError::Protocol(format!("house {} has an empty address", house.id)));
        }
        if !seen.insert(house.id) {
            return Err(ApiError::Protocol(format!("duplicate house id {}", house.id)));
        }
    }
    Ok(())
}
