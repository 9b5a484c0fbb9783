//! Program catalog models.
//!
//! The catalog is owned externally; the ledger reads itinerary structure
//! and packages, and mutates only the running booking counter. Nested
//! structures are stored as JSONB on the program row and deserialised into
//! these types at the storage boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A sellable itinerary: ordered cities with night counts, optional
/// packages, and a running count of live bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub cities: Vec<City>,
    pub packages: Vec<Package>,
    pub total_bookings: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub nights: i64,
}

/// A named bundle within a program: eligible hotels per city plus a price
/// table keyed by hotel combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub hotels_by_city: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub price_structures: Vec<PriceStructure>,
}

/// One row of a package's price table: a hotel combination key and the
/// room occupancies it covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceStructure {
    pub hotel_combination: String,
    #[serde(default)]
    pub room_types: Vec<RoomOccupancy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomOccupancy {
    pub room_type: String,
    pub guests: i64,
}

impl Program {
    /// Look up a package by name.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Night count for a city, if the itinerary includes it.
    pub fn nights_in(&self, city: &str) -> Option<i64> {
        self.cities.iter().find(|c| c.name == city).map(|c| c.nights)
    }
}
