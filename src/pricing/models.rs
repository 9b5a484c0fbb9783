//! Pricing configuration models.
//!
//! One configuration per program: flat fees, a per-hotel nightly price
//! table and per-person-type ticket percentages. Stored as one row with
//! JSONB blobs for the nested tables.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::calculator::DEFAULT_TICKET_PERCENTAGE;

/// Cost inputs for one program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfiguration {
    pub id: Uuid,
    pub account_id: Uuid,
    pub program_id: Uuid,
    pub ticket_airline_price: Decimal,
    pub visa_fee: Decimal,
    pub guide_fee: Decimal,
    pub transport_fee: Decimal,
    pub hotel_rates: Vec<HotelRate>,
    pub person_types: Vec<PersonTypeRate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nightly prices for one hotel in one city, keyed by room type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelRate {
    pub hotel_name: String,
    pub city: String,
    #[serde(default)]
    pub nightly_by_room_type: HashMap<String, Decimal>,
}

/// Ticket-price percentage multiplier for one person type (0–100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonTypeRate {
    pub person_type: String,
    pub ticket_percentage: Decimal,
}

impl PricingConfiguration {
    /// Configured ticket percentage for a person type, or the default
    /// (100) when no entry exists.
    pub fn ticket_percentage_for(&self, person_type: &str) -> Decimal {
        self.person_types
            .iter()
            .find(|p| p.person_type == person_type)
            .map(|p| p.ticket_percentage)
            .unwrap_or(DEFAULT_TICKET_PERCENTAGE)
    }

    /// Nightly price for a hotel in a city for a room type, if configured.
    pub fn nightly_price(&self, hotel: &str, city: &str, room_type: &str) -> Option<Decimal> {
        self.hotel_rates
            .iter()
            .find(|h| h.hotel_name == hotel && h.city == city)
            .and_then(|h| h.nightly_by_room_type.get(room_type))
            .copied()
    }
}
