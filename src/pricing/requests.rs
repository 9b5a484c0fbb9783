//! Input DTO for pricing configuration writes.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::pricing::models::{HotelRate, PersonTypeRate};

/// Fields accepted by the pricing upsert.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingInput {
    pub program_id: Uuid,
    pub ticket_airline_price: Decimal,
    pub visa_fee: Decimal,
    pub guide_fee: Decimal,
    pub transport_fee: Decimal,
    #[serde(default)]
    pub hotel_rates: Vec<HotelRate>,
    #[serde(default)]
    pub person_types: Vec<PersonTypeRate>,
}

impl PricingInput {
    pub fn validate(&self) -> Result<()> {
        let fees = [
            ("ticket_airline_price", self.ticket_airline_price),
            ("visa_fee", self.visa_fee),
            ("guide_fee", self.guide_fee),
            ("transport_fee", self.transport_fee),
        ];
        for (name, amount) in fees {
            if amount < Decimal::ZERO {
                return Err(LedgerError::Validation(format!(
                    "{name} must not be negative"
                )));
            }
        }

        for rate in &self.hotel_rates {
            if rate.nightly_by_room_type.values().any(|&p| p < Decimal::ZERO) {
                return Err(LedgerError::Validation(format!(
                    "nightly prices for {} in {} must not be negative",
                    rate.hotel_name, rate.city
                )));
            }
        }

        for person in &self.person_types {
            if person.ticket_percentage < Decimal::ZERO
                || person.ticket_percentage > Decimal::ONE_HUNDRED
            {
                return Err(LedgerError::Validation(format!(
                    "ticket percentage for {} must be between 0 and 100",
                    person.person_type
                )));
            }
        }
        Ok(())
    }
}
