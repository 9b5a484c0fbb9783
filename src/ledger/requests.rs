//! Input DTOs for booking and payment operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::ledger::models::Selection;

/// Fields accepted by booking create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingInput {
    pub client_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub passport_number: String,
    pub person_type: String,
    pub program_id: Uuid,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub selection: Selection,
    pub selling_price: Decimal,
    /// On create, the initial payment list (empty when absent). On update,
    /// `None` keeps the existing payments and `Some` replaces them.
    #[serde(default)]
    pub payments: Option<Vec<PaymentInput>>,
    #[serde(default)]
    pub related_bookings: Vec<Uuid>,
}

/// Fields of a single payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    pub amount: Decimal,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl BookingInput {
    /// Structural validation. Package-selection rules need the program and
    /// are checked by the service.
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(LedgerError::Validation("client name is required".into()));
        }
        if self.passport_number.trim().is_empty() {
            return Err(LedgerError::Validation("passport number is required".into()));
        }
        self.selection.validate()
    }
}

impl Selection {
    /// The three sequences are parallel: one hotel and room type per city.
    pub fn validate(&self) -> Result<()> {
        if self.cities.len() != self.hotel_names.len()
            || self.cities.len() != self.room_types.len()
        {
            return Err(LedgerError::Validation(
                "selection cities, hotels and room types must have equal length".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BookingInput {
        BookingInput {
            client_name: "Amina K".to_string(),
            phone_number: None,
            passport_number: "AB123".to_string(),
            person_type: "adult".to_string(),
            program_id: Uuid::new_v4(),
            package_name: None,
            selection: Selection::default(),
            selling_price: Decimal::ZERO,
            payments: None,
            related_bookings: vec![],
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn rejects_ragged_selection() {
        let mut bad = input();
        bad.selection.cities = vec!["Mecca".to_string()];
        assert!(matches!(
            bad.validate(),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn rejects_blank_passport() {
        let mut bad = input();
        bad.passport_number = "  ".to_string();
        assert!(matches!(bad.validate(), Err(LedgerError::Validation(_))));
    }
}
