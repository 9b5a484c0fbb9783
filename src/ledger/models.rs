//! Booking and payment models.
//!
//! Derived fields (`base_price`, `profit`, `remaining_balance`,
//! `is_fully_paid`) are recomputed through [`Booking::refresh_financials`]
//! after every mutation that touches their inputs; they are never read
//! back stale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reservation on a program, with its payment history and derived
/// financials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub account_id: Uuid,
    pub program_id: Uuid,
    pub package_name: Option<String>,
    pub client_name: String,
    pub phone_number: Option<String>,
    pub passport_number: String,
    pub person_type: String,
    pub selection: Selection,
    pub selling_price: Decimal,
    pub base_price: Decimal,
    pub profit: Decimal,
    pub payments: Vec<Payment>,
    pub remaining_balance: Decimal,
    pub is_fully_paid: bool,
    /// Bookings travelling with this one; grouping only, no financial
    /// effect.
    pub related_bookings: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// The booking's chosen city/hotel/room-type assignment: three parallel
/// sequences, one entry per assigned city.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    pub cities: Vec<String>,
    pub hotel_names: Vec<String>,
    pub room_types: Vec<String>,
}

/// A received payment. Ids are generated at insert time and survive
/// updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub amount: Decimal,
    pub paid_at: Option<DateTime<Utc>>,
    pub method: Option<String>,
    pub note: Option<String>,
}

impl Booking {
    /// Sum of all recorded payments.
    pub fn total_paid(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Rederive profit, remaining balance and the paid-in-full flag from
    /// the current selling price, base price and payment list.
    pub fn refresh_financials(&mut self) {
        self.profit = self.selling_price - self.base_price;
        self.remaining_balance = self.selling_price - self.total_paid();
        self.is_fully_paid = self.remaining_balance <= Decimal::ZERO;
    }
}
