//! Booking ledger: bookings, payments and their derived financials.

pub mod models;
pub mod requests;
pub mod services;

pub use models::{Booking, Payment, Selection};
pub use requests::{BookingInput, PaymentInput};
pub use services::{
    add_payment, bookings_for_program, create_booking, delete_booking, delete_bookings,
    delete_payment, get_booking, update_booking, update_payment,
};
