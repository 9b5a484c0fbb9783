//! Booking ledger core for a travel agency.
//!
//! Computes the true cost basis of a reservation from a nested pricing
//! configuration and keeps derived financial fields (base price, profit,
//! remaining balance, paid-in-full flag) consistent as bookings, payments
//! and pricing configurations change.
//!
//! The crate is a library invoked by an already-authenticated HTTP layer.
//! Every operation takes an explicitly injected [`store::LedgerStore`];
//! multi-row mutations run inside one unit of work that commits or rolls
//! back as a whole.

pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pricing;
pub mod store;
pub mod telemetry;

pub use error::{LedgerError, Result};
pub use pricing::calculator::compute_base_cost;
pub use store::{memory::MemoryStore, postgres::PgStore, LedgerStore};
