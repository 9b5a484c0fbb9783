//! Pricing: per-program cost inputs and the base-cost calculation.
//!
//! `calculator` is pure math over typed values; `services` owns the
//! pricing write path, including the cascade recalculation of every
//! dependent booking inside one unit of work.

pub mod calculator;
pub mod models;
pub mod requests;
pub mod services;

pub use calculator::{compute_base_cost, round_amount};
pub use models::{HotelRate, PersonTypeRate, PricingConfiguration};
pub use services::upsert_pricing_configuration;
