//! Storage abstraction: the unit-of-work boundary.
//!
//! Every service operation begins a transaction, performs its reads and
//! writes against it, and commits exactly once. Dropping a transaction
//! without committing discards every staged write, so `?` on any failure
//! path rolls the whole unit back.

pub mod memory;
pub mod postgres;

use uuid::Uuid;

use crate::catalog::Program;
use crate::error::Result;
use crate::ledger::models::Booking;
use crate::pricing::models::PricingConfiguration;

/// Storage interface for the booking ledger.
///
/// Implemented by [`postgres::PgStore`] for production and
/// [`memory::MemoryStore`] for tests. All entity operations take the open
/// transaction; ownership scoping by `account_id` is the implementation's
/// responsibility.
#[allow(async_fn_in_trait)]
pub trait LedgerStore: Send + Sync {
    /// Open transaction handle. Dropping it rolls back.
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx>;
    async fn commit(&self, tx: Self::Tx) -> Result<()>;

    /// Load a program owned by the account.
    async fn program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Option<Program>>;

    /// Adjust a program's live-booking counter by `delta`, floored at 0.
    async fn adjust_booking_counter(
        &self,
        tx: &mut Self::Tx,
        program_id: Uuid,
        delta: i64,
    ) -> Result<()>;

    /// Load the one-to-one pricing configuration for a program, if any.
    async fn pricing_for_program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Option<PricingConfiguration>>;

    /// Insert or replace the pricing configuration for its program.
    async fn upsert_pricing(
        &self,
        tx: &mut Self::Tx,
        config: &PricingConfiguration,
    ) -> Result<()>;

    /// Load a booking owned by the account.
    async fn booking(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Option<Booking>>;

    /// Whether a live booking exists for (account, program, passport).
    async fn booking_exists_for_passport(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
        passport_number: &str,
    ) -> Result<bool>;

    /// All live bookings of a program, oldest first.
    async fn bookings_for_program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Vec<Booking>>;

    /// Bookings matching the given ids that the account owns. Callers
    /// compare lengths to detect a partial match.
    async fn bookings_by_ids(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        booking_ids: &[Uuid],
    ) -> Result<Vec<Booking>>;

    async fn insert_booking(&self, tx: &mut Self::Tx, booking: &Booking) -> Result<()>;

    /// Rewrite a booking row in full.
    async fn update_booking(&self, tx: &mut Self::Tx, booking: &Booking) -> Result<()>;

    /// Delete the given bookings, returning how many rows went away.
    async fn delete_bookings(&self, tx: &mut Self::Tx, booking_ids: &[Uuid]) -> Result<u64>;
}
