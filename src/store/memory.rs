//! In-memory implementation of the ledger store, used by tests.
//!
//! `begin` clones the whole state into the transaction; entity operations
//! mutate the clone; `commit` swaps it back into the shared state. Dropping
//! a transaction therefore discards every staged write, matching the
//! commit-or-rollback contract of the Postgres store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::catalog::Program;
use crate::error::Result;
use crate::ledger::models::Booking;
use crate::pricing::models::PricingConfiguration;
use crate::store::LedgerStore;

#[derive(Debug, Default, Clone)]
struct MemoryState {
    programs: HashMap<Uuid, Program>,
    // keyed by program id: the configuration is one-to-one with a program
    pricing: HashMap<Uuid, PricingConfiguration>,
    bookings: HashMap<Uuid, Booking>,
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

/// A staged copy of the store state.
pub struct MemoryTx {
    staged: MemoryState,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a program directly; the catalog is owned externally in
    /// production, so this bypasses the transactional API on purpose.
    pub fn seed_program(&self, program: Program) {
        self.lock_state().programs.insert(program.id, program);
    }

    /// Current counter value for a program, for assertions.
    pub fn booking_counter(&self, program_id: Uuid) -> Option<i64> {
        self.lock_state()
            .programs
            .get(&program_id)
            .map(|p| p.total_bookings)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test thread panicked mid-mutation;
        // the snapshot semantics keep the state itself consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LedgerStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx> {
        Ok(MemoryTx {
            staged: self.lock_state().clone(),
        })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        *self.lock_state() = tx.staged;
        Ok(())
    }

    async fn program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Option<Program>> {
        Ok(tx
            .staged
            .programs
            .get(&program_id)
            .filter(|p| p.account_id == account_id)
            .cloned())
    }

    async fn adjust_booking_counter(
        &self,
        tx: &mut Self::Tx,
        program_id: Uuid,
        delta: i64,
    ) -> Result<()> {
        if let Some(program) = tx.staged.programs.get_mut(&program_id) {
            program.total_bookings = (program.total_bookings + delta).max(0);
        }
        Ok(())
    }

    async fn pricing_for_program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Option<PricingConfiguration>> {
        Ok(tx
            .staged
            .pricing
            .get(&program_id)
            .filter(|c| c.account_id == account_id)
            .cloned())
    }

    async fn upsert_pricing(
        &self,
        tx: &mut Self::Tx,
        config: &PricingConfiguration,
    ) -> Result<()> {
        tx.staged.pricing.insert(config.program_id, config.clone());
        Ok(())
    }

    async fn booking(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Option<Booking>> {
        Ok(tx
            .staged
            .bookings
            .get(&booking_id)
            .filter(|b| b.account_id == account_id)
            .cloned())
    }

    async fn booking_exists_for_passport(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
        passport_number: &str,
    ) -> Result<bool> {
        Ok(tx.staged.bookings.values().any(|b| {
            b.account_id == account_id
                && b.program_id == program_id
                && b.passport_number == passport_number
        }))
    }

    async fn bookings_for_program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = tx
            .staged
            .bookings
            .values()
            .filter(|b| b.account_id == account_id && b.program_id == program_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.created_at, b.id));
        Ok(bookings)
    }

    async fn bookings_by_ids(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        booking_ids: &[Uuid],
    ) -> Result<Vec<Booking>> {
        Ok(booking_ids
            .iter()
            .filter_map(|id| tx.staged.bookings.get(id))
            .filter(|b| b.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn insert_booking(&self, tx: &mut Self::Tx, booking: &Booking) -> Result<()> {
        tx.staged.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update_booking(&self, tx: &mut Self::Tx, booking: &Booking) -> Result<()> {
        tx.staged.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn delete_bookings(&self, tx: &mut Self::Tx, booking_ids: &[Uuid]) -> Result<u64> {
        let mut removed = 0;
        for id in booking_ids {
            if tx.staged.bookings.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{City, Program};

    fn program(account_id: Uuid) -> Program {
        Program {
            id: Uuid::new_v4(),
            account_id,
            name: "Test".to_string(),
            cities: vec![City {
                name: "Mecca".to_string(),
                nights: 3,
            }],
            packages: vec![],
            total_bookings: 0,
        }
    }

    #[tokio::test]
    async fn dropped_transaction_discards_staged_writes() {
        let store = MemoryStore::new();
        let account = Uuid::new_v4();
        let p = program(account);
        let program_id = p.id;
        store.seed_program(p);

        {
            let mut tx = store.begin().await.unwrap();
            store
                .adjust_booking_counter(&mut tx, program_id, 5)
                .await
                .unwrap();
            // tx dropped without commit
        }
        assert_eq!(store.booking_counter(program_id), Some(0));
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = MemoryStore::new();
        let account = Uuid::new_v4();
        let p = program(account);
        let program_id = p.id;
        store.seed_program(p);

        let mut tx = store.begin().await.unwrap();
        store
            .adjust_booking_counter(&mut tx, program_id, 2)
            .await
            .unwrap();
        store.commit(tx).await.unwrap();

        assert_eq!(store.booking_counter(program_id), Some(2));
    }

    #[tokio::test]
    async fn counter_floors_at_zero() {
        let store = MemoryStore::new();
        let account = Uuid::new_v4();
        let p = program(account);
        let program_id = p.id;
        store.seed_program(p);

        let mut tx = store.begin().await.unwrap();
        store
            .adjust_booking_counter(&mut tx, program_id, -3)
            .await
            .unwrap();
        store.commit(tx).await.unwrap();

        assert_eq!(store.booking_counter(program_id), Some(0));
    }

    #[tokio::test]
    async fn ownership_scoping_hides_foreign_programs() {
        let store = MemoryStore::new();
        let p = program(Uuid::new_v4());
        let program_id = p.id;
        store.seed_program(p);

        let other_account = Uuid::new_v4();
        let mut tx = store.begin().await.unwrap();
        let found = store.program(&mut tx, other_account, program_id).await.unwrap();
        assert!(found.is_none());
    }
}
