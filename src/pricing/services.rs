//! Pricing configuration writes and the cascade recalculation.
//!
//! A pricing change invalidates the cost basis of every booking on the
//! program, so the configuration write and all dependent booking rewrites
//! share one unit of work: either all become visible together or none do.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::pricing::calculator::compute_base_cost;
use crate::pricing::models::PricingConfiguration;
use crate::pricing::requests::PricingInput;
use crate::store::LedgerStore;

/// Create or replace the pricing configuration for a program and
/// recompute every dependent booking's financials.
#[tracing::instrument(skip(store, input), fields(program_id = %input.program_id))]
pub async fn upsert_pricing_configuration<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    input: PricingInput,
) -> Result<PricingConfiguration> {
    input.validate()?;

    let mut tx = store.begin().await?;

    let program = store
        .program(&mut tx, account_id, input.program_id)
        .await?
        .ok_or(LedgerError::NotFound)?;

    let existing = store
        .pricing_for_program(&mut tx, account_id, program.id)
        .await?;
    let now = Utc::now();

    let config = PricingConfiguration {
        id: existing.as_ref().map(|e| e.id).unwrap_or_else(Uuid::new_v4),
        account_id,
        program_id: program.id,
        ticket_airline_price: input.ticket_airline_price,
        visa_fee: input.visa_fee,
        guide_fee: input.guide_fee,
        transport_fee: input.transport_fee,
        hotel_rates: input.hotel_rates,
        person_types: input.person_types,
        created_at: existing.as_ref().map(|e| e.created_at).unwrap_or(now),
        updated_at: now,
    };
    store.upsert_pricing(&mut tx, &config).await?;

    let bookings = store
        .bookings_for_program(&mut tx, account_id, program.id)
        .await?;
    let recomputed = bookings.len();

    for mut booking in bookings {
        booking.base_price = compute_base_cost(
            &program,
            Some(&config),
            booking.package_name.as_deref(),
            &booking.selection,
            &booking.person_type,
        );
        booking.refresh_financials();
        store.update_booking(&mut tx, &booking).await?;
    }

    store.commit(tx).await?;

    tracing::info!(recomputed, "pricing configuration applied");
    Ok(config)
}
