//! Booking ledger operations.
//!
//! Each operation runs against an injected store with an already
//! authenticated account, inside a single unit of work. Base price is
//! recomputed from the current program, pricing configuration and
//! selection whenever any of those change; payment operations touch only
//! the balance-side fields.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::ledger::models::{Booking, Payment};
use crate::ledger::requests::{BookingInput, PaymentInput};
use crate::pricing::calculator::compute_base_cost;
use crate::store::LedgerStore;

/// Create a booking and bump its program's counter, atomically.
#[tracing::instrument(skip(store, input), fields(program_id = %input.program_id))]
pub async fn create_booking<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    input: BookingInput,
) -> Result<Booking> {
    input.validate()?;

    let mut tx = store.begin().await?;

    let program = store
        .program(&mut tx, account_id, input.program_id)
        .await?
        .ok_or(LedgerError::NotFound)?;

    if !program.packages.is_empty() && input.package_name.is_none() {
        return Err(LedgerError::Validation(
            "a package must be selected for this program".into(),
        ));
    }

    if store
        .booking_exists_for_passport(
            &mut tx,
            account_id,
            program.id,
            input.passport_number.trim(),
        )
        .await?
    {
        return Err(LedgerError::Conflict(
            "this person is already booked on this program".into(),
        ));
    }

    let pricing = store
        .pricing_for_program(&mut tx, account_id, program.id)
        .await?;
    let base_price = compute_base_cost(
        &program,
        pricing.as_ref(),
        input.package_name.as_deref(),
        &input.selection,
        &input.person_type,
    );

    let mut booking = Booking {
        id: Uuid::new_v4(),
        account_id,
        program_id: program.id,
        package_name: input.package_name,
        client_name: input.client_name,
        phone_number: input.phone_number,
        passport_number: input.passport_number.trim().to_string(),
        person_type: input.person_type,
        selection: input.selection,
        selling_price: input.selling_price,
        base_price,
        profit: Decimal::ZERO,
        payments: materialize_payments(input.payments.unwrap_or_default()),
        remaining_balance: Decimal::ZERO,
        is_fully_paid: false,
        related_bookings: input.related_bookings,
        created_at: Utc::now(),
    };
    booking.refresh_financials();

    store.insert_booking(&mut tx, &booking).await?;
    store.adjust_booking_counter(&mut tx, program.id, 1).await?;
    store.commit(tx).await?;

    tracing::info!(booking_id = %booking.id, base_price = %booking.base_price, "booking created");
    Ok(booking)
}

/// Update a booking, re-resolving its base price against the current
/// pricing configuration.
///
/// `input.payments: None` keeps the existing payment list. Moving the
/// booking to another program adjusts both counters in the same unit of
/// work.
#[tracing::instrument(skip(store, input))]
pub async fn update_booking<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    booking_id: Uuid,
    input: BookingInput,
) -> Result<Booking> {
    input.validate()?;

    let mut tx = store.begin().await?;

    let existing = store
        .booking(&mut tx, account_id, booking_id)
        .await?
        .ok_or(LedgerError::NotFound)?;

    let program = store
        .program(&mut tx, account_id, input.program_id)
        .await?
        .ok_or(LedgerError::NotFound)?;

    if !program.packages.is_empty() && input.package_name.is_none() {
        return Err(LedgerError::Validation(
            "a package must be selected for this program".into(),
        ));
    }

    // Moving the booking onto another (program, passport) pair must not
    // collide with a booking already live there.
    let passport = input.passport_number.trim();
    if (program.id, passport) != (existing.program_id, existing.passport_number.as_str())
        && store
            .booking_exists_for_passport(&mut tx, account_id, program.id, passport)
            .await?
    {
        return Err(LedgerError::Conflict(
            "this person is already booked on this program".into(),
        ));
    }

    let pricing = store
        .pricing_for_program(&mut tx, account_id, program.id)
        .await?;
    let base_price = compute_base_cost(
        &program,
        pricing.as_ref(),
        input.package_name.as_deref(),
        &input.selection,
        &input.person_type,
    );

    let mut booking = Booking {
        id: existing.id,
        account_id,
        program_id: program.id,
        package_name: input.package_name,
        client_name: input.client_name,
        phone_number: input.phone_number,
        passport_number: input.passport_number.trim().to_string(),
        person_type: input.person_type,
        selection: input.selection,
        selling_price: input.selling_price,
        base_price,
        profit: Decimal::ZERO,
        payments: match input.payments {
            Some(list) => materialize_payments(list),
            None => existing.payments,
        },
        remaining_balance: Decimal::ZERO,
        is_fully_paid: false,
        related_bookings: input.related_bookings,
        created_at: existing.created_at,
    };
    booking.refresh_financials();

    store.update_booking(&mut tx, &booking).await?;

    if existing.program_id != program.id {
        store
            .adjust_booking_counter(&mut tx, existing.program_id, -1)
            .await?;
        store.adjust_booking_counter(&mut tx, program.id, 1).await?;
    }

    store.commit(tx).await?;
    Ok(booking)
}

/// Delete one booking and decrement its program's counter, atomically.
#[tracing::instrument(skip(store))]
pub async fn delete_booking<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    booking_id: Uuid,
) -> Result<()> {
    let mut tx = store.begin().await?;

    let booking = store
        .booking(&mut tx, account_id, booking_id)
        .await?
        .ok_or(LedgerError::NotFound)?;

    store.delete_bookings(&mut tx, &[booking.id]).await?;
    store
        .adjust_booking_counter(&mut tx, booking.program_id, -1)
        .await?;
    store.commit(tx).await?;
    Ok(())
}

/// Delete a set of bookings, all or nothing.
///
/// Fails with Conflict if any requested id is missing or not owned by the
/// account; on success each affected program's counter drops by the number
/// of its bookings in the batch, in one unit of work.
#[tracing::instrument(skip(store, booking_ids), fields(requested = booking_ids.len()))]
pub async fn delete_bookings<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    booking_ids: &[Uuid],
) -> Result<()> {
    let mut ids: Vec<Uuid> = booking_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    let mut tx = store.begin().await?;

    let bookings = store.bookings_by_ids(&mut tx, account_id, &ids).await?;
    if bookings.len() != ids.len() {
        return Err(LedgerError::Conflict(
            "one or more bookings were not found or are not yours".into(),
        ));
    }

    let mut per_program: HashMap<Uuid, i64> = HashMap::new();
    for booking in &bookings {
        *per_program.entry(booking.program_id).or_insert(0) += 1;
    }

    store.delete_bookings(&mut tx, &ids).await?;
    for (program_id, count) in per_program {
        store
            .adjust_booking_counter(&mut tx, program_id, -count)
            .await?;
    }
    store.commit(tx).await?;

    tracing::info!(deleted = ids.len(), "bulk delete committed");
    Ok(())
}

/// Fetch a single booking.
pub async fn get_booking<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    booking_id: Uuid,
) -> Result<Booking> {
    let mut tx = store.begin().await?;
    let booking = store
        .booking(&mut tx, account_id, booking_id)
        .await?
        .ok_or(LedgerError::NotFound)?;
    store.commit(tx).await?;
    Ok(booking)
}

/// All bookings of a program, oldest first.
pub async fn bookings_for_program<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    program_id: Uuid,
) -> Result<Vec<Booking>> {
    let mut tx = store.begin().await?;
    store
        .program(&mut tx, account_id, program_id)
        .await?
        .ok_or(LedgerError::NotFound)?;
    let bookings = store
        .bookings_for_program(&mut tx, account_id, program_id)
        .await?;
    store.commit(tx).await?;
    Ok(bookings)
}

/// Record a payment against a booking and rebalance it.
#[tracing::instrument(skip(store, input))]
pub async fn add_payment<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    booking_id: Uuid,
    input: PaymentInput,
) -> Result<Booking> {
    mutate_payments(store, account_id, booking_id, |payments| {
        payments.push(new_payment(input));
        Ok(true)
    })
    .await
}

/// Replace the fields of an existing payment, preserving its id.
///
/// An unmatched payment id leaves the booking unchanged.
#[tracing::instrument(skip(store, input))]
pub async fn update_payment<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    booking_id: Uuid,
    payment_id: Uuid,
    input: PaymentInput,
) -> Result<Booking> {
    mutate_payments(store, account_id, booking_id, |payments| {
        match payments.iter_mut().find(|p| p.id == payment_id) {
            Some(payment) => {
                payment.amount = input.amount;
                payment.paid_at = input.paid_at;
                payment.method = input.method;
                payment.note = input.note;
                Ok(true)
            }
            None => Ok(false),
        }
    })
    .await
}

/// Remove a payment from a booking and rebalance it.
#[tracing::instrument(skip(store))]
pub async fn delete_payment<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    booking_id: Uuid,
    payment_id: Uuid,
) -> Result<Booking> {
    mutate_payments(store, account_id, booking_id, |payments| {
        let before = payments.len();
        payments.retain(|p| p.id != payment_id);
        if payments.len() == before {
            return Err(LedgerError::NotFound);
        }
        Ok(true)
    })
    .await
}

/// Shared payment-mutation path: load, edit the list, rebalance, persist.
/// Base price and profit are deliberately left untouched. An edit that
/// reports no change skips the write entirely.
async fn mutate_payments<S, F>(
    store: &S,
    account_id: Uuid,
    booking_id: Uuid,
    edit: F,
) -> Result<Booking>
where
    S: LedgerStore,
    F: FnOnce(&mut Vec<Payment>) -> Result<bool>,
{
    let mut tx = store.begin().await?;

    let mut booking = store
        .booking(&mut tx, account_id, booking_id)
        .await?
        .ok_or(LedgerError::NotFound)?;

    if !edit(&mut booking.payments)? {
        return Ok(booking);
    }

    booking.remaining_balance = booking.selling_price - booking.total_paid();
    booking.is_fully_paid = booking.remaining_balance <= Decimal::ZERO;

    store.update_booking(&mut tx, &booking).await?;
    store.commit(tx).await?;
    Ok(booking)
}

fn new_payment(input: PaymentInput) -> Payment {
    Payment {
        id: Uuid::new_v4(),
        amount: input.amount,
        paid_at: input.paid_at,
        method: input.method,
        note: input.note,
    }
}

fn materialize_payments(inputs: Vec<PaymentInput>) -> Vec<Payment> {
    inputs.into_iter().map(new_payment).collect()
}
