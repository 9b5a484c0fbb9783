//! sqlx/Postgres implementation of the ledger store.
//!
//! Nested structures (cities, packages, hotel tables, selections, payment
//! lists) live as JSONB on their owning row and are decoded into the typed
//! models through `sqlx::types::Json` at this boundary. All queries bind at
//! runtime; no live database is needed to compile.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::catalog::{City, Package, Program};
use crate::error::Result;
use crate::ledger::models::{Booking, Payment, Selection};
use crate::pricing::models::{HotelRate, PersonTypeRate, PricingConfiguration};
use crate::store::LedgerStore;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the schema migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| crate::error::LedgerError::Internal(format!("migration failed: {e}")))?;
        Ok(())
    }
}

#[derive(FromRow)]
struct ProgramRow {
    id: Uuid,
    account_id: Uuid,
    name: String,
    cities: Json<Vec<City>>,
    packages: Json<Vec<Package>>,
    total_bookings: i64,
}

impl From<ProgramRow> for Program {
    fn from(row: ProgramRow) -> Self {
        Program {
            id: row.id,
            account_id: row.account_id,
            name: row.name,
            cities: row.cities.0,
            packages: row.packages.0,
            total_bookings: row.total_bookings,
        }
    }
}

#[derive(FromRow)]
struct PricingRow {
    id: Uuid,
    account_id: Uuid,
    program_id: Uuid,
    ticket_airline_price: Decimal,
    visa_fee: Decimal,
    guide_fee: Decimal,
    transport_fee: Decimal,
    hotel_rates: Json<Vec<HotelRate>>,
    person_types: Json<Vec<PersonTypeRate>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PricingRow> for PricingConfiguration {
    fn from(row: PricingRow) -> Self {
        PricingConfiguration {
            id: row.id,
            account_id: row.account_id,
            program_id: row.program_id,
            ticket_airline_price: row.ticket_airline_price,
            visa_fee: row.visa_fee,
            guide_fee: row.guide_fee,
            transport_fee: row.transport_fee,
            hotel_rates: row.hotel_rates.0,
            person_types: row.person_types.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: Uuid,
    account_id: Uuid,
    program_id: Uuid,
    package_name: Option<String>,
    client_name: String,
    phone_number: Option<String>,
    passport_number: String,
    person_type: String,
    selection: Json<Selection>,
    selling_price: Decimal,
    base_price: Decimal,
    profit: Decimal,
    payments: Json<Vec<Payment>>,
    remaining_balance: Decimal,
    is_fully_paid: bool,
    related_bookings: Json<Vec<Uuid>>,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            account_id: row.account_id,
            program_id: row.program_id,
            package_name: row.package_name,
            client_name: row.client_name,
            phone_number: row.phone_number,
            passport_number: row.passport_number,
            person_type: row.person_type,
            selection: row.selection.0,
            selling_price: row.selling_price,
            base_price: row.base_price,
            profit: row.profit,
            payments: row.payments.0,
            remaining_balance: row.remaining_balance,
            is_fully_paid: row.is_fully_paid,
            related_bookings: row.related_bookings.0,
            created_at: row.created_at,
        }
    }
}

const BOOKING_COLUMNS: &str = r#"
    id, account_id, program_id, package_name,
    client_name, phone_number, passport_number, person_type,
    selection, selling_price, base_price, profit,
    payments, remaining_balance, is_fully_paid, related_bookings, created_at
"#;

impl LedgerStore for PgStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        tx.commit().await?;
        Ok(())
    }

    async fn program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Option<Program>> {
        let row = sqlx::query_as::<_, ProgramRow>(
            r#"
            SELECT id, account_id, name, cities, packages, total_bookings
            FROM programs
            WHERE id = $1 AND account_id = $2
            "#,
        )
        .bind(program_id)
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(Program::from))
    }

    async fn adjust_booking_counter(
        &self,
        tx: &mut Self::Tx,
        program_id: Uuid,
        delta: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE programs
            SET total_bookings = GREATEST(total_bookings + $2, 0)
            WHERE id = $1
            "#,
        )
        .bind(program_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn pricing_for_program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Option<PricingConfiguration>> {
        let row = sqlx::query_as::<_, PricingRow>(
            r#"
            SELECT
                id, account_id, program_id,
                ticket_airline_price, visa_fee, guide_fee, transport_fee,
                hotel_rates, person_types, created_at, updated_at
            FROM pricing_configurations
            WHERE program_id = $1 AND account_id = $2
            "#,
        )
        .bind(program_id)
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(PricingConfiguration::from))
    }

    async fn upsert_pricing(
        &self,
        tx: &mut Self::Tx,
        config: &PricingConfiguration,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pricing_configurations (
                id, account_id, program_id,
                ticket_airline_price, visa_fee, guide_fee, transport_fee,
                hotel_rates, person_types, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (program_id) DO UPDATE SET
                ticket_airline_price = EXCLUDED.ticket_airline_price,
                visa_fee = EXCLUDED.visa_fee,
                guide_fee = EXCLUDED.guide_fee,
                transport_fee = EXCLUDED.transport_fee,
                hotel_rates = EXCLUDED.hotel_rates,
                person_types = EXCLUDED.person_types,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(config.id)
        .bind(config.account_id)
        .bind(config.program_id)
        .bind(config.ticket_airline_price)
        .bind(config.visa_fee)
        .bind(config.guide_fee)
        .bind(config.transport_fee)
        .bind(Json(&config.hotel_rates))
        .bind(Json(&config.person_types))
        .bind(config.created_at)
        .bind(config.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn booking(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Option<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND account_id = $2"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(account_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(Booking::from))
    }

    async fn booking_exists_for_passport(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
        passport_number: &str,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE account_id = $1 AND program_id = $2 AND passport_number = $3
            )
            "#,
        )
        .bind(account_id)
        .bind(program_id)
        .bind(passport_number)
        .fetch_one(&mut **tx)
        .await?;

        Ok(exists)
    }

    async fn bookings_for_program(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        program_id: Uuid,
    ) -> Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE account_id = $1 AND program_id = $2 \
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(account_id)
            .bind(program_id)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn bookings_by_ids(
        &self,
        tx: &mut Self::Tx,
        account_id: Uuid,
        booking_ids: &[Uuid],
    ) -> Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE account_id = $1 AND id = ANY($2)"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(account_id)
            .bind(booking_ids.to_vec())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn insert_booking(&self, tx: &mut Self::Tx, booking: &Booking) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, account_id, program_id, package_name,
                client_name, phone_number, passport_number, person_type,
                selection, selling_price, base_price, profit,
                payments, remaining_balance, is_fully_paid, related_bookings, created_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9,
                $10, $11, $12, $13, $14, $15, $16, $17
            )
            "#,
        )
        .bind(booking.id)
        .bind(booking.account_id)
        .bind(booking.program_id)
        .bind(&booking.package_name)
        .bind(&booking.client_name)
        .bind(&booking.phone_number)
        .bind(&booking.passport_number)
        .bind(&booking.person_type)
        .bind(Json(&booking.selection))
        .bind(booking.selling_price)
        .bind(booking.base_price)
        .bind(booking.profit)
        .bind(Json(&booking.payments))
        .bind(booking.remaining_balance)
        .bind(booking.is_fully_paid)
        .bind(Json(&booking.related_bookings))
        .bind(booking.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn update_booking(&self, tx: &mut Self::Tx, booking: &Booking) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bookings SET
                program_id = $2,
                package_name = $3,
                client_name = $4,
                phone_number = $5,
                passport_number = $6,
                person_type = $7,
                selection = $8,
                selling_price = $9,
                base_price = $10,
                profit = $11,
                payments = $12,
                remaining_balance = $13,
                is_fully_paid = $14,
                related_bookings = $15
            WHERE id = $1
            "#,
        )
        .bind(booking.id)
        .bind(booking.program_id)
        .bind(&booking.package_name)
        .bind(&booking.client_name)
        .bind(&booking.phone_number)
        .bind(&booking.passport_number)
        .bind(&booking.person_type)
        .bind(Json(&booking.selection))
        .bind(booking.selling_price)
        .bind(booking.base_price)
        .bind(booking.profit)
        .bind(Json(&booking.payments))
        .bind(booking.remaining_balance)
        .bind(booking.is_fully_paid)
        .bind(Json(&booking.related_bookings))
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn delete_bookings(&self, tx: &mut Self::Tx, booking_ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ANY($1)")
            .bind(booking_ids.to_vec())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}
