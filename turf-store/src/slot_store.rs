//! Postgres implementation of the slot store.
//!
//! Slot locks are transaction-scoped advisory locks keyed by
//! `(day number, hour)`. They exist whether or not the slot has a row yet,
//! are released by COMMIT or ROLLBACK, and `pg_try_advisory_xact_lock`
//! reports contention as a plain boolean.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use sqlx::{PgPool, Postgres, Transaction};
use turf_core::{LockMode, LockOutcome, SlotStore, SlotTransaction, StoreError};
use turf_shared::{NewBooking, SlotLabel, SlotStatus};

#[derive(Clone)]
pub struct PgSlotStore {
    pool: PgPool,
}

impl PgSlotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotStore for PgSlotStore {
    type Tx = PgSlotTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self.pool.begin().await.map_err(StoreError::backend)?;
        Ok(PgSlotTransaction { tx })
    }
}

pub struct PgSlotTransaction {
    tx: Transaction<'static, Postgres>,
}

/// Advisory lock key for a slot.
fn lock_key(date: NaiveDate, slot: SlotLabel) -> (i32, i32) {
    (date.num_days_from_ce(), slot.hour() as i32)
}

#[async_trait]
impl SlotTransaction for PgSlotTransaction {
    async fn lock_slot(
        &mut self,
        date: NaiveDate,
        slot: SlotLabel,
        mode: LockMode,
    ) -> Result<LockOutcome, StoreError> {
        let (day, hour) = lock_key(date, slot);

        match mode {
            LockMode::Blocking => {
                sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
                    .bind(day)
                    .bind(hour)
                    .execute(&mut *self.tx)
                    .await
                    .map_err(StoreError::backend)?;
            }
            LockMode::NonBlocking => {
                let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_xact_lock($1, $2)")
                    .bind(day)
                    .bind(hour)
                    .fetch_one(&mut *self.tx)
                    .await
                    .map_err(StoreError::backend)?;
                if !acquired {
                    return Ok(LockOutcome::Contended);
                }
            }
        }

        let status: Option<String> = sqlx::query_scalar(
            r#"
            SELECT status
            FROM slots
            WHERE slot_date = $1 AND slot_time = $2
            "#,
        )
        .bind(date)
        .bind(slot.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;

        let status = match status {
            Some(raw) => raw.parse().map_err(|e: turf_shared::SlotParseError| StoreError::Corrupt(e.to_string()))?,
            None => SlotStatus::Available,
        };
        Ok(LockOutcome::Acquired(status))
    }

    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<i32, StoreError> {
        sqlx::query_scalar(
            r#"
            INSERT INTO bookings (user_id, booking_date, slot_time_from, slot_time_to, amount_cents)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING booking_id
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.date)
        .bind(&booking.from_label)
        .bind(&booking.to_label)
        .bind(booking.amount.cents())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::backend)
    }

    async fn upsert_status(
        &mut self,
        date: NaiveDate,
        slot: SlotLabel,
        status: SlotStatus,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO slots (slot_date, slot_time, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (slot_date, slot_time) DO UPDATE
            SET status = EXCLUDED.status
            "#,
        )
        .bind(date)
        .bind(slot.to_string())
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn set_last_booking_date(&mut self, user_id: i32, date: NaiveDate) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_booking_date = $1 WHERE user_id = $2")
            .bind(date)
            .bind(user_id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(StoreError::backend)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(StoreError::backend)
    }
}
