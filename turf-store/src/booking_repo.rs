use std::cmp::Reverse;

use chrono::NaiveDate;
use sqlx::PgPool;
use turf_core::StoreError;
use turf_shared::{Amount, Booking, SlotLabel};

/// Read side of the bookings table.
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    booking_id: i32,
    user_id: i32,
    booking_date: NaiveDate,
    slot_time_from: String,
    slot_time_to: String,
    amount_cents: i64,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            booking_id: row.booking_id,
            user_id: row.user_id,
            date: row.booking_date,
            from_label: row.slot_time_from,
            to_label: row.slot_time_to,
            amount: Amount::from_cents(row.amount_cents),
        }
    }
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT booking_id, user_id, booking_date, slot_time_from, slot_time_to, amount_cents
            FROM bookings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(newest_first(rows))
    }

    pub async fn list_all(&self) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT booking_id, user_id, booking_date, slot_time_from, slot_time_to, amount_cents
            FROM bookings
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(newest_first(rows))
    }
}

/// Latest date first; within a date by start hour, then id.
fn newest_first(rows: Vec<BookingRow>) -> Vec<Booking> {
    let mut bookings: Vec<Booking> = rows.into_iter().map(Booking::from).collect();
    bookings.sort_by_key(|b| {
        let start = b.from_label.parse::<SlotLabel>().ok().map(|l| l.hour());
        (Reverse(b.date), start, b.booking_id)
    });
    bookings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, date: (i32, u32, u32), from: &str) -> BookingRow {
        BookingRow {
            booking_id: id,
            user_id: 1,
            booking_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            slot_time_from: from.to_string(),
            slot_time_to: "11 PM".to_string(),
            amount_cents: 1000,
        }
    }

    #[test]
    fn test_ordering_uses_hours_not_text() {
        let ordered = newest_first(vec![
            row(1, (2025, 6, 30), "10 AM"),
            row(2, (2025, 7, 1), "2 PM"),
            row(3, (2025, 7, 1), "9 AM"),
        ]);
        let ids: Vec<i32> = ordered.iter().map(|b| b.booking_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
