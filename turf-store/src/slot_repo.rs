use chrono::NaiveDate;
use sqlx::PgPool;
use turf_core::StoreError;
use turf_shared::{Slot, SlotLabel, SlotStatus};

/// Unconditional reads and removals on the slots table.
#[derive(Clone)]
pub struct SlotRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SlotRow {
    slot_id: i32,
    slot_date: NaiveDate,
    slot_time: String,
    status: String,
}

impl TryFrom<SlotRow> for Slot {
    type Error = StoreError;

    fn try_from(row: SlotRow) -> Result<Self, Self::Error> {
        let slot_time: SlotLabel = row
            .slot_time
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("slot {}: {e}", row.slot_id)))?;
        let status: SlotStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("slot {}: {e}", row.slot_id)))?;
        Ok(Slot {
            slot_id: row.slot_id,
            slot_date: row.slot_date,
            slot_time,
            status,
        })
    }
}

impl SlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Slots with a row on `date`, ordered by hour.
    pub async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Slot>, StoreError> {
        let rows: Vec<SlotRow> = sqlx::query_as(
            "SELECT slot_id, slot_date, slot_time, status FROM slots WHERE slot_date = $1",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        into_slots(rows)
    }

    /// Every slot with a row dated today or later.
    pub async fn list_upcoming(&self) -> Result<Vec<Slot>, StoreError> {
        let rows: Vec<SlotRow> = sqlx::query_as(
            "SELECT slot_id, slot_date, slot_time, status FROM slots WHERE slot_date >= CURRENT_DATE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        into_slots(rows)
    }

    /// Deletes a slot row. Returns `false` when no row had that id.
    pub async fn remove(&self, slot_id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM slots WHERE slot_id = $1")
            .bind(slot_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(result.rows_affected() > 0)
    }
}

fn into_slots(rows: Vec<SlotRow>) -> Result<Vec<Slot>, StoreError> {
    let mut slots = rows.into_iter().map(Slot::try_from).collect::<Result<Vec<_>, _>>()?;
    slots.sort_by_key(|s| (s.slot_date, s.slot_time));
    Ok(slots)
}
