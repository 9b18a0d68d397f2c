use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use turf_shared::{SlotLabel, SlotStatus};

use crate::schedule::parse_date;
use crate::store::{LockMode, LockOutcome, SlotStore, SlotTransaction};
use crate::{BookingError, BookingResult};

/// Marks one slot as under maintenance.
///
/// Takes the same blocking slot lock a booking does, so it cannot slip in
/// between a booking's check and its claim. A booked slot is reported as
/// `SlotConflict`, one already under maintenance as `SlotUnderMaintenance`.
#[instrument(skip_all, fields(date = %date, time = %time))]
pub async fn assign_maintenance<S>(store: &S, date: &str, time: &str) -> BookingResult<SlotLabel>
where
    S: SlotStore + ?Sized,
{
    let date = parse_date(date)?;
    let slot: SlotLabel = time
        .parse()
        .map_err(|e: turf_shared::SlotParseError| BookingError::InvalidTimeFormat(e.to_string()))?;

    let mut tx = store.begin().await?;
    match mark_maintenance(&mut tx, date, slot).await {
        Ok(()) => tx.commit().await?,
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            return Err(e);
        }
    }

    info!(%date, slot = %slot, "maintenance slot added");
    Ok(slot)
}

async fn mark_maintenance<T>(tx: &mut T, date: NaiveDate, slot: SlotLabel) -> BookingResult<()>
where
    T: SlotTransaction,
{
    match tx.lock_slot(date, slot, LockMode::Blocking).await? {
        LockOutcome::Acquired(SlotStatus::Available) => {}
        LockOutcome::Acquired(SlotStatus::Maintenance) => return Err(BookingError::SlotUnderMaintenance(slot)),
        LockOutcome::Acquired(SlotStatus::Unavailable) | LockOutcome::Contended => {
            return Err(BookingError::SlotConflict(slot))
        }
    }
    tx.upsert_status(date, slot, SlotStatus::Maintenance).await?;
    Ok(())
}
