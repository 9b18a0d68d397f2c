//! Slot-by-slot lock acquisition and status checks.
//!
//! Slots are always visited in the order given, which callers keep in
//! ascending time order. Two transactions locking overlapping sets in the
//! same relative order cannot wait on each other in a cycle.

use chrono::NaiveDate;
use tracing::{debug, info};
use turf_shared::{SlotLabel, SlotStatus};

use crate::store::{LockMode, LockOutcome, SlotTransaction};
use crate::{BookingError, StoreError};

/// Locks every slot in `Blocking` mode, stopping at the first one that is
/// not free. On `Ok` the transaction holds locks on all of `slots`.
pub async fn lock_all_free<T>(tx: &mut T, date: NaiveDate, slots: &[SlotLabel]) -> Result<(), BookingError>
where
    T: SlotTransaction + ?Sized,
{
    for slot in slots {
        match tx.lock_slot(date, *slot, LockMode::Blocking).await? {
            LockOutcome::Acquired(SlotStatus::Available) => {
                debug!(stage = "locked", %date, slot = %slot, "slot locked");
            }
            LockOutcome::Acquired(SlotStatus::Maintenance) => {
                info!(stage = "conflict", %date, slot = %slot, status = "Maintenance", "slot under maintenance");
                return Err(BookingError::SlotUnderMaintenance(*slot));
            }
            // A blocking acquisition never reports contention; if a store
            // does, the slot is not ours to take.
            LockOutcome::Acquired(SlotStatus::Unavailable) | LockOutcome::Contended => {
                info!(stage = "conflict", %date, slot = %slot, status = "Unavailable", "slot already booked");
                return Err(BookingError::SlotConflict(*slot));
            }
        }
    }
    Ok(())
}

/// Checks every slot in `NonBlocking` mode and returns the ones that are not
/// free right now, in input order. A slot held by another transaction counts
/// as not free.
pub async fn collect_unavailable<T>(
    tx: &mut T,
    date: NaiveDate,
    slots: &[SlotLabel],
) -> Result<Vec<SlotLabel>, StoreError>
where
    T: SlotTransaction + ?Sized,
{
    let mut unavailable = Vec::new();
    for slot in slots {
        match tx.lock_slot(date, *slot, LockMode::NonBlocking).await? {
            LockOutcome::Acquired(status) if status.is_free() => {}
            LockOutcome::Acquired(status) => {
                debug!(%date, slot = %slot, %status, "slot not free");
                unavailable.push(*slot);
            }
            LockOutcome::Contended => {
                debug!(%date, slot = %slot, "slot held by another transaction");
                unavailable.push(*slot);
            }
        }
    }
    Ok(unavailable)
}
