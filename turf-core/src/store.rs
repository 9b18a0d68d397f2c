use async_trait::async_trait;
use chrono::NaiveDate;
use turf_shared::{NewBooking, SlotLabel, SlotStatus};

use crate::StoreError;

/// How a slot lock is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Wait until the holding transaction commits or rolls back.
    Blocking,
    /// Give up at once if another transaction holds the slot.
    NonBlocking,
}

/// Result of asking for a slot lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The lock is held until the transaction ends; the status was read under it.
    Acquired(SlotStatus),
    /// Another in-flight transaction holds the slot. Only returned in
    /// `LockMode::NonBlocking`.
    Contended,
}

/// A store able to open transactions over slots, bookings and users.
#[async_trait]
pub trait SlotStore: Send + Sync {
    type Tx: SlotTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// One unit of work. Locks taken through it are exclusive and released only
/// when the transaction commits or rolls back. Writes become visible to
/// other transactions at commit, all together.
#[async_trait]
pub trait SlotTransaction: Send {
    /// Locks `(date, slot)` and reads its status. A slot with no row reads as
    /// `Available`. Taking a lock the transaction already holds succeeds.
    async fn lock_slot(
        &mut self,
        date: NaiveDate,
        slot: SlotLabel,
        mode: LockMode,
    ) -> Result<LockOutcome, StoreError>;

    /// Inserts the booking record and returns its generated id.
    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<i32, StoreError>;

    /// Creates or overwrites the slot row with `status`.
    async fn upsert_status(
        &mut self,
        date: NaiveDate,
        slot: SlotLabel,
        status: SlotStatus,
    ) -> Result<(), StoreError>;

    async fn set_last_booking_date(&mut self, user_id: i32, date: NaiveDate) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
