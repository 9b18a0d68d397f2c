//! In-process implementation of the slot store.
//!
//! Each `(date, slot)` has its own async mutex standing in for the database
//! lock, and writes are staged on the transaction until commit. It shares one
//! process's memory, so it is meant for tests and local runs, never for
//! several service instances. Lock entries are created on first use and never
//! evicted, so memory grows with the number of distinct slots touched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use turf_shared::{Booking, NewBooking, SlotLabel, SlotStatus};

use crate::store::{LockMode, LockOutcome, SlotStore, SlotTransaction};
use crate::StoreError;

type SlotKey = (NaiveDate, SlotLabel);

const NO_FAILURE: usize = usize::MAX;

#[derive(Default)]
struct Tables {
    slots: HashMap<SlotKey, SlotStatus>,
    bookings: Vec<Booking>,
    last_booking: HashMap<i32, NaiveDate>,
}

struct Inner {
    tables: Mutex<Tables>,
    locks: Mutex<HashMap<SlotKey, Arc<AsyncMutex<()>>>>,
    next_booking_id: AtomicI32,
    transactions: AtomicUsize,
    status_writes: AtomicUsize,
    fail_after: AtomicUsize,
    refuse_begin: AtomicBool,
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: Mutex::new(Tables::default()),
                locks: Mutex::new(HashMap::new()),
                next_booking_id: AtomicI32::new(1),
                transactions: AtomicUsize::new(0),
                status_writes: AtomicUsize::new(0),
                fail_after: AtomicUsize::new(NO_FAILURE),
                refuse_begin: AtomicBool::new(false),
            }),
        }
    }

    /// Committed status of a slot.
    pub fn slot_status(&self, date: NaiveDate, slot: SlotLabel) -> SlotStatus {
        self.inner
            .tables()
            .slots
            .get(&(date, slot))
            .copied()
            .unwrap_or(SlotStatus::Available)
    }

    /// Writes a status directly, outside any transaction.
    pub fn seed_status(&self, date: NaiveDate, slot: SlotLabel, status: SlotStatus) {
        self.inner.tables().slots.insert((date, slot), status);
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.inner.tables().bookings.clone()
    }

    pub fn last_booking_date(&self, user_id: i32) -> Option<NaiveDate> {
        self.inner.tables().last_booking.get(&user_id).copied()
    }

    pub fn transactions_started(&self) -> usize {
        self.inner.transactions.load(Ordering::SeqCst)
    }

    /// Lets the next `writes` status writes succeed and fails every one after.
    pub fn fail_status_write_after(&self, writes: usize) {
        self.inner.status_writes.store(0, Ordering::SeqCst);
        self.inner.fail_after.store(writes, Ordering::SeqCst);
    }

    /// Makes every `begin` fail until [`MemoryStore::clear_failures`].
    pub fn refuse_transactions(&self) {
        self.inner.refuse_begin.store(true, Ordering::SeqCst);
    }

    pub fn clear_failures(&self) {
        self.inner.fail_after.store(NO_FAILURE, Ordering::SeqCst);
        self.inner.refuse_begin.store(false, Ordering::SeqCst);
    }
}

impl Inner {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the guard leaves plain data behind; keep using it.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot_lock(&self, key: SlotKey) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(key).or_default().clone()
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        if self.inner.refuse_begin.load(Ordering::SeqCst) {
            return Err(StoreError::backend("store unavailable"));
        }
        self.inner.transactions.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryTransaction {
            inner: self.inner.clone(),
            held: HashMap::new(),
            staged_slots: Vec::new(),
            staged_bookings: Vec::new(),
            staged_users: Vec::new(),
        })
    }
}

pub struct MemoryTransaction {
    inner: Arc<Inner>,
    held: HashMap<SlotKey, OwnedMutexGuard<()>>,
    staged_slots: Vec<(SlotKey, SlotStatus)>,
    staged_bookings: Vec<Booking>,
    staged_users: Vec<(i32, NaiveDate)>,
}

#[async_trait]
impl SlotTransaction for MemoryTransaction {
    async fn lock_slot(
        &mut self,
        date: NaiveDate,
        slot: SlotLabel,
        mode: LockMode,
    ) -> Result<LockOutcome, StoreError> {
        let key = (date, slot);
        if !self.held.contains_key(&key) {
            let lock = self.inner.slot_lock(key);
            let guard = match mode {
                LockMode::Blocking => lock.lock_owned().await,
                LockMode::NonBlocking => match lock.try_lock_owned() {
                    Ok(guard) => guard,
                    Err(_) => return Ok(LockOutcome::Contended),
                },
            };
            self.held.insert(key, guard);
        }

        let staged = self.staged_slots.iter().rev().find(|(k, _)| *k == key).map(|(_, s)| *s);
        let status = staged.unwrap_or_else(|| {
            self.inner
                .tables()
                .slots
                .get(&key)
                .copied()
                .unwrap_or(SlotStatus::Available)
        });
        Ok(LockOutcome::Acquired(status))
    }

    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<i32, StoreError> {
        // Ids are consumed even when the transaction rolls back, like a sequence.
        let id = self.inner.next_booking_id.fetch_add(1, Ordering::SeqCst);
        self.staged_bookings.push(Booking::from_new(id, booking.clone()));
        Ok(id)
    }

    async fn upsert_status(
        &mut self,
        date: NaiveDate,
        slot: SlotLabel,
        status: SlotStatus,
    ) -> Result<(), StoreError> {
        let written = self.inner.status_writes.fetch_add(1, Ordering::SeqCst);
        if written >= self.inner.fail_after.load(Ordering::SeqCst) {
            return Err(StoreError::backend(format!("injected failure writing {slot} on {date}")));
        }
        self.staged_slots.push(((date, slot), status));
        Ok(())
    }

    async fn set_last_booking_date(&mut self, user_id: i32, date: NaiveDate) -> Result<(), StoreError> {
        self.staged_users.push((user_id, date));
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let MemoryTransaction {
            inner,
            held,
            staged_slots,
            staged_bookings,
            staged_users,
        } = self;

        {
            let mut tables = inner.tables();
            tables.slots.extend(staged_slots);
            tables.bookings.extend(staged_bookings);
            tables.last_booking.extend(staged_users);
        }
        drop(held);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> (NaiveDate, SlotLabel) {
        (NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(), "3 PM".parse().unwrap())
    }

    #[tokio::test]
    async fn test_non_blocking_lock_reports_contention() {
        let store = MemoryStore::new();
        let (date, slot) = key();

        let mut first = store.begin().await.unwrap();
        first.lock_slot(date, slot, LockMode::Blocking).await.unwrap();

        let mut second = store.begin().await.unwrap();
        assert_eq!(
            second.lock_slot(date, slot, LockMode::NonBlocking).await.unwrap(),
            LockOutcome::Contended
        );

        first.rollback().await.unwrap();
        assert_eq!(
            second.lock_slot(date, slot, LockMode::NonBlocking).await.unwrap(),
            LockOutcome::Acquired(SlotStatus::Available)
        );
    }

    #[tokio::test]
    async fn test_relocking_within_transaction() {
        let store = MemoryStore::new();
        let (date, slot) = key();

        let mut tx = store.begin().await.unwrap();
        tx.lock_slot(date, slot, LockMode::Blocking).await.unwrap();
        tx.upsert_status(date, slot, SlotStatus::Maintenance).await.unwrap();
        assert_eq!(
            tx.lock_slot(date, slot, LockMode::Blocking).await.unwrap(),
            LockOutcome::Acquired(SlotStatus::Maintenance)
        );

        // Uncommitted writes stay private.
        assert_eq!(store.slot_status(date, slot), SlotStatus::Available);
        tx.commit().await.unwrap();
        assert_eq!(store.slot_status(date, slot), SlotStatus::Maintenance);
    }
}
