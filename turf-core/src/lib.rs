pub mod availability;
pub mod booking;
pub mod maintenance;
pub mod memory;
pub mod probe;
pub mod schedule;
pub mod store;

use turf_shared::{ReasonKind, SlotLabel};

pub use booking::book_slots;
pub use maintenance::assign_maintenance;
pub use memory::MemoryStore;
pub use probe::{probe_range, probe_slots};
pub use store::{LockMode, LockOutcome, SlotStore, SlotTransaction};

/// Failure inside the storage collaborator. Carries only a short diagnostic
/// upward; the source error stays attached for logging.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("unreadable row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError::Backend(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid date format: {0}")]
    InvalidDate(String),
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("Slot {0} is already booked by another user")]
    SlotConflict(SlotLabel),
    #[error("Slot {0} is currently under maintenance")]
    SlotUnderMaintenance(SlotLabel),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn reason_kind(&self) -> ReasonKind {
        match self {
            BookingError::InvalidDate(_) => ReasonKind::InvalidDate,
            BookingError::InvalidTimeFormat(_) => ReasonKind::InvalidTimeFormat,
            BookingError::SlotConflict(_) => ReasonKind::SlotConflict,
            BookingError::SlotUnderMaintenance(_) => ReasonKind::SlotUnderMaintenance,
            BookingError::Store(_) => ReasonKind::Internal,
        }
    }

    /// The slot that stopped the transaction, for conflict outcomes.
    pub fn conflict_slot(&self) -> Option<SlotLabel> {
        match self {
            BookingError::SlotConflict(slot) | BookingError::SlotUnderMaintenance(slot) => Some(*slot),
            _ => None,
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
