pub mod models;

pub use models::booking::{Amount, AmountError, Booking, NewBooking};
pub use models::requests::{
    BookSlotRequest, BookingCreated, MaintenanceSlotRequest, ProbeReport, ReasonKind, VerifySlotsRequest,
};
pub use models::slot::{Slot, SlotLabel, SlotParseError, SlotStatus};
