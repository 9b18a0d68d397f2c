//! The booking transaction.
//!
//! Parse and expand run before anything touches the store, so malformed
//! requests have no side effects. Everything after `begin` either commits as
//! a whole or is rolled back.

use tracing::{info, instrument, warn};
use turf_shared::{BookSlotRequest, BookingCreated, NewBooking, SlotLabel, SlotStatus};

use crate::availability::lock_all_free;
use crate::schedule::{expand, parse_date};
use crate::store::{SlotStore, SlotTransaction};
use crate::{BookingError, BookingResult};

#[instrument(skip_all, fields(user_id = request.user_id, date = %request.date))]
pub async fn book_slots<S>(store: &S, request: &BookSlotRequest) -> BookingResult<BookingCreated>
where
    S: SlotStore + ?Sized,
{
    let date = parse_date(&request.date).inspect_err(|e| warn!(stage = "aborted", error = %e, "booking rejected"))?;
    info!(stage = "parsed", %date, from = %request.from_label, to = %request.to_label);

    let slots = expand(&request.from_label, &request.to_label)
        .inspect_err(|e| warn!(stage = "aborted", error = %e, "booking rejected"))?;
    info!(stage = "expanded", slots = %join(&slots), "generated time slots to verify");

    let booking = NewBooking {
        user_id: request.user_id,
        date,
        from_label: request.from_label.clone(),
        to_label: request.to_label.clone(),
        amount: request.amount,
    };

    let mut tx = store
        .begin()
        .await
        .inspect_err(|e| warn!(stage = "aborted", error = %e, "could not start transaction"))?;
    match write_booking(&mut tx, &booking, &slots).await {
        Ok(booking_id) => {
            if let Err(e) = tx.commit().await {
                warn!(stage = "aborted", error = %e, "commit failed");
                return Err(e.into());
            }
            info!(stage = "committed", booking_id, slots = %join(&slots), "booking successful");
            Ok(BookingCreated { booking_id })
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            match &e {
                BookingError::Store(store_err) => {
                    warn!(stage = "aborted", error = %store_err, "booking failed")
                }
                other => info!(stage = "aborted", reason = ?other.reason_kind(), "booking rejected"),
            }
            Err(e)
        }
    }
}

/// Steps run under the transaction: verify and lock, insert the booking,
/// claim the slots, stamp the user.
async fn write_booking<T>(tx: &mut T, booking: &NewBooking, slots: &[SlotLabel]) -> BookingResult<i32>
where
    T: SlotTransaction,
{
    lock_all_free(tx, booking.date, slots).await?;
    info!(stage = "locked", count = slots.len(), "all slots are available for booking");

    let booking_id = tx.insert_booking(booking).await?;

    for slot in slots {
        tx.upsert_status(booking.date, *slot, SlotStatus::Unavailable).await?;
    }

    tx.set_last_booking_date(booking.user_id, booking.date).await?;
    Ok(booking_id)
}

pub(crate) fn join(slots: &[SlotLabel]) -> String {
    slots.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
}
