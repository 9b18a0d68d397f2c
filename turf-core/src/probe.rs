//! Read-only availability checks for the booking screen.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use turf_shared::{ProbeReport, SlotLabel};

use crate::availability::collect_unavailable;
use crate::booking::join;
use crate::schedule::{expand, parse_date, parse_labels};
use crate::store::{SlotStore, SlotTransaction};
use crate::BookingResult;

/// Reports which of `times` could not be booked right now. Never waits on a
/// lock and never writes.
#[instrument(skip_all, fields(date = %date))]
pub async fn probe_slots<S, T>(store: &S, date: &str, times: &[T]) -> BookingResult<ProbeReport>
where
    S: SlotStore + ?Sized,
    T: AsRef<str>,
{
    let date = parse_date(date)?;
    let slots = parse_labels(times)?;
    run_probe(store, date, &slots).await
}

/// Same as [`probe_slots`] over the slots a booking of `from`..`to` would take.
#[instrument(skip_all, fields(date = %date, from = %from, to = %to))]
pub async fn probe_range<S>(store: &S, date: &str, from: &str, to: &str) -> BookingResult<ProbeReport>
where
    S: SlotStore + ?Sized,
{
    let date = parse_date(date)?;
    let slots = expand(from, to)?;
    run_probe(store, date, &slots).await
}

async fn run_probe<S>(store: &S, date: NaiveDate, slots: &[SlotLabel]) -> BookingResult<ProbeReport>
where
    S: SlotStore + ?Sized,
{
    let mut tx = store.begin().await?;
    let outcome = collect_unavailable(&mut tx, date, slots).await;

    // The probe only ever reads; its transaction is always discarded.
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "probe rollback failed");
    }

    let unavailable = outcome?;
    if unavailable.is_empty() {
        info!(slots = %join(slots), "all slots are available");
    } else {
        info!(unavailable = %join(&unavailable), "some slots are not available");
    }
    Ok(ProbeReport::from_unavailable(unavailable))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use turf_shared::{Amount, BookSlotRequest, SlotStatus};

    use super::*;
    use crate::book_slots;
    use crate::BookingError;
    use crate::memory::MemoryStore;
    use crate::store::LockMode;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn label(s: &str) -> SlotLabel {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_probe_after_booking_reports_range() {
        let store = MemoryStore::new();
        let request = BookSlotRequest {
            user_id: 3,
            date: "2025-07-01".to_string(),
            from_label: "10 PM".to_string(),
            to_label: "12 AM".to_string(),
            amount: Amount::from_cents(90000),
        };
        book_slots(&store, &request).await.unwrap();

        let report = probe_range(&store, "2025-07-01", "10 PM", "12 AM").await.unwrap();
        assert_eq!(report.unavailable, vec![label("10 PM"), label("11 PM")]);
        assert!(!report.available);

        let report = probe_range(&store, "2025-07-01", "8 PM", "10 PM").await.unwrap();
        assert!(report.available);
    }

    #[tokio::test]
    async fn test_probe_collects_every_unavailable_slot() {
        let store = MemoryStore::new();
        store.seed_status(date(), label("1 PM"), SlotStatus::Unavailable);
        store.seed_status(date(), label("3 PM"), SlotStatus::Maintenance);

        let report = probe_slots(&store, "2025-07-01", &["3 PM", "1 PM", "2 PM"]).await.unwrap();
        assert_eq!(report.unavailable, vec![label("1 PM"), label("3 PM")]);
    }

    #[tokio::test]
    async fn test_probe_does_not_wait_on_held_slot() {
        let store = MemoryStore::new();
        let mut holder = store.begin().await.unwrap();
        holder.lock_slot(date(), label("3 PM"), LockMode::Blocking).await.unwrap();

        let report = tokio::time::timeout(
            Duration::from_secs(1),
            probe_slots(&store, "2025-07-01", &["3 PM", "4 PM"]),
        )
        .await
        .expect("probe must not block")
        .unwrap();
        assert_eq!(report.unavailable, vec![label("3 PM")]);

        holder.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_releases_its_locks() {
        let store = MemoryStore::new();
        probe_slots(&store, "2025-07-01", &["5 PM"]).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(matches!(
            tx.lock_slot(date(), label("5 PM"), LockMode::NonBlocking).await.unwrap(),
            crate::LockOutcome::Acquired(SlotStatus::Available)
        ));
    }

    #[tokio::test]
    async fn test_probe_input_errors() {
        let store = MemoryStore::new();
        assert!(matches!(
            probe_slots(&store, "yesterday", &["3 PM"]).await,
            Err(BookingError::InvalidDate(_))
        ));
        assert!(matches!(
            probe_slots(&store, "2025-07-01", &["15:00"]).await,
            Err(BookingError::InvalidTimeFormat(_))
        ));
        assert_eq!(store.transactions_started(), 0);
    }

    #[tokio::test]
    async fn test_range_with_bad_label_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            probe_range(&store, "2025-07-01", "2 PM", "5:00 PM").await,
            Err(BookingError::InvalidTimeFormat(_))
        ));
        assert_eq!(store.transactions_started(), 0);
    }
}
