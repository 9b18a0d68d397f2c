use turf_store::{BookingRepository, DbClient, PgSlotStore, SlotRepository};

#[derive(Clone)]
pub struct AppState {
    pub slot_store: PgSlotStore,
    pub bookings: BookingRepository,
    pub slots: SlotRepository,
}

impl AppState {
    pub fn new(db: DbClient) -> Self {
        let pool = db.pool;
        Self {
            slot_store: PgSlotStore::new(pool.clone()),
            bookings: BookingRepository::new(pool.clone()),
            slots: SlotRepository::new(pool),
        }
    }
}
