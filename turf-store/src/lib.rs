pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod slot_repo;
pub mod slot_store;

pub use booking_repo::BookingRepository;
pub use database::DbClient;
pub use slot_repo::SlotRepository;
pub use slot_store::{PgSlotStore, PgSlotTransaction};
