pub mod booking;
pub mod requests;
pub mod slot;
