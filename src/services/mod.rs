pub mod availability;
pub mod booking;
pub mod events;
pub mod notify;
pub mod sweep;
pub mod unit_types;
