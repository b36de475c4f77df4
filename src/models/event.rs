use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Booking;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingEventKind {
    Created,
    Updated,
    Deleted,
}

impl BookingEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingEventKind::Created => "created",
            BookingEventKind::Updated => "updated",
            BookingEventKind::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub booking_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
    pub message: String,
    pub timestamp: NaiveDateTime,
}
