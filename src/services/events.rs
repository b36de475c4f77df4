use std::sync::Arc;

use crate::db::queries;
use crate::models::{Booking, BookingEvent, BookingEventKind};
use crate::state::AppState;

/// Fans a booking change out to live subscribers. Delivery is best-effort.
pub fn publish(
    state: &Arc<AppState>,
    kind: BookingEventKind,
    booking_id: &str,
    booking: Option<&Booking>,
    message: impl Into<String>,
) {
    let event = BookingEvent {
        kind,
        booking_id: booking_id.to_string(),
        booking: booking.cloned(),
        message: message.into(),
        timestamp: queries::utc_now(),
    };

    // Broadcast to SSE subscribers; ignore if no receivers
    match state.events_tx.send(event) {
        Ok(receivers) => {
            tracing::debug!(booking_id = %booking_id, kind = kind.as_str(), receivers, "booking event published")
        }
        Err(_) => tracing::trace!(booking_id = %booking_id, "no event subscribers"),
    }
}
