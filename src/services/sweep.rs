use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Action, Booking, BookingEventKind};
use crate::services::events;
use crate::state::AppState;

/// Checks out today's checked-in day tours once the local clock reaches the
/// configured hour. Returns the bookings that were moved.
pub async fn run_auto_checkout(
    state: &Arc<AppState>,
    now_local: NaiveDateTime,
) -> Result<Vec<Booking>, AppError> {
    if now_local.hour() < state.config.day_tour_checkout_hour {
        return Ok(vec![]);
    }

    let today = now_local.date();
    let checked_out = state
        .with_db(move |conn| {
            let mut moved = vec![];
            for mut booking in queries::get_day_tours_checked_in(conn, &today)? {
                booking.transition(Action::CheckOut, None, queries::utc_now())?;
                if queries::update_booking(conn, &booking)? {
                    moved.push(booking);
                }
            }
            Ok(moved)
        })
        .await?;

    for booking in &checked_out {
        tracing::info!(booking_id = %booking.id, "day tour checked out automatically");
        events::publish(
            state,
            BookingEventKind::Updated,
            &booking.id,
            Some(booking),
            "Day tour checked out automatically",
        );
    }

    Ok(checked_out)
}

pub fn spawn_sweep(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.sweep_interval);
        loop {
            interval.tick().await;
            match run_auto_checkout(&state, Local::now().naive_local()).await {
                Ok(moved) if !moved.is_empty() => {
                    tracing::info!(count = moved.len(), "auto check-out sweep finished")
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "auto check-out sweep failed"),
            }
        }
    })
}
