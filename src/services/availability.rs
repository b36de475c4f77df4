use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{OccupancyScope, SlotAvailability, SlotNumbers, SlotOccupancy};
use crate::state::AppState;

/// Occupancy of one slot. Missing or withdrawn unit types read as having no units.
pub fn load_occupancy(
    conn: &Connection,
    unit_type: &str,
    date: &NaiveDate,
    time: &str,
    scope: OccupancyScope,
    exclude_id: Option<&str>,
) -> Result<SlotOccupancy, AppError> {
    let Some(unit) = queries::get_unit_type(conn, unit_type)? else {
        return Ok(SlotOccupancy::unavailable());
    };
    if !unit.available {
        return Ok(SlotOccupancy::unavailable());
    }

    let numbers = queries::slot_unit_numbers(conn, unit_type, date, time, scope, exclude_id)?;
    Ok(SlotOccupancy::new(unit.quantity, numbers))
}

pub async fn check_availability(
    state: &Arc<AppState>,
    unit_type: String,
    date: NaiveDate,
    time: String,
    scope: OccupancyScope,
) -> Result<SlotAvailability, AppError> {
    let occupancy = state
        .with_db(move |conn| load_occupancy(conn, &unit_type, &date, &time, scope, None))
        .await?;
    Ok(occupancy.to_availability())
}

pub async fn list_available_numbers(
    state: &Arc<AppState>,
    unit_type: String,
    date: NaiveDate,
    time: String,
    scope: OccupancyScope,
) -> Result<SlotNumbers, AppError> {
    let occupancy = state
        .with_db(move |conn| load_occupancy(conn, &unit_type, &date, &time, scope, None))
        .await?;
    Ok(occupancy.to_numbers())
}
