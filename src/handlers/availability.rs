use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::{SlotAvailability, SlotNumbers};
use crate::services::availability;
use crate::state::AppState;
use crate::validation::{self, SlotQuery};

// GET /api/bookings/availability?unitType=&bookingDate=&bookingTime=&scope=
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<SlotAvailability>, AppError> {
    let slot = validation::validate_slot(query)?;
    let result = availability::check_availability(
        &state,
        slot.unit_type,
        slot.booking_date,
        slot.booking_time,
        slot.scope,
    )
    .await?;
    Ok(Json(result))
}

// GET /api/bookings/available-numbers?unitType=&bookingDate=&bookingTime=&scope=
pub async fn available_numbers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<SlotNumbers>, AppError> {
    let slot = validation::validate_slot(query)?;
    let result = availability::list_available_numbers(
        &state,
        slot.unit_type,
        slot.booking_date,
        slot.booking_time,
        slot.scope,
    )
    .await?;
    Ok(Json(result))
}
