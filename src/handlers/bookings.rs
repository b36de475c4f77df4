use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::{Booking, Page};
use crate::services::booking;
use crate::state::AppState;
use crate::validation::{
    CreateBookingRequest, ListBookingsQuery, TransitionRequest, UpdateBookingRequest,
};

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Page<Booking>>, AppError> {
    Ok(Json(booking::list_bookings(&state, &caller, query).await?))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let created = booking::create_booking(&state, &caller, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(booking::get_booking(&state, &caller, id).await?))
}

// PUT /api/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(booking::update_booking(&state, &caller, id, req).await?))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    booking::delete_booking(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(booking::confirm_booking(&state, &caller, id).await?))
}

// POST /api/bookings/:id/complete
pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(booking::complete_booking(&state, &caller, id).await?))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Option<Json<TransitionRequest>>,
) -> Result<Json<Booking>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    Ok(Json(booking::cancel_booking(&state, &caller, id, req).await?))
}

// POST /api/bookings/:id/reject
pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Option<Json<TransitionRequest>>,
) -> Result<Json<Booking>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    Ok(Json(booking::reject_booking(&state, &caller, id, req).await?))
}

// POST /api/bookings/:id/check-out
pub async fn check_out_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(booking::check_out_booking(&state, &caller, id).await?))
}
