pub mod availability;
pub mod bookings;
pub mod events;
pub mod health;
pub mod unit_types;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/unit-types", get(unit_types::list_unit_types))
        .route("/api/unit-types/:name", put(unit_types::upsert_unit_type))
        .route(
            "/api/bookings/availability",
            get(availability::check_availability),
        )
        .route(
            "/api/bookings/available-numbers",
            get(availability::available_numbers),
        )
        .route("/api/bookings/events", get(events::events_stream))
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route(
            "/api/bookings/:id/confirm",
            post(bookings::confirm_booking),
        )
        .route(
            "/api/bookings/:id/complete",
            post(bookings::complete_booking),
        )
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/api/bookings/:id/reject", post(bookings::reject_booking))
        .route(
            "/api/bookings/:id/check-out",
            post(bookings::check_out_booking),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
