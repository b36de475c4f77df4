use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::UnitType;
use crate::services::unit_types;
use crate::state::AppState;
use crate::validation::UpsertUnitTypeRequest;

// GET /api/unit-types
pub async fn list_unit_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UnitType>>, AppError> {
    Ok(Json(unit_types::list_unit_types(&state).await?))
}

// PUT /api/unit-types/:name
pub async fn upsert_unit_type(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(name): Path<String>,
    Json(req): Json<UpsertUnitTypeRequest>,
) -> Result<Json<UnitType>, AppError> {
    Ok(Json(
        unit_types::upsert_unit_type(&state, &caller, name, req).await?,
    ))
}
