use std::sync::Arc;

use crate::auth::Caller;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::UnitType;
use crate::state::AppState;
use crate::validation::{self, UpsertUnitTypeRequest};

pub async fn list_unit_types(state: &Arc<AppState>) -> Result<Vec<UnitType>, AppError> {
    state.with_db(queries::list_unit_types).await
}

/// Creates or reprices a unit type. Existing bookings keep the price they were made at.
pub async fn upsert_unit_type(
    state: &Arc<AppState>,
    caller: &Caller,
    name: String,
    req: UpsertUnitTypeRequest,
) -> Result<UnitType, AppError> {
    caller.require_admin()?;
    let update = validation::validate_unit_type(req)?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::NotFound("unit type".to_string()));
    }

    let unit_type = state
        .with_db(move |conn| {
            let now = queries::utc_now();
            let created_at = queries::get_unit_type(conn, &name)?
                .map(|existing| existing.created_at)
                .unwrap_or(now);
            let unit_type = UnitType {
                name,
                description: update.description,
                capacity: update.capacity,
                price: update.price,
                quantity: update.quantity,
                available: update.available,
                created_at,
                updated_at: now,
            };
            queries::upsert_unit_type(conn, &unit_type)?;
            Ok(unit_type)
        })
        .await?;

    tracing::info!(
        unit_type = %unit_type.name,
        price = unit_type.price,
        quantity = unit_type.quantity,
        available = unit_type.available,
        "unit type saved"
    );
    Ok(unit_type)
}
