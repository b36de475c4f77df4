use std::sync::Arc;

use chrono::Local;

use crate::auth::{Caller, Role};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    Action, Booking, BookingEventKind, BookingStatus, OccupancyScope, Page, PaymentStatus,
};
use crate::services::{availability, events};
use crate::state::AppState;
use crate::validation::{
    self, BookingPatch, CreateBookingRequest, ListBookingsQuery, NewBooking, TransitionRequest,
    UpdateBookingRequest, ValidationContext,
};

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("booking {id}"))
}

/// Known unit types are read from the inventory.
async fn validation_context(state: &Arc<AppState>) -> Result<ValidationContext, AppError> {
    let unit_types = state
        .with_db(|conn| {
            Ok(queries::list_unit_types(conn)?
                .into_iter()
                .map(|unit| unit.name)
                .collect::<Vec<String>>())
        })
        .await?;

    Ok(ValidationContext {
        today: Local::now().date_naive(),
        unit_types,
    })
}

fn ensure_access(caller: &Caller, booking: &Booking) -> Result<(), AppError> {
    if caller.can_access(booking) {
        Ok(())
    } else {
        Err(AppError::Forbidden("booking belongs to another account".to_string()))
    }
}

/// Customers book for themselves; staff may book on behalf of an account or for walk-ins.
fn resolve_owner(caller: &Caller, new: &NewBooking) -> Option<String> {
    match caller.role {
        Role::Customer => caller.account_id.clone(),
        _ if new.is_walk_in => None,
        _ => new.user_id.clone(),
    }
}

pub async fn create_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    req: CreateBookingRequest,
) -> Result<Booking, AppError> {
    caller.require_authenticated()?;
    let new = validation::validate_create(req, &validation_context(state).await?)?;
    if new.is_walk_in {
        caller.require_staff()?;
    }
    let user_id = resolve_owner(caller, &new);

    let booking = state
        .with_db(move |conn| {
            let unit = queries::get_unit_type(conn, &new.unit_type)?
                .ok_or_else(|| AppError::NotFound(format!("unit type {}", new.unit_type)))?;

            let occupancy = availability::load_occupancy(
                conn,
                &new.unit_type,
                &new.booking_date,
                &new.booking_time,
                OccupancyScope::Occupying,
                None,
            )?;
            let unit_number = occupancy.assign(new.unit_number)?;

            let now = queries::utc_now();
            let (status, completed_at) = if new.is_walk_in {
                (BookingStatus::Completed, Some(now))
            } else {
                (BookingStatus::Pending, None)
            };

            let booking = Booking {
                id: uuid::Uuid::new_v4().to_string(),
                user_id,
                unit_type: new.unit_type,
                unit_number: Some(unit_number),
                full_name: new.full_name,
                booking_date: new.booking_date,
                booking_time: new.booking_time,
                duration_minutes: new.duration_minutes,
                number_of_people: new.number_of_people,
                booking_kind: new.booking_kind,
                is_walk_in: new.is_walk_in,
                special_requests: new.special_requests,
                notes: new.notes,
                contact_phone: new.contact_phone,
                contact_email: new.contact_email,
                total_price: unit.price,
                payment_status: PaymentStatus::default(),
                payment_method: new.payment_method,
                proof_of_payment: new.proof_of_payment,
                payment_reference: new.payment_reference,
                status,
                cancellation_reason: None,
                confirmed_at: None,
                completed_at,
                cancelled_at: None,
                checked_out_at: None,
                created_at: now,
                updated_at: now,
            };
            queries::insert_booking(conn, &booking)?;
            Ok(booking)
        })
        .await?;

    tracing::info!(
        booking_id = %booking.id,
        unit_type = %booking.unit_type,
        unit_number = ?booking.unit_number,
        date = %booking.booking_date,
        time = %booking.booking_time,
        walk_in = booking.is_walk_in,
        "booking created"
    );
    events::publish(
        state,
        BookingEventKind::Created,
        &booking.id,
        Some(&booking),
        "New booking created",
    );

    Ok(booking)
}

pub async fn get_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
) -> Result<Booking, AppError> {
    caller.require_authenticated()?;
    let booking = state
        .with_db(move |conn| queries::get_booking_by_id(conn, &id)?.ok_or_else(|| not_found(&id)))
        .await?;
    ensure_access(caller, &booking)?;
    Ok(booking)
}

pub async fn list_bookings(
    state: &Arc<AppState>,
    caller: &Caller,
    query: ListBookingsQuery,
) -> Result<Page<Booking>, AppError> {
    caller.require_authenticated()?;
    let (mut filter, page) = validation::validate_list(query)?;
    if caller.role == Role::Customer {
        filter.user_id = caller.account_id.clone();
    }

    let (items, total) = state
        .with_db(move |conn| queries::list_bookings(conn, &filter, &page))
        .await?;
    Ok(Page::new(items, total, &page))
}

fn apply_patch(booking: &mut Booking, patch: BookingPatch) {
    if let Some(unit_type) = patch.unit_type {
        booking.unit_type = unit_type;
    }
    if let Some(full_name) = patch.full_name {
        booking.full_name = full_name;
    }
    if let Some(date) = patch.booking_date {
        booking.booking_date = date;
    }
    if let Some(time) = patch.booking_time {
        booking.booking_time = time;
    }
    if let Some(duration) = patch.duration_minutes {
        booking.duration_minutes = duration;
    }
    if let Some(people) = patch.number_of_people {
        booking.number_of_people = people;
    }
    if let Some(kind) = patch.booking_kind {
        booking.booking_kind = kind;
    }
    if let Some(requests) = patch.special_requests {
        booking.special_requests = Some(requests);
    }
    if let Some(notes) = patch.notes {
        booking.notes = Some(notes);
    }
    if let Some(phone) = patch.contact_phone {
        booking.contact_phone = phone;
    }
    if let Some(email) = patch.contact_email {
        booking.contact_email = Some(email);
    }
    if let Some(status) = patch.payment_status {
        booking.payment_status = status;
    }
    if let Some(method) = patch.payment_method {
        booking.payment_method = Some(method);
    }
    if let Some(proof) = patch.proof_of_payment {
        booking.proof_of_payment = Some(proof);
    }
    if let Some(reference) = patch.payment_reference {
        booking.payment_reference = Some(reference);
    }
}

/// Edits booking fields. Moving to another slot or unit re-checks availability
/// with this booking excluded; the price snapshot never changes.
pub async fn update_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
    req: UpdateBookingRequest,
) -> Result<Booking, AppError> {
    caller.require_staff()?;
    let patch = validation::validate_update(req, &validation_context(state).await?)?;

    let booking = state
        .with_db(move |conn| {
            let mut booking = queries::get_booking_by_id(conn, &id)?.ok_or_else(|| not_found(&id))?;
            booking.ensure_allows(Action::Update)?;

            let touches_slot = patch.touches_slot();
            let requested_number = patch.unit_number;
            let current_number = booking.unit_number;
            apply_patch(&mut booking, patch);

            if touches_slot {
                let occupancy = availability::load_occupancy(
                    conn,
                    &booking.unit_type,
                    &booking.booking_date,
                    &booking.booking_time,
                    OccupancyScope::Occupying,
                    Some(&booking.id),
                )?;
                let keep_current = requested_number.is_none()
                    && current_number.is_some_and(|n| occupancy.free_numbers().contains(&n));
                let number = if keep_current {
                    occupancy.assign(current_number)?
                } else {
                    occupancy.assign(requested_number)?
                };
                booking.unit_number = Some(number);
            }

            booking.updated_at = queries::utc_now();
            if !queries::update_booking(conn, &booking)? {
                return Err(not_found(&booking.id));
            }
            Ok(booking)
        })
        .await?;

    tracing::info!(booking_id = %booking.id, "booking updated");
    events::publish(
        state,
        BookingEventKind::Updated,
        &booking.id,
        Some(&booking),
        "Booking updated",
    );
    Ok(booking)
}

/// Load, check access and lifecycle, mutate, persist, emit.
async fn transition(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
    action: Action,
    reason: Option<String>,
) -> Result<Booking, AppError> {
    let owner_check = caller.clone();
    let booking = state
        .with_db(move |conn| {
            let mut booking = queries::get_booking_by_id(conn, &id)?.ok_or_else(|| not_found(&id))?;
            ensure_access(&owner_check, &booking)?;
            booking.transition(action, reason, queries::utc_now())?;
            if !queries::update_booking(conn, &booking)? {
                return Err(not_found(&id));
            }
            Ok(booking)
        })
        .await?;

    tracing::info!(
        booking_id = %booking.id,
        action = action.as_str(),
        status = %booking.status,
        "booking status changed"
    );
    events::publish(
        state,
        BookingEventKind::Updated,
        &booking.id,
        Some(&booking),
        format!("Booking {}", booking.status),
    );
    Ok(booking)
}

/// Confirms a pending booking, then sends the guest notice. A failed notice is
/// logged; the confirmation stands.
pub async fn confirm_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
) -> Result<Booking, AppError> {
    caller.require_staff()?;
    let booking = transition(state, caller, id, Action::Confirm, None).await?;

    match tokio::time::timeout(
        state.config.notify_timeout,
        state.notifier.booking_confirmed(&booking),
    )
    .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(booking_id = %booking.id, error = %e, "confirmation notice failed")
        }
        Err(_) => {
            tracing::warn!(booking_id = %booking.id, "confirmation notice timed out")
        }
    }

    Ok(booking)
}

pub async fn complete_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
) -> Result<Booking, AppError> {
    caller.require_staff()?;
    transition(state, caller, id, Action::Complete, None).await
}

pub async fn cancel_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
    req: TransitionRequest,
) -> Result<Booking, AppError> {
    caller.require_authenticated()?;
    let reason = validation::validate_reason(req)?;
    transition(state, caller, id, Action::Cancel, reason).await
}

pub async fn reject_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
    req: TransitionRequest,
) -> Result<Booking, AppError> {
    caller.require_staff()?;
    let reason = validation::validate_reason(req)?;
    transition(state, caller, id, Action::Reject, reason).await
}

pub async fn check_out_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
) -> Result<Booking, AppError> {
    caller.require_staff()?;
    transition(state, caller, id, Action::CheckOut, None).await
}

pub async fn delete_booking(
    state: &Arc<AppState>,
    caller: &Caller,
    id: String,
) -> Result<(), AppError> {
    caller.require_admin()?;
    let booking_id = id.clone();
    state
        .with_db(move |conn| {
            let booking = queries::get_booking_by_id(conn, &id)?.ok_or_else(|| not_found(&id))?;
            booking.ensure_allows(Action::Delete)?;
            if !queries::delete_booking(conn, &id)? {
                return Err(not_found(&id));
            }
            Ok(())
        })
        .await?;

    tracing::info!(booking_id = %booking_id, "booking deleted");
    events::publish(
        state,
        BookingEventKind::Deleted,
        &booking_id,
        None,
        "Booking deleted",
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::queries::tests::seed_unit_type;
    use crate::state::tests::test_state;

    fn future_date(days: i64) -> String {
        (Local::now().date_naive() + Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    fn request(number: Option<u32>) -> CreateBookingRequest {
        CreateBookingRequest {
            unit_type: Some("kubo".to_string()),
            unit_number: number,
            full_name: Some("Ana Cruz".to_string()),
            booking_date: Some(future_date(30)),
            booking_time: Some("08:00".to_string()),
            duration_minutes: Some(600),
            number_of_people: Some(4),
            contact_phone: Some("09171234567".to_string()),
            contact_email: Some("ana@example.com".to_string()),
            ..Default::default()
        }
    }

    async fn kubo_state(quantity: u32) -> Arc<AppState> {
        let state = test_state();
        state
            .with_db(move |conn| {
                seed_unit_type(conn, "kubo", 800.0, quantity);
                Ok(())
            })
            .await
            .unwrap();
        state
    }

    #[tokio::test]
    async fn test_customer_booking_is_pending_and_owned() {
        let state = kubo_state(3).await;
        let mut req = request(None);
        req.user_id = Some("someone-else".to_string());

        let booking = create_booking(&state, &Caller::customer("acct-1"), req).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.user_id.as_deref(), Some("acct-1"));
        assert_eq!(booking.unit_number, Some(1));
        assert_eq!(booking.total_price, 800.0);
    }

    #[tokio::test]
    async fn test_unit_type_added_by_admin_is_bookable() {
        let state = test_state();
        crate::services::unit_types::upsert_unit_type(
            &state,
            &Caller::admin(),
            "treehouse".to_string(),
            crate::validation::UpsertUnitTypeRequest {
                price: Some(1500.0),
                quantity: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let mut req = request(None);
        req.unit_type = Some("treehouse".to_string());
        let booking = create_booking(&state, &Caller::clerk(), req).await.unwrap();
        assert_eq!(booking.unit_type, "treehouse");
        assert_eq!(booking.unit_number, Some(1));
        assert_eq!(booking.total_price, 1500.0);
    }

    #[tokio::test]
    async fn test_unknown_unit_type_is_rejected() {
        let state = kubo_state(3).await;
        let mut req = request(None);
        req.unit_type = Some("igloo".to_string());
        let err = create_booking(&state, &Caller::clerk(), req).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("unit_type"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_padded_single_letter_name_is_rejected() {
        let state = kubo_state(3).await;
        let mut req = request(None);
        req.full_name = Some("  A  ".to_string());
        let err = create_booking(&state, &Caller::clerk(), req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_anonymous_cannot_book() {
        let state = kubo_state(3).await;
        let err = create_booking(&state, &Caller::anonymous(), request(None)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_walk_in_is_staff_only_and_starts_completed() {
        let state = kubo_state(3).await;
        let mut req = request(None);
        req.is_walk_in = true;
        let err = create_booking(&state, &Caller::customer("acct-1"), req).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut req = request(None);
        req.is_walk_in = true;
        let booking = create_booking(&state, &Caller::clerk(), req).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
        assert!(booking.completed_at.is_some());
        assert_eq!(booking.user_id, None);
    }

    #[tokio::test]
    async fn test_full_slot_conflicts() {
        let state = kubo_state(3).await;
        for n in 1..=3 {
            create_booking(&state, &Caller::clerk(), request(Some(n))).await.unwrap();
        }
        let err = create_booking(&state, &Caller::clerk(), request(None)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reject_then_confirm_is_invalid() {
        let state = kubo_state(3).await;
        let booking = create_booking(&state, &Caller::clerk(), request(None)).await.unwrap();

        let rejected = reject_booking(
            &state,
            &Caller::clerk(),
            booking.id.clone(),
            TransitionRequest {
                reason: Some("fully booked".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(rejected.status, BookingStatus::Rejected);
        assert_eq!(rejected.cancellation_reason.as_deref(), Some("fully booked"));
        assert!(rejected.cancelled_at.is_some());

        let err = confirm_booking(&state, &Caller::clerk(), booking.id.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: BookingStatus::Rejected,
                action: Action::Confirm
            }
        ));
    }

    #[tokio::test]
    async fn test_completed_booking_cannot_be_deleted() {
        let state = kubo_state(3).await;
        let booking = create_booking(&state, &Caller::clerk(), request(None)).await.unwrap();
        confirm_booking(&state, &Caller::clerk(), booking.id.clone()).await.unwrap();
        complete_booking(&state, &Caller::clerk(), booking.id.clone()).await.unwrap();

        let err = delete_booking(&state, &Caller::admin(), booking.id.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        check_out_booking(&state, &Caller::clerk(), booking.id.clone()).await.unwrap();
        delete_booking(&state, &Caller::admin(), booking.id.clone()).await.unwrap();
        assert!(matches!(
            get_booking(&state, &Caller::admin(), booking.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_customer_cancels_only_own_booking() {
        let state = kubo_state(3).await;
        let booking = create_booking(&state, &Caller::customer("acct-1"), request(None))
            .await
            .unwrap();

        let err = cancel_booking(
            &state,
            &Caller::customer("acct-2"),
            booking.id.clone(),
            TransitionRequest::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let cancelled = cancel_booking(
            &state,
            &Caller::customer("acct-1"),
            booking.id.clone(),
            TransitionRequest {
                reason: Some("change of plans".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let err = cancel_booking(
            &state,
            &Caller::customer("acct-1"),
            booking.id,
            TransitionRequest::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_cancel_frees_unit_for_next_booking() {
        let state = kubo_state(1).await;
        let first = create_booking(&state, &Caller::clerk(), request(None)).await.unwrap();
        cancel_booking(&state, &Caller::clerk(), first.id, TransitionRequest::default())
            .await
            .unwrap();

        let second = create_booking(&state, &Caller::clerk(), request(None)).await.unwrap();
        assert_eq!(second.unit_number, Some(1));
    }

    #[tokio::test]
    async fn test_update_keeps_current_number_when_still_free() {
        let state = kubo_state(3).await;
        let booking = create_booking(&state, &Caller::clerk(), request(Some(2))).await.unwrap();

        let moved = update_booking(
            &state,
            &Caller::clerk(),
            booking.id.clone(),
            UpdateBookingRequest {
                booking_time: Some("14:00".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.booking_time, "14:00");
        assert_eq!(moved.unit_number, Some(2));
        assert_eq!(moved.total_price, 800.0);
    }

    #[tokio::test]
    async fn test_update_into_taken_unit_conflicts() {
        let state = kubo_state(3).await;
        create_booking(&state, &Caller::clerk(), request(Some(1))).await.unwrap();
        let second = create_booking(&state, &Caller::clerk(), request(Some(2))).await.unwrap();

        let err = update_booking(
            &state,
            &Caller::clerk(),
            second.id,
            UpdateBookingRequest {
                unit_number: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_of_terminal_booking_is_invalid() {
        let state = kubo_state(3).await;
        let booking = create_booking(&state, &Caller::clerk(), request(None)).await.unwrap();
        cancel_booking(&state, &Caller::clerk(), booking.id.clone(), TransitionRequest::default())
            .await
            .unwrap();

        let err = update_booking(
            &state,
            &Caller::clerk(),
            booking.id,
            UpdateBookingRequest {
                notes: Some("too late".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                action: Action::Update,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_customer_list_is_scoped_to_own_account() {
        let state = kubo_state(5).await;
        create_booking(&state, &Caller::customer("acct-1"), request(None)).await.unwrap();
        let mut other = request(None);
        other.user_id = Some("acct-2".to_string());
        create_booking(&state, &Caller::clerk(), other).await.unwrap();

        let page = list_bookings(&state, &Caller::customer("acct-1"), ListBookingsQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].user_id.as_deref(), Some("acct-1"));

        let page = list_bookings(&state, &Caller::admin(), ListBookingsQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 2);
    }

    #[tokio::test]
    async fn test_lifecycle_emits_events() {
        let state = kubo_state(3).await;
        let mut rx = state.events_tx.subscribe();

        let booking = create_booking(&state, &Caller::clerk(), request(None)).await.unwrap();
        confirm_booking(&state, &Caller::clerk(), booking.id.clone()).await.unwrap();
        cancel_booking(&state, &Caller::clerk(), booking.id.clone(), TransitionRequest::default())
            .await
            .unwrap();
        delete_booking(&state, &Caller::admin(), booking.id.clone()).await.unwrap();

        let kinds: Vec<BookingEventKind> = (0..4).map(|_| rx.try_recv().unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                BookingEventKind::Created,
                BookingEventKind::Updated,
                BookingEventKind::Updated,
                BookingEventKind::Deleted,
            ]
        );
    }
}
