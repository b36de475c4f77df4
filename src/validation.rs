//! Request validation. Pure functions from raw request bodies to normalised
//! values, or field-tagged errors; nothing here touches the store.
//!
//! Bounds live on the `validator` derives. Rules that need context (today's
//! date, known unit types) or parsing are added to the same `ValidationErrors`.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;
use crate::models::{
    BookingFilter, BookingKind, BookingStatus, OccupancyScope, PageRequest, PaymentMethod,
    PaymentStatus, SortField, SortOrder,
};

/// What validation needs to know about the outside world.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub today: NaiveDate,
    pub unit_types: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub user_id: Option<String>,
    #[serde(alias = "cottageType")]
    #[validate(required(message = "Unit type is required"))]
    pub unit_type: Option<String>,
    #[validate(range(min = 1, message = "Unit number must be at least 1"))]
    pub unit_number: Option<u32>,
    #[validate(
        required(message = "Full name is required"),
        length(min = 2, max = 100, message = "Full name must be between 2 and 100 characters")
    )]
    pub full_name: Option<String>,
    #[validate(required(message = "Booking date is required"))]
    pub booking_date: Option<String>,
    #[validate(required(message = "Booking time is required"))]
    pub booking_time: Option<String>,
    #[serde(alias = "duration")]
    #[validate(
        required(message = "Duration is required"),
        range(min = 15, max = 1440, message = "Duration must be between 15 minutes and 24 hours")
    )]
    pub duration_minutes: Option<i32>,
    #[validate(
        required(message = "Number of people is required"),
        range(min = 1, max = 50, message = "Number of people must be between 1 and 50")
    )]
    pub number_of_people: Option<i32>,
    pub booking_kind: Option<String>,
    #[serde(default)]
    pub is_walk_in: bool,
    #[validate(length(max = 500, message = "Special requests cannot exceed 500 characters"))]
    pub special_requests: Option<String>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    #[validate(required(message = "Contact phone is required"))]
    pub contact_phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub contact_email: Option<String>,
    pub payment_method: Option<String>,
    pub proof_of_payment: Option<String>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[serde(alias = "cottageType")]
    pub unit_type: Option<String>,
    #[validate(range(min = 1, message = "Unit number must be at least 1"))]
    pub unit_number: Option<u32>,
    #[validate(length(min = 2, max = 100, message = "Full name must be between 2 and 100 characters"))]
    pub full_name: Option<String>,
    pub booking_date: Option<String>,
    pub booking_time: Option<String>,
    #[serde(alias = "duration")]
    #[validate(range(min = 15, max = 1440, message = "Duration must be between 15 minutes and 24 hours"))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 1, max = 50, message = "Number of people must be between 1 and 50"))]
    pub number_of_people: Option<i32>,
    pub booking_kind: Option<String>,
    #[validate(length(max = 500, message = "Special requests cannot exceed 500 characters"))]
    pub special_requests: Option<String>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    pub contact_phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub contact_email: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub proof_of_payment: Option<String>,
    pub payment_reference: Option<String>,
}

/// Body of cancel and reject.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    #[serde(alias = "cancellationReason")]
    #[validate(length(max = 200, message = "Reason cannot exceed 200 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsQuery {
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub unit_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    #[serde(alias = "cottageType")]
    #[validate(
        required(message = "Unit type is required"),
        length(min = 1, message = "Unit type is required")
    )]
    pub unit_type: Option<String>,
    #[validate(required(message = "Booking date is required"))]
    pub booking_date: Option<String>,
    #[validate(required(message = "Booking time is required"))]
    pub booking_time: Option<String>,
    pub scope: Option<OccupancyScope>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUnitTypeRequest {
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Capacity cannot exceed 50 characters"))]
    pub capacity: Option<String>,
    #[validate(
        required(message = "Price is required"),
        range(min = 0.0, message = "Price cannot be negative")
    )]
    pub price: Option<f64>,
    #[validate(
        required(message = "Quantity is required"),
        range(min = 1, message = "Quantity must be at least 1")
    )]
    pub quantity: Option<u32>,
    pub available: Option<bool>,
}

/// A creation request after validation. Owner and walk-in policy are applied later.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub user_id: Option<String>,
    pub unit_type: String,
    pub unit_number: Option<u32>,
    pub full_name: String,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub duration_minutes: i32,
    pub number_of_people: i32,
    pub booking_kind: BookingKind,
    pub is_walk_in: bool,
    pub special_requests: Option<String>,
    pub notes: Option<String>,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub proof_of_payment: Option<String>,
    pub payment_reference: Option<String>,
}

/// Field edits; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingPatch {
    pub unit_type: Option<String>,
    pub unit_number: Option<u32>,
    pub full_name: Option<String>,
    pub booking_date: Option<NaiveDate>,
    pub booking_time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub number_of_people: Option<i32>,
    pub booking_kind: Option<BookingKind>,
    pub special_requests: Option<String>,
    pub notes: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub proof_of_payment: Option<String>,
    pub payment_reference: Option<String>,
}

impl BookingPatch {
    /// True when the edit moves the booking to another slot or unit.
    pub fn touches_slot(&self) -> bool {
        self.unit_type.is_some()
            || self.unit_number.is_some()
            || self.booking_date.is_some()
            || self.booking_time.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub unit_type: String,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub scope: OccupancyScope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitTypeUpdate {
    pub description: Option<String>,
    pub capacity: Option<String>,
    pub price: f64,
    pub quantity: u32,
    pub available: bool,
}

fn field_error(errors: &mut ValidationErrors, field: &'static str, code: &'static str, message: &str) {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message.to_string()));
    errors.add(field, err);
}

fn derived_errors(result: Result<(), ValidationErrors>) -> ValidationErrors {
    result.err().unwrap_or_else(ValidationErrors::new)
}

fn finish<T>(errors: ValidationErrors, value: impl FnOnce() -> Option<T>) -> Result<T, AppError> {
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    // every field `value` unwraps was checked above
    value().ok_or_else(|| AppError::Internal(anyhow::anyhow!("validated request incomplete")))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Accepts `H:MM` or `HH:MM` on a 24h clock and returns `HH:MM`.
pub fn normalize_time(raw: &str) -> Option<String> {
    let (hour, minute) = raw.trim().split_once(':')?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !(1..=2).contains(&hour.len()) || minute.len() != 2 || !all_digits(hour) || !all_digits(minute) {
        return None;
    }

    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{hour:02}:{minute:02}"))
}

/// Optional leading `+`, then 7 to 20 of digits, spaces, dashes and parentheses.
pub fn is_valid_phone(raw: &str) -> bool {
    let body = raw.strip_prefix('+').unwrap_or(raw);
    (7..=20).contains(&body.chars().count())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

fn check_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    not_before: Option<NaiveDate>,
) -> Option<NaiveDate> {
    let Some(date) = parse_date(raw) else {
        field_error(errors, field, "date", "Invalid date format");
        return None;
    };
    if let Some(today) = not_before {
        if date < today {
            field_error(errors, field, "past_date", "Booking date cannot be in the past");
            return None;
        }
    }
    Some(date)
}

fn check_time(errors: &mut ValidationErrors, raw: &str) -> Option<String> {
    let time = normalize_time(raw);
    if time.is_none() {
        field_error(errors, "booking_time", "time", "Invalid time format. Use HH:MM format");
    }
    time
}

fn check_phone(errors: &mut ValidationErrors, raw: &str) {
    if !is_valid_phone(raw) {
        field_error(errors, "contact_phone", "phone", "Invalid phone number format");
    }
}

fn check_unit_type(errors: &mut ValidationErrors, ctx: &ValidationContext, raw: &str) {
    if !ctx.unit_types.iter().any(|t| t == raw) {
        field_error(errors, "unit_type", "unit_type", "Invalid unit type");
    }
}

fn check_kind(errors: &mut ValidationErrors, raw: &str) -> Option<BookingKind> {
    let kind = BookingKind::parse(raw);
    if kind.is_none() {
        field_error(errors, "booking_kind", "booking_kind", "Booking kind must be day_tour or overnight");
    }
    kind
}

fn check_payment_method(errors: &mut ValidationErrors, raw: &str) -> Option<PaymentMethod> {
    let method = PaymentMethod::parse(raw);
    if method.is_none() {
        field_error(errors, "payment_method", "payment_method", "Invalid payment method");
    }
    method
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_create(
    mut req: CreateBookingRequest,
    ctx: &ValidationContext,
) -> Result<NewBooking, AppError> {
    req.full_name = req.full_name.map(|name| name.trim().to_string());
    let mut errors = derived_errors(req.validate());

    if let Some(unit_type) = &req.unit_type {
        check_unit_type(&mut errors, ctx, unit_type);
    }
    let booking_date = req
        .booking_date
        .as_deref()
        .and_then(|raw| check_date(&mut errors, "booking_date", raw, Some(ctx.today)));
    let booking_time = req
        .booking_time
        .as_deref()
        .and_then(|raw| check_time(&mut errors, raw));
    if let Some(phone) = &req.contact_phone {
        check_phone(&mut errors, phone);
    }
    let booking_kind = match req.booking_kind.as_deref() {
        Some(raw) => check_kind(&mut errors, raw),
        None => Some(BookingKind::default()),
    };
    let payment_method = match req.payment_method.as_deref() {
        Some(raw) => check_payment_method(&mut errors, raw).map(Some),
        None => Some(None),
    };

    finish(errors, move || {
        Some(NewBooking {
            user_id: non_blank(req.user_id),
            unit_type: req.unit_type?,
            unit_number: req.unit_number,
            full_name: req.full_name?,
            booking_date: booking_date?,
            booking_time: booking_time?,
            duration_minutes: req.duration_minutes?,
            number_of_people: req.number_of_people?,
            booking_kind: booking_kind?,
            is_walk_in: req.is_walk_in,
            special_requests: non_blank(req.special_requests),
            notes: non_blank(req.notes),
            contact_phone: req.contact_phone?.trim().to_string(),
            contact_email: non_blank(req.contact_email),
            payment_method: payment_method?,
            proof_of_payment: non_blank(req.proof_of_payment),
            payment_reference: non_blank(req.payment_reference),
        })
    })
}

pub fn validate_update(
    mut req: UpdateBookingRequest,
    ctx: &ValidationContext,
) -> Result<BookingPatch, AppError> {
    req.full_name = req.full_name.map(|name| name.trim().to_string());
    let mut errors = derived_errors(req.validate());

    if let Some(unit_type) = &req.unit_type {
        check_unit_type(&mut errors, ctx, unit_type);
    }
    let booking_date = req
        .booking_date
        .as_deref()
        .map(|raw| check_date(&mut errors, "booking_date", raw, Some(ctx.today)));
    let booking_time = req
        .booking_time
        .as_deref()
        .map(|raw| check_time(&mut errors, raw));
    if let Some(phone) = &req.contact_phone {
        check_phone(&mut errors, phone);
    }
    let booking_kind = req
        .booking_kind
        .as_deref()
        .map(|raw| check_kind(&mut errors, raw));
    let payment_status = req.payment_status.as_deref().map(|raw| {
        let status = PaymentStatus::parse(raw);
        if status.is_none() {
            field_error(&mut errors, "payment_status", "payment_status", "Invalid payment status");
        }
        status
    });
    let payment_method = req
        .payment_method
        .as_deref()
        .map(|raw| check_payment_method(&mut errors, raw));

    finish(errors, move || {
        Some(BookingPatch {
            unit_type: req.unit_type,
            unit_number: req.unit_number,
            full_name: req.full_name,
            booking_date: booking_date.flatten(),
            booking_time: booking_time.flatten(),
            duration_minutes: req.duration_minutes,
            number_of_people: req.number_of_people,
            booking_kind: booking_kind.flatten(),
            special_requests: req.special_requests,
            notes: req.notes,
            contact_phone: req.contact_phone.map(|p| p.trim().to_string()),
            contact_email: req.contact_email,
            payment_status: payment_status.flatten(),
            payment_method: payment_method.flatten(),
            proof_of_payment: req.proof_of_payment,
            payment_reference: req.payment_reference,
        })
    })
}

pub fn validate_reason(req: TransitionRequest) -> Result<Option<String>, AppError> {
    req.validate()?;
    Ok(non_blank(req.reason))
}

pub fn validate_list(query: ListBookingsQuery) -> Result<(BookingFilter, PageRequest), AppError> {
    let mut errors = derived_errors(query.validate());

    let status = query.status.as_deref().and_then(|raw| {
        let status = BookingStatus::parse(raw);
        if status.is_none() {
            field_error(&mut errors, "status", "status", "Invalid booking status");
        }
        status
    });
    let sort_by = match query.sort_by.as_deref() {
        Some(raw) => SortField::parse(raw).or_else(|| {
            field_error(
                &mut errors,
                "sort_by",
                "sort_by",
                "Sort by must be one of createdAt, bookingDate, status, totalPrice",
            );
            None
        }),
        None => Some(SortField::default()),
    };
    let sort_order = match query.sort_order.as_deref() {
        Some(raw) => SortOrder::parse(raw).or_else(|| {
            field_error(&mut errors, "sort_order", "sort_order", "Sort order must be asc or desc");
            None
        }),
        None => Some(SortOrder::default()),
    };
    let start_date = query
        .start_date
        .as_deref()
        .and_then(|raw| check_date(&mut errors, "start_date", raw, None));
    let end_date = query
        .end_date
        .as_deref()
        .and_then(|raw| check_date(&mut errors, "end_date", raw, None));
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            field_error(&mut errors, "end_date", "date_range", "End date must be after start date");
        }
    }

    let defaults = PageRequest::default();
    finish(errors, move || {
        let filter = BookingFilter {
            status,
            user_id: None,
            unit_type: non_blank(query.unit_type),
            start_date,
            end_date,
        };
        let page = PageRequest {
            page: query.page.unwrap_or(defaults.page),
            limit: query.limit.unwrap_or(defaults.limit),
            sort_by: sort_by?,
            sort_order: sort_order?,
        };
        Some((filter, page))
    })
}

/// Availability lookups accept any date, including past ones.
pub fn validate_slot(query: SlotQuery) -> Result<Slot, AppError> {
    let mut errors = derived_errors(query.validate());

    let booking_date = query
        .booking_date
        .as_deref()
        .and_then(|raw| check_date(&mut errors, "booking_date", raw, None));
    let booking_time = query
        .booking_time
        .as_deref()
        .and_then(|raw| check_time(&mut errors, raw));

    finish(errors, move || {
        Some(Slot {
            unit_type: query.unit_type?,
            booking_date: booking_date?,
            booking_time: booking_time?,
            scope: query.scope.unwrap_or_default(),
        })
    })
}

pub fn validate_unit_type(req: UpsertUnitTypeRequest) -> Result<UnitTypeUpdate, AppError> {
    let mut errors = derived_errors(req.validate());
    if req.price.is_some_and(|p| !p.is_finite()) {
        field_error(&mut errors, "price", "range", "Price must be a number");
    }

    finish(errors, move || {
        Some(UnitTypeUpdate {
            description: non_blank(req.description),
            capacity: non_blank(req.capacity),
            price: req.price?,
            quantity: req.quantity?,
            available: req.available.unwrap_or(true),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ValidationContext {
        ValidationContext {
            today: NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
            unit_types: ["kubo", "With Videoke", "Without Videoke", "garden"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    fn valid_create() -> CreateBookingRequest {
        CreateBookingRequest {
            unit_type: Some("kubo".to_string()),
            full_name: Some("Ana Cruz".to_string()),
            booking_date: Some("2030-03-10".to_string()),
            booking_time: Some("8:00".to_string()),
            duration_minutes: Some(600),
            number_of_people: Some(4),
            contact_phone: Some("+63 917 123 4567".to_string()),
            ..Default::default()
        }
    }

    fn error_fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => {
                let mut fields: Vec<String> =
                    errors.field_errors().keys().map(|k| k.to_string()).collect();
                fields.sort();
                fields
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_create_is_normalised() {
        let booking = validate_create(valid_create(), &ctx()).unwrap();
        assert_eq!(booking.booking_time, "08:00");
        assert_eq!(booking.booking_kind, BookingKind::DayTour);
        assert_eq!(booking.booking_date, NaiveDate::from_ymd_opt(2030, 3, 10).unwrap());
        assert!(!booking.is_walk_in);
    }

    #[test]
    fn test_rfc3339_booking_date() {
        let mut req = valid_create();
        req.booking_date = Some("2030-03-10T00:00:00Z".to_string());
        let booking = validate_create(req, &ctx()).unwrap();
        assert_eq!(booking.booking_date, NaiveDate::from_ymd_opt(2030, 3, 10).unwrap());
    }

    #[test]
    fn test_missing_required_fields() {
        let fields = error_fields(validate_create(CreateBookingRequest::default(), &ctx()).unwrap_err());
        for field in [
            "booking_date",
            "booking_time",
            "contact_phone",
            "duration_minutes",
            "full_name",
            "number_of_people",
            "unit_type",
        ] {
            assert!(fields.contains(&field.to_string()), "missing error for {field}");
        }
    }

    #[test]
    fn test_each_bad_field_is_reported() {
        let mut req = valid_create();
        req.unit_type = Some("treehouse".to_string());
        req.booking_date = Some("2030-02-28".to_string());
        req.booking_time = Some("24:00".to_string());
        req.duration_minutes = Some(10);
        req.number_of_people = Some(51);
        req.contact_phone = Some("12ab".to_string());
        req.contact_email = Some("not-an-email".to_string());
        req.unit_number = Some(0);

        let fields = error_fields(validate_create(req, &ctx()).unwrap_err());
        assert_eq!(
            fields,
            vec![
                "booking_date",
                "booking_time",
                "contact_email",
                "contact_phone",
                "duration_minutes",
                "number_of_people",
                "unit_number",
                "unit_type",
            ]
        );
    }

    #[test]
    fn test_unknown_booking_kind_is_an_error_not_a_default() {
        let mut req = valid_create();
        req.booking_kind = Some("weekend".to_string());
        assert_eq!(error_fields(validate_create(req, &ctx()).unwrap_err()), vec!["booking_kind"]);
    }

    #[test]
    fn test_time_normalisation() {
        assert_eq!(normalize_time("7:05").as_deref(), Some("07:05"));
        assert_eq!(normalize_time("23:59").as_deref(), Some("23:59"));
        assert_eq!(normalize_time("23:60"), None);
        assert_eq!(normalize_time("123:00"), None);
        assert_eq!(normalize_time("12:5"), None);
        assert_eq!(normalize_time("noon"), None);
    }

    #[test]
    fn test_phone_pattern() {
        assert!(is_valid_phone("09171234567"));
        assert!(is_valid_phone("+63 (917) 123-4567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("+63-917-123-4567-000000"));
        assert!(!is_valid_phone("0917 CALL ME"));
    }

    #[test]
    fn test_update_allows_partial_and_checks_present_fields() {
        let patch = validate_update(
            UpdateBookingRequest {
                notes: Some("late arrival".to_string()),
                ..Default::default()
            },
            &ctx(),
        )
        .unwrap();
        assert_eq!(patch.notes.as_deref(), Some("late arrival"));
        assert!(!patch.touches_slot());

        let err = validate_update(
            UpdateBookingRequest {
                booking_time: Some("25:00".to_string()),
                payment_status: Some("lost".to_string()),
                ..Default::default()
            },
            &ctx(),
        )
        .unwrap_err();
        assert_eq!(error_fields(err), vec!["booking_time", "payment_status"]);
    }

    #[test]
    fn test_full_name_length_counts_trimmed_text() {
        let mut req = valid_create();
        req.full_name = Some("  A  ".to_string());
        assert_eq!(error_fields(validate_create(req, &ctx()).unwrap_err()), vec!["full_name"]);

        let err = validate_update(
            UpdateBookingRequest {
                full_name: Some("  A  ".to_string()),
                ..Default::default()
            },
            &ctx(),
        )
        .unwrap_err();
        assert_eq!(error_fields(err), vec!["full_name"]);

        let mut req = valid_create();
        req.full_name = Some("  Bo  ".to_string());
        assert_eq!(validate_create(req, &ctx()).unwrap().full_name, "Bo");
    }

    #[test]
    fn test_reason_length() {
        assert_eq!(
            validate_reason(TransitionRequest {
                reason: Some("fully booked".to_string())
            })
            .unwrap()
            .as_deref(),
            Some("fully booked")
        );
        assert!(validate_reason(TransitionRequest {
            reason: Some("x".repeat(201))
        })
        .is_err());
    }

    #[test]
    fn test_list_defaults() {
        let (filter, page) = validate_list(ListBookingsQuery::default()).unwrap();
        assert_eq!(filter, BookingFilter::default());
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn test_list_rejects_bad_query() {
        let err = validate_list(ListBookingsQuery {
            page: Some(0),
            limit: Some(101),
            status: Some("archived".to_string()),
            sort_by: Some("price".to_string()),
            sort_order: Some("up".to_string()),
            start_date: Some("2030-03-10".to_string()),
            end_date: Some("2030-03-01".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            error_fields(err),
            vec!["end_date", "limit", "page", "sort_by", "sort_order", "status"]
        );
    }

    #[test]
    fn test_slot_query_allows_past_dates() {
        let slot = validate_slot(SlotQuery {
            unit_type: Some("kubo".to_string()),
            booking_date: Some("2001-01-01".to_string()),
            booking_time: Some("9:30".to_string()),
            scope: None,
        })
        .unwrap();
        assert_eq!(slot.booking_time, "09:30");
        assert_eq!(slot.scope, OccupancyScope::Occupying);
    }

    #[test]
    fn test_unit_type_update_bounds() {
        assert!(validate_unit_type(UpsertUnitTypeRequest {
            price: Some(-1.0),
            quantity: Some(0),
            ..Default::default()
        })
        .is_err());

        let update = validate_unit_type(UpsertUnitTypeRequest {
            price: Some(950.0),
            quantity: Some(3),
            ..Default::default()
        })
        .unwrap();
        assert!(update.available);
    }
}
