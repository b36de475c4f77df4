use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::AppError;
use crate::models::{
    Booking, BookingFilter, BookingKind, BookingStatus, OccupancyScope, PageRequest,
    PaymentMethod, PaymentStatus, UnitType,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC time at the precision the store keeps.
pub fn utc_now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn conversion_error(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("invalid {what}: {value}").into(),
    )
}

fn parse_ts(idx: usize, value: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TS_FORMAT).map_err(|_| conversion_error(idx, "timestamp", value))
}

fn parse_opt_ts(idx: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    value.map(|v| parse_ts(idx, &v)).transpose()
}

/// A UNIQUE violation on a booking write means another writer took the unit first.
fn map_write_error(err: rusqlite::Error) -> AppError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            AppError::Conflict("unit is already booked for this slot".to_string())
        }
        _ => AppError::Database(err),
    }
}

// ── Unit Types ──

const UNIT_TYPE_COLUMNS: &str =
    "name, description, capacity, price, quantity, available, created_at, updated_at";

fn parse_unit_type_row(row: &rusqlite::Row) -> rusqlite::Result<UnitType> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(UnitType {
        name: row.get(0)?,
        description: row.get(1)?,
        capacity: row.get(2)?,
        price: row.get(3)?,
        quantity: row.get(4)?,
        available: row.get(5)?,
        created_at: parse_ts(6, &created_at)?,
        updated_at: parse_ts(7, &updated_at)?,
    })
}

pub fn get_unit_type(conn: &Connection, name: &str) -> Result<Option<UnitType>, AppError> {
    let unit_type = conn
        .query_row(
            &format!("SELECT {UNIT_TYPE_COLUMNS} FROM unit_types WHERE name = ?1"),
            params![name],
            parse_unit_type_row,
        )
        .optional()?;
    Ok(unit_type)
}

pub fn list_unit_types(conn: &Connection) -> Result<Vec<UnitType>, AppError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {UNIT_TYPE_COLUMNS} FROM unit_types ORDER BY name ASC"))?;
    let rows = stmt.query_map([], parse_unit_type_row)?;

    let mut unit_types = vec![];
    for row in rows {
        unit_types.push(row?);
    }
    Ok(unit_types)
}

pub fn upsert_unit_type(conn: &Connection, unit_type: &UnitType) -> Result<(), AppError> {
    conn.execute(
        "INSERT INTO unit_types (name, description, capacity, price, quantity, available, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(name) DO UPDATE SET
            description = excluded.description,
            capacity = excluded.capacity,
            price = excluded.price,
            quantity = excluded.quantity,
            available = excluded.available,
            updated_at = excluded.updated_at",
        params![
            unit_type.name,
            unit_type.description,
            unit_type.capacity,
            unit_type.price,
            unit_type.quantity,
            unit_type.available,
            format_ts(&unit_type.created_at),
            format_ts(&unit_type.updated_at),
        ],
    )?;
    Ok(())
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, user_id, unit_type, unit_number, full_name, booking_date, booking_time, \
     duration_minutes, number_of_people, booking_kind, is_walk_in, special_requests, notes, \
     contact_phone, contact_email, total_price, payment_status, payment_method, proof_of_payment, \
     payment_reference, status, cancellation_reason, confirmed_at, completed_at, cancelled_at, \
     checked_out_at, created_at, updated_at";

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let booking_date: String = row.get(5)?;
    let booking_kind: String = row.get(9)?;
    let payment_status: String = row.get(16)?;
    let payment_method: Option<String> = row.get(17)?;
    let status: String = row.get(20)?;
    let created_at: String = row.get(26)?;
    let updated_at: String = row.get(27)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        unit_type: row.get(2)?,
        unit_number: row.get(3)?,
        full_name: row.get(4)?,
        booking_date: NaiveDate::parse_from_str(&booking_date, DATE_FORMAT)
            .map_err(|_| conversion_error(5, "booking date", &booking_date))?,
        booking_time: row.get(6)?,
        duration_minutes: row.get(7)?,
        number_of_people: row.get(8)?,
        booking_kind: BookingKind::parse(&booking_kind)
            .ok_or_else(|| conversion_error(9, "booking kind", &booking_kind))?,
        is_walk_in: row.get(10)?,
        special_requests: row.get(11)?,
        notes: row.get(12)?,
        contact_phone: row.get(13)?,
        contact_email: row.get(14)?,
        total_price: row.get(15)?,
        payment_status: PaymentStatus::parse(&payment_status)
            .ok_or_else(|| conversion_error(16, "payment status", &payment_status))?,
        payment_method: payment_method
            .map(|m| PaymentMethod::parse(&m).ok_or_else(|| conversion_error(17, "payment method", &m)))
            .transpose()?,
        proof_of_payment: row.get(18)?,
        payment_reference: row.get(19)?,
        status: BookingStatus::parse(&status)
            .ok_or_else(|| conversion_error(20, "booking status", &status))?,
        cancellation_reason: row.get(21)?,
        confirmed_at: parse_opt_ts(22, row.get(22)?)?,
        completed_at: parse_opt_ts(23, row.get(23)?)?,
        cancelled_at: parse_opt_ts(24, row.get(24)?)?,
        checked_out_at: parse_opt_ts(25, row.get(25)?)?,
        created_at: parse_ts(26, &created_at)?,
        updated_at: parse_ts(27, &updated_at)?,
    })
}

pub fn insert_booking(conn: &Connection, booking: &Booking) -> Result<(), AppError> {
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                     ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)"
        ),
        params![
            booking.id,
            booking.user_id,
            booking.unit_type,
            booking.unit_number,
            booking.full_name,
            format_date(&booking.booking_date),
            booking.booking_time,
            booking.duration_minutes,
            booking.number_of_people,
            booking.booking_kind.as_str(),
            booking.is_walk_in,
            booking.special_requests,
            booking.notes,
            booking.contact_phone,
            booking.contact_email,
            booking.total_price,
            booking.payment_status.as_str(),
            booking.payment_method.map(|m| m.as_str()),
            booking.proof_of_payment,
            booking.payment_reference,
            booking.status.as_str(),
            booking.cancellation_reason,
            booking.confirmed_at.as_ref().map(format_ts),
            booking.completed_at.as_ref().map(format_ts),
            booking.cancelled_at.as_ref().map(format_ts),
            booking.checked_out_at.as_ref().map(format_ts),
            format_ts(&booking.created_at),
            format_ts(&booking.updated_at),
        ],
    )
    .map_err(map_write_error)?;
    Ok(())
}

/// Writes every mutable column of an existing booking. Returns false if the id is gone.
pub fn update_booking(conn: &Connection, booking: &Booking) -> Result<bool, AppError> {
    let count = conn
        .execute(
            "UPDATE bookings SET
                user_id = ?2, unit_number = ?3, full_name = ?4, booking_date = ?5, booking_time = ?6,
                duration_minutes = ?7, number_of_people = ?8, booking_kind = ?9, is_walk_in = ?10,
                special_requests = ?11, notes = ?12, contact_phone = ?13, contact_email = ?14,
                payment_status = ?15, payment_method = ?16, proof_of_payment = ?17,
                payment_reference = ?18, status = ?19, cancellation_reason = ?20,
                confirmed_at = ?21, completed_at = ?22, cancelled_at = ?23, checked_out_at = ?24,
                updated_at = ?25
             WHERE id = ?1",
            params![
                booking.id,
                booking.user_id,
                booking.unit_number,
                booking.full_name,
                format_date(&booking.booking_date),
                booking.booking_time,
                booking.duration_minutes,
                booking.number_of_people,
                booking.booking_kind.as_str(),
                booking.is_walk_in,
                booking.special_requests,
                booking.notes,
                booking.contact_phone,
                booking.contact_email,
                booking.payment_status.as_str(),
                booking.payment_method.map(|m| m.as_str()),
                booking.proof_of_payment,
                booking.payment_reference,
                booking.status.as_str(),
                booking.cancellation_reason,
                booking.confirmed_at.as_ref().map(format_ts),
                booking.completed_at.as_ref().map(format_ts),
                booking.cancelled_at.as_ref().map(format_ts),
                booking.checked_out_at.as_ref().map(format_ts),
                format_ts(&booking.updated_at),
            ],
        )
        .map_err(map_write_error)?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: &str) -> Result<bool, AppError> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> Result<Option<Booking>, AppError> {
    let booking = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            parse_booking_row,
        )
        .optional()?;
    Ok(booking)
}

/// Unit numbers held in a slot under `scope`, one entry per booking.
pub fn slot_unit_numbers(
    conn: &Connection,
    unit_type: &str,
    date: &NaiveDate,
    time: &str,
    scope: OccupancyScope,
    exclude_id: Option<&str>,
) -> Result<Vec<Option<u32>>, AppError> {
    let excluded = scope
        .excluded_statuses()
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut stmt = conn.prepare(&format!(
        "SELECT unit_number FROM bookings
         WHERE unit_type = ?1 AND booking_date = ?2 AND booking_time = ?3
           AND status NOT IN ({excluded})
           AND (?4 IS NULL OR id != ?4)"
    ))?;

    let rows = stmt.query_map(
        params![unit_type, format_date(date), time, exclude_id],
        |row| row.get::<_, Option<u32>>(0),
    )?;

    let mut numbers = vec![];
    for row in rows {
        numbers.push(row?);
    }
    Ok(numbers)
}

pub fn list_bookings(
    conn: &Connection,
    filter: &BookingFilter,
    page: &PageRequest,
) -> Result<(Vec<Booking>, u64), AppError> {
    let mut clauses: Vec<&str> = vec![];
    let mut values: Vec<Box<dyn ToSql>> = vec![];

    if let Some(status) = filter.status {
        clauses.push("status = ?");
        values.push(Box::new(status.as_str()));
    }
    if let Some(user_id) = &filter.user_id {
        clauses.push("user_id = ?");
        values.push(Box::new(user_id.clone()));
    }
    if let Some(unit_type) = &filter.unit_type {
        clauses.push("unit_type = ?");
        values.push(Box::new(unit_type.clone()));
    }
    if let Some(start) = &filter.start_date {
        clauses.push("booking_date >= ?");
        values.push(Box::new(format_date(start)));
    }
    if let Some(end) = &filter.end_date {
        clauses.push("booking_date <= ?");
        values.push(Box::new(format_date(end)));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let value_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM bookings {where_sql}"),
        value_refs.as_slice(),
        |row| row.get(0),
    )?;

    let direction = page.sort_order.as_sql();
    let order_sql = page
        .sort_by
        .columns()
        .iter()
        .map(|col| format!("{col} {direction}"))
        .chain(std::iter::once(format!("id {direction}")))
        .collect::<Vec<_>>()
        .join(", ");

    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings {where_sql} ORDER BY {order_sql} LIMIT {} OFFSET {}",
        page.limit,
        page.offset()
    ))?;
    let rows = stmt.query_map(value_refs.as_slice(), parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok((bookings, total.max(0) as u64))
}

/// Checked-in day-tour bookings for `date`, due for automatic check-out.
pub fn get_day_tours_checked_in(
    conn: &Connection,
    date: &NaiveDate,
) -> Result<Vec<Booking>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE status = 'completed' AND booking_kind = 'day_tour' AND booking_date = ?1
         ORDER BY booking_time ASC"
    ))?;
    let rows = stmt.query_map(params![format_date(date)], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}
