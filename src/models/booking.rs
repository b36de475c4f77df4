use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_REJECTION_REASON: &str = "Booking rejected by staff";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
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
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub proof_of_payment: Option<String>,
    pub payment_reference: Option<String>,
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub confirmed_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub checked_out_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    /// Fails with `InvalidTransition` when `action` is not allowed from the current status.
    pub fn ensure_allows(&self, action: Action) -> Result<(), AppError> {
        if self.status.allows(action) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition {
                from: self.status,
                action,
            })
        }
    }

    /// Moves the booking along the lifecycle and stamps the audit fields.
    ///
    /// `Update` and `Delete` are only checked here; the caller edits or removes the record.
    pub fn transition(
        &mut self,
        action: Action,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<(), AppError> {
        self.ensure_allows(action)?;

        match action {
            Action::Confirm => {
                self.status = BookingStatus::Confirmed;
                self.confirmed_at.get_or_insert(now);
            }
            Action::Complete => {
                self.status = BookingStatus::Completed;
                self.completed_at.get_or_insert(now);
            }
            Action::Cancel => {
                self.status = BookingStatus::Cancelled;
                self.cancellation_reason = reason;
                self.cancelled_at.get_or_insert(now);
            }
            Action::Reject => {
                self.status = BookingStatus::Rejected;
                self.cancellation_reason = Some(
                    reason
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string()),
                );
                self.cancelled_at.get_or_insert(now);
            }
            Action::CheckOut => {
                self.status = BookingStatus::CheckedOut;
                self.checked_out_at.get_or_insert(now);
            }
            Action::Update | Action::Delete => return Ok(()),
        }

        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rejected,
    CheckedOut,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Rejected,
        BookingStatus::CheckedOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rejected => "rejected",
            BookingStatus::CheckedOut => "checked_out",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Holds its unit number against other bookings for the same slot.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Completed
        )
    }

    pub fn allows(&self, action: Action) -> bool {
        use BookingStatus::*;
        match action {
            Action::Confirm => *self == Pending,
            Action::Complete => *self == Confirmed,
            Action::Cancel => matches!(self, Pending | Confirmed),
            Action::Reject => *self == Pending,
            Action::CheckOut => *self == Completed,
            Action::Update => self.is_active(),
            Action::Delete => *self != Completed,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Confirm,
    Complete,
    Cancel,
    Reject,
    CheckOut,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Confirm => "confirm",
            Action::Complete => "complete",
            Action::Cancel => "cancel",
            Action::Reject => "reject",
            Action::CheckOut => "check out",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingKind {
    #[default]
    DayTour,
    Overnight,
}

impl BookingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingKind::DayTour => "day_tour",
            BookingKind::Overnight => "overnight",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day_tour" => Some(BookingKind::DayTour),
            "overnight" => Some(BookingKind::Overnight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "refunded" => Some(PaymentStatus::Refunded),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Paypal,
    Cash,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "credit_card" => Some(PaymentMethod::CreditCard),
            "debit_card" => Some(PaymentMethod::DebitCard),
            "paypal" => Some(PaymentMethod::Paypal),
            "cash" => Some(PaymentMethod::Cash),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            _ => None,
        }
    }
}
