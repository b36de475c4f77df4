use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::BookingStatus;

/// Which bookings count as holding a unit for a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyScope {
    /// Everything except cancelled and rejected bookings.
    Committed,
    /// Committed minus checked-out bookings. Matches the store's uniqueness index.
    #[default]
    Occupying,
}

impl OccupancyScope {
    pub fn excluded_statuses(&self) -> &'static [BookingStatus] {
        match self {
            OccupancyScope::Committed => &[BookingStatus::Cancelled, BookingStatus::Rejected],
            OccupancyScope::Occupying => &[
                BookingStatus::Cancelled,
                BookingStatus::Rejected,
                BookingStatus::CheckedOut,
            ],
        }
    }
}

/// Bookings already holding a slot, measured against the unit type's quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOccupancy {
    pub quantity: u32,
    pub occupied: u32,
    pub assigned: Vec<u32>,
}

impl SlotOccupancy {
    pub fn new(quantity: u32, numbers: impl IntoIterator<Item = Option<u32>>) -> Self {
        let mut occupied = 0;
        let mut assigned = Vec::new();
        for number in numbers {
            occupied += 1;
            if let Some(n) = number {
                assigned.push(n);
            }
        }
        assigned.sort_unstable();
        assigned.dedup();

        Self {
            quantity,
            occupied,
            assigned,
        }
    }

    /// Missing or withdrawn unit types have nothing to offer.
    pub fn unavailable() -> Self {
        Self {
            quantity: 0,
            occupied: 0,
            assigned: Vec::new(),
        }
    }

    pub fn free_numbers(&self) -> Vec<u32> {
        (1..=self.quantity)
            .filter(|n| self.assigned.binary_search(n).is_err())
            .collect()
    }

    pub fn remaining(&self) -> u32 {
        let by_count = self.quantity.saturating_sub(self.occupied);
        by_count.min(self.free_numbers().len() as u32)
    }

    pub fn has_capacity(&self) -> bool {
        self.remaining() > 0
    }

    /// Picks the requested unit number, or the lowest free one.
    pub fn assign(&self, requested: Option<u32>) -> Result<u32, AppError> {
        if !self.has_capacity() {
            return Err(AppError::Conflict(
                "no available unit of this type at the selected time".to_string(),
            ));
        }

        let free = self.free_numbers();
        match requested {
            Some(n) if free.contains(&n) => Ok(n),
            Some(n) => Err(AppError::Conflict(format!(
                "unit number {n} is not available"
            ))),
            None => free.first().copied().ok_or_else(|| {
                AppError::Conflict("no available unit of this type at the selected time".to_string())
            }),
        }
    }

    pub fn to_availability(&self) -> SlotAvailability {
        SlotAvailability {
            available: self.has_capacity(),
            available_quantity: self.remaining(),
        }
    }

    pub fn to_numbers(&self) -> SlotNumbers {
        SlotNumbers {
            available_numbers: self.free_numbers(),
            total_quantity: self.quantity,
            assigned_numbers: self.assigned.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub available: bool,
    pub available_quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotNumbers {
    pub available_numbers: Vec<u32>,
    pub total_quantity: u32,
    pub assigned_numbers: Vec<u32>,
}
