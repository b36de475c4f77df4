pub mod availability;
pub mod booking;
pub mod event;
pub mod page;
pub mod unit_type;

pub use availability::{OccupancyScope, SlotAvailability, SlotNumbers, SlotOccupancy};
pub use booking::{Action, Booking, BookingKind, BookingStatus, PaymentMethod, PaymentStatus};
pub use event::{BookingEvent, BookingEventKind};
pub use page::{BookingFilter, Page, PageRequest, SortField, SortOrder};
pub use unit_type::UnitType;
