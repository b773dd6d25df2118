use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback length for stored bookings that predate per-booking durations.
pub const DEFAULT_BOOKING_DURATION_MINUTES: i32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub customer_id: String,
    pub booking_date: NaiveDate,
    #[serde(with = "shared_models::time::hm")]
    pub scheduled_time: NaiveTime,
    pub duration_minutes: Option<i32>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

/// The daily window a provider accepts bookings in. `start < end` within a
/// single day; a violated window produces no slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(with = "shared_models::time::hm")]
    pub start: NaiveTime,
    #[serde(with = "shared_models::time::hm")]
    pub end: NaiveTime,
}

impl Default for WorkingHours {
    // Platform default window, 09:00 to 17:00
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }
}

/// A fixed-length bookable window within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "shared_models::time::hm")]
    pub start_time: NaiveTime,
    #[serde(with = "shared_models::time::hm")]
    pub end_time: NaiveTime,
    pub display_time: String,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub booking_date: NaiveDate,
    #[serde(with = "shared_models::time::hm")]
    pub scheduled_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotQueryRequest {
    pub date: NaiveDate,
    pub service_id: Uuid,
    pub duration_minutes: Option<i32>,
}

// Error types specific to booking operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum BookingError {
    #[error("Provider not found")]
    ProviderNotFound,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Requested time is outside the provider's working hours")]
    OutsideWorkingHours,

    #[error("Requested time is in the past")]
    SlotInPast,

    #[error("Requested time conflicts with an existing booking")]
    SlotUnavailable,

    #[error("Booking is already cancelled")]
    AlreadyCancelled,

    #[error("Not authorized to modify this booking")]
    NotOwner,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
