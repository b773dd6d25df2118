//! Slot computation for a provider's day: generate the candidate windows,
//! mark conflicts against existing bookings, and drop slots that already
//! started. Everything here is a pure function of its arguments; the
//! current time is always passed in, never read.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

use provider_cell::models::ProviderWorkingHours;

use crate::models::{Booking, Slot, WorkingHours, DEFAULT_BOOKING_DURATION_MINUTES};

/// Walk the working window in fixed `duration_minutes` steps and emit one
/// slot per step. A trailing remainder shorter than the duration is
/// dropped, not shortened. Returns nothing for a non-positive duration or
/// an inverted window.
pub fn generate_slots(duration_minutes: i32, hours: &WorkingHours) -> Vec<Slot> {
    if duration_minutes <= 0 || hours.start >= hours.end {
        return Vec::new();
    }

    let step = duration_minutes as u32;
    let window_end = minutes_since_midnight(hours.end);

    let mut slots = Vec::new();
    let mut current = minutes_since_midnight(hours.start);

    while current + step <= window_end {
        let start_time = time_of_day(current);
        slots.push(Slot {
            start_time,
            end_time: time_of_day(current + step),
            display_time: format_display(start_time),
            is_available: true,
        });
        current += step;
    }

    slots
}

/// True iff no existing booking overlaps `[slot_start, slot_end)`. A stored
/// booking without a duration counts as 60 minutes.
pub fn is_available(slot_start: NaiveTime, slot_end: NaiveTime, existing: &[Booking]) -> bool {
    let start = minutes_since_midnight(slot_start);
    let end = minutes_since_midnight(slot_end);

    existing.iter().all(|booking| {
        let booking_start = minutes_since_midnight(booking.scheduled_time);
        let booking_end = booking_start
            + booking
                .duration_minutes
                .unwrap_or(DEFAULT_BOOKING_DURATION_MINUTES) as u32;
        !overlaps(start, end, booking_start, booking_end)
    })
}

/// Half-open interval overlap: `[a, b)` and `[c, d)` share an instant iff
/// `a < d && c < b`. Intervals that merely touch at a boundary do not
/// overlap, so a slot ending exactly when a booking starts stays free.
pub fn overlaps(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Recompute availability for every slot against the day's bookings,
/// producing a new sequence.
pub fn mark_availability(slots: &[Slot], existing: &[Booking]) -> Vec<Slot> {
    slots
        .iter()
        .map(|slot| Slot {
            is_available: is_available(slot.start_time, slot.end_time, existing),
            ..slot.clone()
        })
        .collect()
}

/// On the current date, keep only slots starting strictly after `now`
/// (minute granularity); any other date passes through untouched.
pub fn filter_past_slots(
    slots: Vec<Slot>,
    selected_date: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<Slot> {
    if selected_date != now.date_naive() {
        return slots;
    }

    let now_minutes = minutes_since_midnight(now.time());
    slots
        .into_iter()
        .filter(|slot| minutes_since_midnight(slot.start_time) > now_minutes)
        .collect()
}

/// 12-hour wall-clock label, e.g. `"12:05 AM"`, `"1:00 PM"`.
pub fn format_display(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Merge a provider's custom hours over the platform defaults, field by
/// field: each missing edge falls back independently.
pub fn resolve_working_hours(
    custom: Option<&ProviderWorkingHours>,
    defaults: &WorkingHours,
) -> WorkingHours {
    match custom {
        Some(hours) => WorkingHours {
            start: hours.start.unwrap_or(defaults.start),
            end: hours.end.unwrap_or(defaults.end),
        },
        None => defaults.clone(),
    }
}

pub(crate) fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub(crate) fn time_of_day(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
}
