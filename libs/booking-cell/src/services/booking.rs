use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use provider_cell::models::{Provider, ServiceOffering};

use crate::models::{
    Booking, BookingError, BookingStatus, CreateBookingRequest, Slot, SlotQueryRequest,
    WorkingHours,
};
use crate::services::slots;

pub struct BookingService {
    supabase: SupabaseClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Compute the bookable slots for a provider on a date: resolve the
    /// working window, generate candidates for the service duration, mark
    /// conflicts against that day's bookings, and drop already-started
    /// slots when the date is today.
    pub async fn get_available_slots(
        &self,
        provider_id: &str,
        query: SlotQueryRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<Slot>, BookingError> {
        debug!(
            "Calculating slots for provider {} on {}",
            provider_id, query.date
        );

        let provider = self.get_provider(provider_id).await?;
        let service = self
            .get_service(provider_id, &query.service_id.to_string())
            .await?;

        let duration = query.duration_minutes.unwrap_or(service.duration_minutes);
        let hours =
            slots::resolve_working_hours(provider.working_hours.as_ref(), &WorkingHours::default());

        let generated = slots::generate_slots(duration, &hours);
        let existing = self.get_bookings_for_date(provider_id, query.date).await?;

        let marked = slots::mark_availability(&generated, &existing);
        let open = slots::filter_past_slots(marked, query.date, now);

        debug!("Found {} slots for provider {}", open.len(), provider_id);
        Ok(open)
    }

    /// Book a slot. The slot must sit inside the provider's working hours,
    /// must not have started yet, and must not overlap any existing
    /// non-cancelled booking for that day.
    pub async fn create_booking(
        &self,
        customer_id: &str,
        request: CreateBookingRequest,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        debug!(
            "Booking request from {} for provider {} on {} at {}",
            customer_id, request.provider_id, request.booking_date, request.scheduled_time
        );

        let provider_id = request.provider_id.to_string();
        let provider = self.get_provider(&provider_id).await?;
        let service = self
            .get_service(&provider_id, &request.service_id.to_string())
            .await?;

        let duration = service.duration_minutes;
        let hours =
            slots::resolve_working_hours(provider.working_hours.as_ref(), &WorkingHours::default());

        let start_minutes = slots::minutes_since_midnight(request.scheduled_time);
        let end_minutes = start_minutes + duration as u32;

        if start_minutes < slots::minutes_since_midnight(hours.start)
            || end_minutes > slots::minutes_since_midnight(hours.end)
        {
            return Err(BookingError::OutsideWorkingHours);
        }

        if request.booking_date < now.date_naive()
            || (request.booking_date == now.date_naive()
                && start_minutes <= slots::minutes_since_midnight(now.time()))
        {
            return Err(BookingError::SlotInPast);
        }

        let existing = self
            .get_bookings_for_date(&provider_id, request.booking_date)
            .await?;
        let end_time = slots::time_of_day(end_minutes);

        if !slots::is_available(request.scheduled_time, end_time, &existing) {
            warn!(
                "Booking conflict for provider {} on {} at {}",
                provider_id, request.booking_date, request.scheduled_time
            );
            return Err(BookingError::SlotUnavailable);
        }

        let booking_data = json!({
            "provider_id": request.provider_id,
            "service_id": request.service_id,
            "customer_id": customer_id,
            "booking_date": request.booking_date,
            "scheduled_time": request.scheduled_time.format("%H:%M").to_string(),
            "duration_minutes": duration,
            "status": "confirmed",
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/bookings",
                Some(auth_token),
                Some(booking_data),
                Some(headers),
            )
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(BookingError::DatabaseError(
                "Failed to create booking".to_string(),
            ));
        }

        let booking: Booking = serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;
        debug!("Booking created with ID: {}", booking.id);

        Ok(booking)
    }

    /// A customer's bookings, most recent date first.
    pub async fn list_customer_bookings(
        &self,
        customer_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Booking>, BookingError> {
        let path = format!(
            "/rest/v1/bookings?customer_id=eq.{}&order=booking_date.desc,scheduled_time.desc",
            customer_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let bookings: Vec<Booking> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Booking>, _>>()
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        Ok(bookings)
    }

    /// Cancel a booking the caller owns.
    pub async fn cancel_booking(
        &self,
        booking_id: &str,
        customer_id: &str,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        debug!("Cancelling booking: {}", booking_id);

        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(BookingError::BookingNotFound);
        }

        let booking: Booking = serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if booking.customer_id != customer_id {
            return Err(BookingError::NotOwner);
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled);
        }

        let update_data = json!({
            "status": "cancelled",
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update_data),
                Some(headers),
            )
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(BookingError::DatabaseError(
                "Failed to cancel booking".to_string(),
            ));
        }

        let cancelled: Booking = serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        Ok(cancelled)
    }

    // Private helper methods

    async fn get_provider(&self, provider_id: &str) -> Result<Provider, BookingError> {
        let path = format!(
            "/rest/v1/providers?id=eq.{}&is_active=eq.true",
            provider_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(BookingError::ProviderNotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(e.to_string()))
    }

    async fn get_service(
        &self,
        provider_id: &str,
        service_id: &str,
    ) -> Result<ServiceOffering, BookingError> {
        let path = format!(
            "/rest/v1/provider_services?id=eq.{}&provider_id=eq.{}&is_active=eq.true",
            service_id, provider_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(BookingError::ServiceNotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(e.to_string()))
    }

    async fn get_bookings_for_date(
        &self,
        provider_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, BookingError> {
        let path = format!(
            "/rest/v1/bookings?provider_id=eq.{}&booking_date=eq.{}&status=neq.cancelled&order=scheduled_time.asc",
            provider_id, date
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let bookings: Vec<Booking> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Booking>, _>>()
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        Ok(bookings)
    }
}
