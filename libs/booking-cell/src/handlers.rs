use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{NaiveDate, Utc};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{BookingError, CreateBookingRequest, SlotQueryRequest};
use crate::services::booking::BookingService;

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub service_id: Uuid,
    pub duration_minutes: Option<i32>,
}

fn map_booking_error(error: BookingError) -> AppError {
    match error {
        BookingError::ProviderNotFound
        | BookingError::ServiceNotFound
        | BookingError::BookingNotFound => AppError::NotFound(error.to_string()),
        BookingError::OutsideWorkingHours | BookingError::SlotInPast => {
            AppError::ValidationError(error.to_string())
        }
        BookingError::SlotUnavailable | BookingError::AlreadyCancelled => {
            AppError::Conflict(error.to_string())
        }
        BookingError::NotOwner => AppError::Auth(error.to_string()),
        BookingError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);

    let request = SlotQueryRequest {
        date: query.date,
        service_id: query.service_id,
        duration_minutes: query.duration_minutes,
    };
    let date = request.date;

    let slots = booking_service
        .get_available_slots(&provider_id, request, Utc::now())
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "slots": slots,
        "provider_id": provider_id,
        "date": date,
        "total_slots": slots.len()
    })))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = BookingService::new(&state);

    let booking = booking_service
        .create_booking(&user.id, request, Utc::now(), token)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn list_my_bookings(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = BookingService::new(&state);

    let bookings = booking_service
        .list_customer_bookings(&user.id, token)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "bookings": bookings,
        "total": bookings.len()
    })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = BookingService::new(&state);

    let booking = booking_service
        .cancel_booking(&booking_id, &user.id, token)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(booking)))
}
