use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub category: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub working_hours: Option<ProviderWorkingHours>,
    pub rating: f32,
    pub review_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Custom opening hours for a provider. Either edge may be absent; the
/// booking cell falls back to the platform default for a missing edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderWorkingHours {
    #[serde(default, with = "shared_models::time::hm_option")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "shared_models::time::hm_option")]
    pub end: Option<NaiveTime>,
}

/// A bookable service from a provider's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub customer_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderRequest {
    pub name: String,
    pub email: String,
    pub category: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub working_hours: Option<ProviderWorkingHours>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProviderRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub working_hours: Option<ProviderWorkingHours>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSearchFilters {
    pub category: Option<String>,
    pub min_rating: Option<f32>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

// Error types specific to provider operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider not found")]
    NotFound,

    #[error("A review for this provider already exists")]
    DuplicateReview,

    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
