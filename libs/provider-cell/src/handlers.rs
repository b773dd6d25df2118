use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    CreateProviderRequest, CreateReviewRequest, CreateServiceRequest, ProviderError,
    ProviderSearchFilters, UpdateProviderRequest,
};
use crate::services::{provider::ProviderService, review::ReviewService};

#[derive(Debug, Deserialize)]
pub struct ProviderSearchQuery {
    pub category: Option<String>,
    pub min_rating: Option<f32>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn search_providers(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ProviderSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let provider_service = ProviderService::new(&state);

    let filters = ProviderSearchFilters {
        category: query.category,
        min_rating: query.min_rating,
        limit: query.limit,
        offset: query.offset,
    };

    let providers = provider_service
        .search_providers(filters)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "providers": providers,
        "total": providers.len()
    })))
}

#[axum::debug_handler]
pub async fn get_provider(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let provider_service = ProviderService::new(&state);

    let provider = provider_service
        .get_provider(&provider_id)
        .await
        .map_err(|_| AppError::NotFound("Provider not found".to_string()))?;

    Ok(Json(json!(provider)))
}

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let provider_service = ProviderService::new(&state);

    let services = provider_service
        .list_services(&provider_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "services": services,
        "provider_id": provider_id
    })))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<AppConfig>>,
    Path((provider_id, service_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let provider_service = ProviderService::new(&state);

    let service = provider_service
        .get_service(&provider_id, &service_id)
        .await
        .map_err(|_| AppError::NotFound("Service not found".to_string()))?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn list_reviews(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let review_service = ReviewService::new(&state);

    let reviews = review_service
        .list_reviews(&provider_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "reviews": reviews,
        "provider_id": provider_id,
        "total": reviews.len()
    })))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_provider(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateProviderRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    // Only admins can register new providers
    if !user.is_admin() {
        return Err(AppError::Auth(
            "Only administrators can create providers".to_string(),
        ));
    }

    let provider_service = ProviderService::new(&state);

    let provider = provider_service
        .create_provider(request, token)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(provider)))
}

#[axum::debug_handler]
pub async fn update_provider(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateProviderRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    // Only the provider themselves or an admin can update the profile
    if !user.is_admin() && user.id != provider_id {
        return Err(AppError::Auth(
            "Not authorized to update this provider".to_string(),
        ));
    }

    let provider_service = ProviderService::new(&state);

    let updated_provider = provider_service
        .update_provider(&provider_id, request, token)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(updated_provider)))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if !user.is_admin() && user.id != provider_id {
        return Err(AppError::Auth(
            "Not authorized to manage this provider's services".to_string(),
        ));
    }

    if request.duration_minutes <= 0 {
        return Err(AppError::ValidationError(
            "Service duration must be positive".to_string(),
        ));
    }

    let provider_service = ProviderService::new(&state);

    let service = provider_service
        .create_service(&provider_id, request, token)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn create_review(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let review_service = ReviewService::new(&state);

    let review = review_service
        .create_review(&provider_id, &user.id, request, token)
        .await
        .map_err(|e| match e {
            ProviderError::NotFound => AppError::NotFound(e.to_string()),
            ProviderError::DuplicateReview => AppError::Conflict(e.to_string()),
            ProviderError::InvalidRating => AppError::ValidationError(e.to_string()),
            ProviderError::DatabaseError(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!(review)))
}
