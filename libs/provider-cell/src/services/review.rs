use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateReviewRequest, ProviderError, Review};

pub struct ReviewService {
    supabase: SupabaseClient,
}

impl ReviewService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Create a review and refresh the provider's rating aggregate.
    /// One review per customer per provider.
    pub async fn create_review(
        &self,
        provider_id: &str,
        customer_id: &str,
        request: CreateReviewRequest,
        auth_token: &str,
    ) -> Result<Review, ProviderError> {
        debug!("Creating review for provider {} by {}", provider_id, customer_id);

        if !(1..=5).contains(&request.rating) {
            return Err(ProviderError::InvalidRating);
        }

        let provider_path = format!("/rest/v1/providers?id=eq.{}", provider_id);
        let providers: Vec<Value> = self
            .supabase
            .request(Method::GET, &provider_path, Some(auth_token), None)
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        if providers.is_empty() {
            return Err(ProviderError::NotFound);
        }

        let existing_path = format!(
            "/rest/v1/reviews?provider_id=eq.{}&customer_id=eq.{}",
            provider_id, customer_id
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            warn!("Duplicate review attempt for provider {} by {}", provider_id, customer_id);
            return Err(ProviderError::DuplicateReview);
        }

        let review_data = json!({
            "provider_id": provider_id,
            "customer_id": customer_id,
            "rating": request.rating,
            "comment": request.comment,
            "created_at": Utc::now().to_rfc3339()
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
                "/rest/v1/reviews",
                Some(auth_token),
                Some(review_data),
                Some(headers),
            )
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(ProviderError::DatabaseError(
                "Failed to create review".to_string(),
            ));
        }

        let review: Review = serde_json::from_value(result[0].clone())
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        self.refresh_rating_aggregate(provider_id, auth_token).await?;

        Ok(review)
    }

    /// List a provider's reviews, newest first.
    pub async fn list_reviews(&self, provider_id: &str) -> Result<Vec<Review>, ProviderError> {
        let path = format!(
            "/rest/v1/reviews?provider_id=eq.{}&order=created_at.desc",
            provider_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        let reviews: Vec<Review> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Review>, _>>()
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        Ok(reviews)
    }

    // Recompute rating/review_count from all stored ratings and patch the
    // provider row.
    async fn refresh_rating_aggregate(
        &self,
        provider_id: &str,
        auth_token: &str,
    ) -> Result<(), ProviderError> {
        let ratings_path = format!(
            "/rest/v1/reviews?provider_id=eq.{}&select=rating",
            provider_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &ratings_path, Some(auth_token), None)
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        let ratings: Vec<i64> = rows
            .iter()
            .filter_map(|row| row["rating"].as_i64())
            .collect();

        let review_count = ratings.len() as i32;
        let rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().sum::<i64>() as f32 / review_count as f32
        };

        let update_data = json!({
            "rating": rating,
            "review_count": review_count,
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("/rest/v1/providers?id=eq.{}", provider_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update_data),
                Some(headers),
            )
            .await
            .map_err(|e| ProviderError::DatabaseError(e.to_string()))?;

        debug!(
            "Refreshed rating aggregate for provider {}: {} over {} reviews",
            provider_id, rating, review_count
        );

        Ok(())
    }
}
