use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreateProviderRequest, CreateServiceRequest, Provider, ProviderSearchFilters,
    ServiceOffering, UpdateProviderRequest,
};

pub struct ProviderService {
    supabase: SupabaseClient,
}

impl ProviderService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Search active providers, most highly rated first.
    pub async fn search_providers(&self, filters: ProviderSearchFilters) -> Result<Vec<Provider>> {
        debug!("Searching providers with filters: {:?}", filters);

        let mut query_parts = vec!["is_active=eq.true".to_string()];

        if let Some(ref category) = filters.category {
            query_parts.push(format!("category=eq.{}", category));
        }
        if let Some(min_rating) = filters.min_rating {
            query_parts.push(format!("rating=gte.{}", min_rating));
        }

        query_parts.push("order=rating.desc".to_string());
        query_parts.push(format!("limit={}", filters.limit.unwrap_or(50)));
        query_parts.push(format!("offset={}", filters.offset.unwrap_or(0)));

        let path = format!("/rest/v1/providers?{}", query_parts.join("&"));
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let providers: Vec<Provider> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Provider>, _>>()?;

        Ok(providers)
    }

    pub async fn get_provider(&self, provider_id: &str) -> Result<Provider> {
        debug!("Fetching provider: {}", provider_id);

        let path = format!("/rest/v1/providers?id=eq.{}", provider_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(anyhow!("Provider not found"));
        }

        let provider: Provider = serde_json::from_value(result[0].clone())?;
        Ok(provider)
    }

    /// List a provider's active service catalog.
    pub async fn list_services(&self, provider_id: &str) -> Result<Vec<ServiceOffering>> {
        debug!("Listing services for provider: {}", provider_id);

        let path = format!(
            "/rest/v1/provider_services?provider_id=eq.{}&is_active=eq.true&order=name.asc",
            provider_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let services: Vec<ServiceOffering> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<ServiceOffering>, _>>()?;

        Ok(services)
    }

    pub async fn get_service(&self, provider_id: &str, service_id: &str) -> Result<ServiceOffering> {
        let path = format!(
            "/rest/v1/provider_services?id=eq.{}&provider_id=eq.{}",
            service_id, provider_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(anyhow!("Service not found"));
        }

        let service: ServiceOffering = serde_json::from_value(result[0].clone())?;
        Ok(service)
    }

    pub async fn create_provider(
        &self,
        request: CreateProviderRequest,
        auth_token: &str,
    ) -> Result<Provider> {
        debug!("Creating provider: {}", request.name);

        let provider_data = json!({
            "name": request.name,
            "email": request.email,
            "category": request.category,
            "bio": request.bio,
            "phone": request.phone,
            "working_hours": request.working_hours,
            "rating": 0.0,
            "review_count": 0,
            "is_active": true,
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
                "/rest/v1/providers",
                Some(auth_token),
                Some(provider_data),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to create provider"));
        }

        let provider: Provider = serde_json::from_value(result[0].clone())?;
        debug!("Provider created with ID: {}", provider.id);

        Ok(provider)
    }

    pub async fn update_provider(
        &self,
        provider_id: &str,
        request: UpdateProviderRequest,
        auth_token: &str,
    ) -> Result<Provider> {
        debug!("Updating provider: {}", provider_id);

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(category) = request.category {
            update_data.insert("category".to_string(), json!(category));
        }
        if let Some(bio) = request.bio {
            update_data.insert("bio".to_string(), json!(bio));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(working_hours) = request.working_hours {
            update_data.insert("working_hours".to_string(), json!(working_hours));
        }
        if let Some(is_active) = request.is_active {
            update_data.insert("is_active".to_string(), json!(is_active));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/providers?id=eq.{}", provider_id);
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
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to update provider"));
        }

        let updated_provider: Provider = serde_json::from_value(result[0].clone())?;
        Ok(updated_provider)
    }

    pub async fn create_service(
        &self,
        provider_id: &str,
        request: CreateServiceRequest,
        auth_token: &str,
    ) -> Result<ServiceOffering> {
        debug!("Creating service for provider: {}", provider_id);

        if request.duration_minutes <= 0 {
            return Err(anyhow!("Service duration must be positive"));
        }

        let service_data = json!({
            "provider_id": provider_id,
            "name": request.name,
            "description": request.description,
            "duration_minutes": request.duration_minutes,
            "price": request.price,
            "is_active": true,
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
                "/rest/v1/provider_services",
                Some(auth_token),
                Some(service_data),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to create service"));
        }

        let service: ServiceOffering = serde_json::from_value(result[0].clone())?;
        Ok(service)
    }
}
