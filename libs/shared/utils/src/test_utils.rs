use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_store_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "customer".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn customer(email: &str) -> Self {
        Self::new(email, "customer")
    }

    pub fn provider(email: &str) -> Self {
        Self::new(email, "provider")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn provider_response(provider_id: &str, name: &str, category: &str) -> serde_json::Value {
        json!({
            "id": provider_id,
            "name": name,
            "email": "provider@example.com",
            "category": category,
            "bio": "A well reviewed local business",
            "phone": null,
            "working_hours": null,
            "rating": 4.5,
            "review_count": 12,
            "is_active": true,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn provider_with_hours_response(
        provider_id: &str,
        name: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> serde_json::Value {
        let mut provider = Self::provider_response(provider_id, name, "salon");
        provider["working_hours"] = json!({
            "start": start,
            "end": end
        });
        provider
    }

    pub fn service_response(
        service_id: &str,
        provider_id: &str,
        name: &str,
        duration_minutes: i32,
    ) -> serde_json::Value {
        json!({
            "id": service_id,
            "provider_id": provider_id,
            "name": name,
            "description": null,
            "duration_minutes": duration_minutes,
            "price": 45.0,
            "is_active": true,
            "created_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn booking_response(
        booking_id: &str,
        provider_id: &str,
        service_id: &str,
        customer_id: &str,
        booking_date: &str,
        scheduled_time: &str,
        duration_minutes: i32,
    ) -> serde_json::Value {
        json!({
            "id": booking_id,
            "provider_id": provider_id,
            "service_id": service_id,
            "customer_id": customer_id,
            "booking_date": booking_date,
            "scheduled_time": scheduled_time,
            "duration_minutes": duration_minutes,
            "status": "confirmed",
            "notes": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn review_response(
        review_id: &str,
        provider_id: &str,
        customer_id: &str,
        rating: i32,
    ) -> serde_json::Value {
        json!({
            "id": review_id,
            "provider_id": provider_id,
            "customer_id": customer_id,
            "rating": rating,
            "comment": "Great service",
            "created_at": "2025-01-01T00:00:00Z"
        })
    }
}
