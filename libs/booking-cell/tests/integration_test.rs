use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::router::booking_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};

// A date far enough out that the past-slot filter never interferes
const FUTURE_DATE: &str = "2030-06-15";

async fn create_test_app(config: AppConfig) -> Router {
    booking_routes(Arc::new(config))
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn mount_provider(mock_server: &MockServer, provider_id: &str, provider: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/providers"))
        .and(query_param("id", format!("eq.{}", provider_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([provider])))
        .mount(mock_server)
        .await;
}

async fn mount_service(
    mock_server: &MockServer,
    provider_id: &str,
    service_id: &str,
    duration_minutes: i32,
) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/provider_services"))
        .and(query_param("id", format!("eq.{}", service_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::service_response(service_id, provider_id, "Haircut", duration_minutes)
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_day_bookings(mock_server: &MockServer, provider_id: &str, bookings: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("provider_id", format!("eq.{}", provider_id)))
        .and(query_param("booking_date", format!("eq.{}", FUTURE_DATE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(bookings))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_slots_endpoint_marks_conflicts() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();

    let provider_id = Uuid::new_v4().to_string();
    let service_id = Uuid::new_v4().to_string();

    mount_provider(
        &mock_server,
        &provider_id,
        MockStoreResponses::provider_with_hours_response(
            &provider_id,
            "Corner Salon",
            Some("09:00"),
            Some("11:00"),
        ),
    )
    .await;
    mount_service(&mock_server, &provider_id, &service_id, 60).await;
    mount_day_bookings(
        &mock_server,
        &provider_id,
        json!([MockStoreResponses::booking_response(
            &Uuid::new_v4().to_string(),
            &provider_id,
            &service_id,
            &Uuid::new_v4().to_string(),
            FUTURE_DATE,
            "09:00",
            60,
        )]),
    )
    .await;

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/availability/{}?date={}&service_id={}",
                    provider_id, FUTURE_DATE, service_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let slots = body["slots"].as_array().expect("slots array");
    assert_eq!(slots.len(), 2);

    assert_eq!(slots[0]["start_time"], "09:00");
    assert_eq!(slots[0]["end_time"], "10:00");
    assert_eq!(slots[0]["display_time"], "9:00 AM");
    assert_eq!(slots[0]["is_available"], false);

    assert_eq!(slots[1]["start_time"], "10:00");
    assert_eq!(slots[1]["is_available"], true);

    assert_eq!(body["total_slots"], 2);
}

#[tokio::test]
async fn test_slots_endpoint_uses_default_hours() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();

    let provider_id = Uuid::new_v4().to_string();
    let service_id = Uuid::new_v4().to_string();

    // No custom working hours on the provider record
    mount_provider(
        &mock_server,
        &provider_id,
        MockStoreResponses::provider_response(&provider_id, "Corner Salon", "salon"),
    )
    .await;
    mount_service(&mock_server, &provider_id, &service_id, 60).await;
    mount_day_bookings(&mock_server, &provider_id, json!([])).await;

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/availability/{}?date={}&service_id={}",
                    provider_id, FUTURE_DATE, service_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // 09:00 to 17:00 fits eight hour-long slots
    let body = read_json(response).await;
    let slots = body["slots"].as_array().expect("slots array");
    assert_eq!(slots.len(), 8);
    assert_eq!(slots[0]["start_time"], "09:00");
    assert_eq!(slots[7]["start_time"], "16:00");
    assert!(slots.iter().all(|s| s["is_available"] == true));
}

#[tokio::test]
async fn test_slots_endpoint_merges_partial_custom_hours() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();

    let provider_id = Uuid::new_v4().to_string();
    let service_id = Uuid::new_v4().to_string();

    // Custom start only; end falls back to the 17:00 default
    mount_provider(
        &mock_server,
        &provider_id,
        MockStoreResponses::provider_with_hours_response(
            &provider_id,
            "Late Riser Barbers",
            Some("14:00"),
            None,
        ),
    )
    .await;
    mount_service(&mock_server, &provider_id, &service_id, 60).await;
    mount_day_bookings(&mock_server, &provider_id, json!([])).await;

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/availability/{}?date={}&service_id={}",
                    provider_id, FUTURE_DATE, service_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let slots = body["slots"].as_array().expect("slots array");
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0]["start_time"], "14:00");
    assert_eq!(slots[2]["start_time"], "16:00");
}

#[tokio::test]
async fn test_slots_endpoint_unknown_provider_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();

    let provider_id = Uuid::new_v4().to_string();
    let service_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/availability/{}?date={}&service_id={}",
                    provider_id, FUTURE_DATE, service_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_booking_succeeds() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_store_url(&mock_server.uri());
    let config = test_config.to_app_config();

    let provider_id = Uuid::new_v4().to_string();
    let service_id = Uuid::new_v4().to_string();
    let customer = TestUser::customer("customer@example.com");
    let token = JwtTestUtils::create_test_token(&customer, &test_config.jwt_secret, Some(1));

    mount_provider(
        &mock_server,
        &provider_id,
        MockStoreResponses::provider_response(&provider_id, "Corner Salon", "salon"),
    )
    .await;
    mount_service(&mock_server, &provider_id, &service_id, 60).await;
    mount_day_bookings(&mock_server, &provider_id, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::booking_response(
                &Uuid::new_v4().to_string(),
                &provider_id,
                &service_id,
                &customer.id,
                FUTURE_DATE,
                "10:00",
                60,
            )
        ])))
        .mount(&mock_server)
        .await;

    let request_body = json!({
        "provider_id": provider_id,
        "service_id": service_id,
        "booking_date": FUTURE_DATE,
        "scheduled_time": "10:00",
        "notes": null
    });

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["customer_id"], customer.id);
    assert_eq!(body["scheduled_time"], "10:00");
    assert_eq!(body["status"], "confirmed");
}

#[tokio::test]
async fn test_create_booking_conflict_is_rejected() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_store_url(&mock_server.uri());
    let config = test_config.to_app_config();

    let provider_id = Uuid::new_v4().to_string();
    let service_id = Uuid::new_v4().to_string();
    let customer = TestUser::customer("customer@example.com");
    let token = JwtTestUtils::create_test_token(&customer, &test_config.jwt_secret, Some(1));

    mount_provider(
        &mock_server,
        &provider_id,
        MockStoreResponses::provider_response(&provider_id, "Corner Salon", "salon"),
    )
    .await;
    mount_service(&mock_server, &provider_id, &service_id, 60).await;
    // 09:30 plus the default hour covers the requested 10:00 start
    mount_day_bookings(
        &mock_server,
        &provider_id,
        json!([MockStoreResponses::booking_response(
            &Uuid::new_v4().to_string(),
            &provider_id,
            &service_id,
            &Uuid::new_v4().to_string(),
            FUTURE_DATE,
            "09:30",
            60,
        )]),
    )
    .await;

    let request_body = json!({
        "provider_id": provider_id,
        "service_id": service_id,
        "booking_date": FUTURE_DATE,
        "scheduled_time": "10:00"
    });

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_booking_outside_hours_is_rejected() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_store_url(&mock_server.uri());
    let config = test_config.to_app_config();

    let provider_id = Uuid::new_v4().to_string();
    let service_id = Uuid::new_v4().to_string();
    let customer = TestUser::customer("customer@example.com");
    let token = JwtTestUtils::create_test_token(&customer, &test_config.jwt_secret, Some(1));

    mount_provider(
        &mock_server,
        &provider_id,
        MockStoreResponses::provider_response(&provider_id, "Corner Salon", "salon"),
    )
    .await;
    mount_service(&mock_server, &provider_id, &service_id, 60).await;

    // 16:30 + 60 minutes overruns the 17:00 default close
    let request_body = json!({
        "provider_id": provider_id,
        "service_id": service_id,
        "booking_date": FUTURE_DATE,
        "scheduled_time": "16:30"
    });

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_booking_requires_authentication() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();

    let request_body = json!({
        "provider_id": Uuid::new_v4(),
        "service_id": Uuid::new_v4(),
        "booking_date": FUTURE_DATE,
        "scheduled_time": "10:00"
    });

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Content-Type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_my_bookings() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_store_url(&mock_server.uri());
    let config = test_config.to_app_config();

    let customer = TestUser::customer("customer@example.com");
    let token = JwtTestUtils::create_test_token(&customer, &test_config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("customer_id", format!("eq.{}", customer.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::booking_response(
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(),
                &customer.id,
                FUTURE_DATE,
                "10:00",
                60,
            )
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["bookings"][0]["customer_id"], customer.id);
}

#[tokio::test]
async fn test_cancel_booking_succeeds() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_store_url(&mock_server.uri());
    let config = test_config.to_app_config();

    let customer = TestUser::customer("customer@example.com");
    let token = JwtTestUtils::create_test_token(&customer, &test_config.jwt_secret, Some(1));

    let booking_id = Uuid::new_v4().to_string();
    let booking = MockStoreResponses::booking_response(
        &booking_id,
        &Uuid::new_v4().to_string(),
        &Uuid::new_v4().to_string(),
        &customer.id,
        FUTURE_DATE,
        "10:00",
        60,
    );
    let mut cancelled = booking.clone();
    cancelled["status"] = json!("cancelled");

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([booking])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cancelled])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/{}/cancel", booking_id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["id"], booking_id);
}

#[tokio::test]
async fn test_cancel_booking_owned_by_someone_else_is_rejected() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_store_url(&mock_server.uri());
    let config = test_config.to_app_config();

    let customer = TestUser::customer("customer@example.com");
    let token = JwtTestUtils::create_test_token(&customer, &test_config.jwt_secret, Some(1));

    let booking_id = Uuid::new_v4().to_string();
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::booking_response(
                &booking_id,
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(), // someone else's booking
                FUTURE_DATE,
                "10:00",
                60,
            )
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/{}/cancel", booking_id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cancel_booking_twice_is_a_conflict() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_store_url(&mock_server.uri());
    let config = test_config.to_app_config();

    let customer = TestUser::customer("customer@example.com");
    let token = JwtTestUtils::create_test_token(&customer, &test_config.jwt_secret, Some(1));

    let booking_id = Uuid::new_v4().to_string();
    let mut cancelled = MockStoreResponses::booking_response(
        &booking_id,
        &Uuid::new_v4().to_string(),
        &Uuid::new_v4().to_string(),
        &customer.id,
        FUTURE_DATE,
        "10:00",
        60,
    );
    cancelled["status"] = json!("cancelled");

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cancelled])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/{}/cancel", booking_id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
