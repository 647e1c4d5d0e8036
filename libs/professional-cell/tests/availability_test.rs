use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveTime;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use professional_cell::models::{CreateWindowRequest, UpdateWindowRequest};
use professional_cell::router::professional_routes;
use shared_utils::state::AppState;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};

const JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

fn create_test_app(state: Arc<AppState>) -> Router {
    professional_routes(state)
}

/// Mounts the professional lookup every calendar route starts with.
async fn mock_professional(mock_server: &MockServer, professional_id: Uuid, owner_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/professionals"))
        .and(query_param("id", format!("eq.{}", professional_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::professional_row(professional_id, owner_id)
        ])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_get_professional_profile() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let user = TestUser::client("browser@example.com");
    let token = JwtTestUtils::create_test_token(&user, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    mock_professional(&mock_server, professional_id, Uuid::new_v4()).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}", professional_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["professional"]["display_name"], "Mara Duarte");
    assert_eq!(json_response["professional"]["timezone"], "UTC");
}

#[tokio::test]
async fn test_list_windows_returns_calendar() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    // Any authenticated caller may browse a calendar, clients included.
    let user = TestUser::client("browser@example.com");
    let token = JwtTestUtils::create_test_token(&user, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("professional_id", format!("eq.{}", professional_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                Uuid::new_v4(),
                professional_id,
                1,
                "09:00:00",
                "12:00:00"
            ),
            MockStoreResponses::availability_window_row(
                Uuid::new_v4(),
                professional_id,
                3,
                "14:00:00",
                "18:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}/availability", professional_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["total"], 2);
    assert_eq!(json_response["windows"][0]["day_of_week"], 1);
}

#[tokio::test]
async fn test_list_windows_requires_token() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}/availability", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_tokens_are_unauthorized() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();

    let user = TestUser::professional("ink@example.com");
    let professional_id = Uuid::new_v4();

    let bad_tokens = vec![
        JwtTestUtils::create_expired_token(&user, JWT_SECRET),
        JwtTestUtils::create_invalid_signature_token(&user),
        JwtTestUtils::create_malformed_token(),
    ];

    for token in bad_tokens {
        let app = create_test_app(state.clone());
        let request = Request::builder()
            .method("GET")
            .uri(format!("/{}/availability", professional_id))
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "token should have been rejected"
        );
    }
}

#[tokio::test]
async fn test_create_window_success() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let owner = TestUser::professional("ink@example.com");
    let token = JwtTestUtils::create_test_token(&owner, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    let window_id = Uuid::new_v4();
    mock_professional(&mock_server, professional_id, owner.user_id).await;

    // Overlap check finds nothing else on Monday.
    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("professional_id", format!("eq.{}", professional_id)))
        .and(query_param("day_of_week", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/availability_windows"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                window_id,
                professional_id,
                1,
                "09:00:00",
                "12:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request_body = CreateWindowRequest {
        day_of_week: 1,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    };

    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/availability", professional_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["window"]["id"], window_id.to_string());
}

#[tokio::test]
async fn test_create_overlapping_window_conflicts() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let owner = TestUser::professional("ink@example.com");
    let token = JwtTestUtils::create_test_token(&owner, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    mock_professional(&mock_server, professional_id, owner.user_id).await;

    // Monday already holds 09:00-12:00.
    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("professional_id", format!("eq.{}", professional_id)))
        .and(query_param("day_of_week", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                Uuid::new_v4(),
                professional_id,
                1,
                "09:00:00",
                "12:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request_body = CreateWindowRequest {
        day_of_week: 1,
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
    };

    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/availability", professional_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["code"], "window_overlap");
}

#[tokio::test]
async fn test_create_touching_window_is_allowed() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let owner = TestUser::professional("ink@example.com");
    let token = JwtTestUtils::create_test_token(&owner, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    mock_professional(&mock_server, professional_id, owner.user_id).await;

    // Half-open windows: a new window starting exactly where an existing one
    // ends does not overlap it.
    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("professional_id", format!("eq.{}", professional_id)))
        .and(query_param("day_of_week", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                Uuid::new_v4(),
                professional_id,
                1,
                "09:00:00",
                "12:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/availability_windows"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                Uuid::new_v4(),
                professional_id,
                1,
                "12:00:00",
                "15:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request_body = CreateWindowRequest {
        day_of_week: 1,
        start_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
    };

    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/availability", professional_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_window_with_inverted_times_is_rejected() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let owner = TestUser::professional("ink@example.com");
    let token = JwtTestUtils::create_test_token(&owner, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    mock_professional(&mock_server, professional_id, owner.user_id).await;

    let request_body = CreateWindowRequest {
        day_of_week: 1,
        start_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    };

    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/availability", professional_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["code"], "invalid_window");
}

#[tokio::test]
async fn test_create_window_requires_ownership() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    // A professional, but not the one who owns this calendar.
    let intruder = TestUser::professional("other@example.com");
    let token = JwtTestUtils::create_test_token(&intruder, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    mock_professional(&mock_server, professional_id, Uuid::new_v4()).await;

    let request_body = CreateWindowRequest {
        day_of_week: 1,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    };

    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/availability", professional_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_may_manage_any_calendar() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    mock_professional(&mock_server, professional_id, Uuid::new_v4()).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("day_of_week", "eq.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/availability_windows"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                Uuid::new_v4(),
                professional_id,
                5,
                "10:00:00",
                "16:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request_body = CreateWindowRequest {
        day_of_week: 5,
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
    };

    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/availability", professional_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_window_reshapes_within_its_own_range() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let owner = TestUser::professional("ink@example.com");
    let token = JwtTestUtils::create_test_token(&owner, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    let window_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("id", format!("eq.{}", window_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                window_id,
                professional_id,
                1,
                "09:00:00",
                "12:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    mock_professional(&mock_server, professional_id, owner.user_id).await;

    // The collision check excludes the window's own row; only the touching
    // 12:00-15:00 sibling comes back.
    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("professional_id", format!("eq.{}", professional_id)))
        .and(query_param("day_of_week", "eq.1"))
        .and(query_param("id", format!("neq.{}", window_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                Uuid::new_v4(),
                professional_id,
                1,
                "12:00:00",
                "15:00:00"
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("id", format!("eq.{}", window_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                window_id,
                professional_id,
                1,
                "10:00:00",
                "12:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request_body = UpdateWindowRequest {
        start_time: Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
        end_time: Some(NaiveTime::from_hms_opt(12, 0, 0).unwrap()),
        ..Default::default()
    };

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/availability/{}", window_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["window"]["start_time"], "10:00:00");
}

#[tokio::test]
async fn test_update_window_onto_sibling_conflicts() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let owner = TestUser::professional("ink@example.com");
    let token = JwtTestUtils::create_test_token(&owner, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    let window_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("id", format!("eq.{}", window_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                window_id,
                professional_id,
                1,
                "09:00:00",
                "12:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    mock_professional(&mock_server, professional_id, owner.user_id).await;

    // Monday also holds 13:00-17:00.
    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("professional_id", format!("eq.{}", professional_id)))
        .and(query_param("day_of_week", "eq.1"))
        .and(query_param("id", format!("neq.{}", window_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                Uuid::new_v4(),
                professional_id,
                1,
                "13:00:00",
                "17:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request_body = UpdateWindowRequest {
        start_time: Some(NaiveTime::from_hms_opt(12, 0, 0).unwrap()),
        end_time: Some(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
        ..Default::default()
    };

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/availability/{}", window_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["code"], "window_overlap");
}

#[tokio::test]
async fn test_delete_window_by_owner() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let owner = TestUser::professional("ink@example.com");
    let token = JwtTestUtils::create_test_token(&owner, JWT_SECRET, Some(24));

    let professional_id = Uuid::new_v4();
    let window_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("id", format!("eq.{}", window_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::availability_window_row(
                window_id,
                professional_id,
                1,
                "09:00:00",
                "12:00:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    mock_professional(&mock_server, professional_id, owner.user_id).await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("id", format!("eq.{}", window_id)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/availability/{}", window_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["success"], true);
}

#[tokio::test]
async fn test_missing_window_is_not_found() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_data_api(&mock_server.uri()).to_state();
    let app = create_test_app(state);

    let owner = TestUser::professional("ink@example.com");
    let token = JwtTestUtils::create_test_token(&owner, JWT_SECRET, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/availability/{}", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["code"], "not_found");
}
