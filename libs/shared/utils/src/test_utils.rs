use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};

use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub data_api_url: String,
    pub data_api_key: String,
    pub report_renderer_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            data_api_url: "http://localhost:54321".to_string(),
            data_api_key: "test-api-key".to_string(),
            report_renderer_url: "http://localhost:9797".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing the data API at a mock server.
    pub fn with_data_api(url: &str) -> Self {
        Self {
            data_api_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            data_api_url: self.data_api_url.clone(),
            data_api_key: self.data_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            report_renderer_url: self.report_renderer_url.clone(),
            port: 3000,
        }
    }

    pub fn to_state(&self) -> Arc<AppState> {
        AppState::shared(self.to_app_config())
    }
}

pub struct TestUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            role: Role::Client,
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            role,
        }
    }

    pub fn client(email: &str) -> Self {
        Self::new(email, Role::Client)
    }

    pub fn professional(email: &str) -> Self {
        Self::new(email, Role::Professional)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Role::Admin)
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            user_id: self.user_id,
            email: Some(self.email.clone()),
            role: self.role,
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
            "sub": user.user_id.to_string(),
            "email": user.email,
            "role": user.role.as_str(),
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

/// Row payloads in the shape the data API returns, for wiremock fixtures.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn user_row(user_id: Uuid, role: Role) -> serde_json::Value {
        json!({
            "id": user_id,
            "role": role.as_str()
        })
    }

    pub fn professional_row(professional_id: Uuid, owner_id: Uuid) -> serde_json::Value {
        Self::professional_row_in(professional_id, owner_id, "UTC")
    }

    pub fn professional_row_in(
        professional_id: Uuid,
        owner_id: Uuid,
        timezone: &str,
    ) -> serde_json::Value {
        json!({
            "id": professional_id,
            "user_id": owner_id,
            "display_name": "Mara Duarte",
            "timezone": timezone,
            "services_offered": ["TATTOO_SMALL", "TATTOO_MEDIUM", "PIERCING_BASIC"],
            "created_at": "2026-01-01T00:00:00Z"
        })
    }

    pub fn availability_window_row(
        window_id: Uuid,
        professional_id: Uuid,
        day_of_week: i16,
        start_time: &str,
        end_time: &str,
    ) -> serde_json::Value {
        json!({
            "id": window_id,
            "professional_id": professional_id,
            "day_of_week": day_of_week,
            "start_time": start_time,
            "end_time": end_time,
            "created_at": "2026-01-01T00:00:00Z"
        })
    }

    pub fn appointment_row(
        appointment_id: Uuid,
        professional_id: Uuid,
        client_id: Uuid,
        start_at: &str,
        end_at: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "service_type": "TATTOO_SMALL",
            "description": "fine-line fern on the forearm",
            "start_at": start_at,
            "end_at": end_at,
            "price": "80.00",
            "status": status,
            "professional_id": professional_id,
            "client_id": client_id,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}
