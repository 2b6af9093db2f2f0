//! Records exchanged with the auth sub-API.
//!
//! # Design
//! Only the fields this layer needs are typed. Unknown fields in remote
//! payloads are ignored so additions on the server side do not break
//! parsing. The login payload is the exception: it is handed back whole,
//! so its untyped fields are kept in `AuthResponse::extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Minimal identity record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
}

/// Token payload returned by a successful password login.
///
/// Only `access_token` and `user` are required. Fields the server adds
/// beyond the typed ones (`provider_token`, `weak_password`, ...) land in
/// `extra` and serialize back out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub refresh_token: String,
    pub user: User,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of the sign-up and login requests.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Error payload of the auth sub-API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthErrorBody {
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ignores_extra_fields() {
        let user: User = serde_json::from_str(
            r#"{"id":"8d3f6c1e-4b7a-4f57-9a40-2f1c9f0b6a11","email":"a@b.com","aud":"authenticated","role":"authenticated"}"#,
        )
        .unwrap();
        assert_eq!(user.email, "a@b.com");
    }

    #[test]
    fn auth_response_parses_supabase_token_payload() {
        let body = r#"{
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1760000000,
            "refresh_token": "refresh",
            "user": {"id": "8d3f6c1e-4b7a-4f57-9a40-2f1c9f0b6a11", "email": "a@b.com"}
        }"#;
        let auth: AuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(auth.token_type, "bearer");
        assert_eq!(auth.expires_at, Some(1_760_000_000));
        assert_eq!(auth.user.email, "a@b.com");
        assert!(auth.extra.is_empty());
    }

    #[test]
    fn auth_response_keeps_untyped_fields_when_serialized_back() {
        let body = serde_json::json!({
            "access_token": "jwt",
            "user": {"id": "8d3f6c1e-4b7a-4f57-9a40-2f1c9f0b6a11", "email": "a@b.com"},
            "provider_token": "gh-token"
        });
        let auth: AuthResponse = serde_json::from_value(body).unwrap();
        let back = serde_json::to_value(&auth).unwrap();
        assert_eq!(back["provider_token"], "gh-token");
        assert_eq!(back["access_token"], "jwt");
    }

    #[test]
    fn credentials_serialize_as_email_and_password() {
        let body = serde_json::to_value(Credentials {
            email: "a@b.com",
            password: "hunter2",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.com", "password": "hunter2"}));
    }
}
