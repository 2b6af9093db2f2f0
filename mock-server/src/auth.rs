//! Password auth routes shaped like GoTrue's.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::{auth_error, AppState};

const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct MockUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub confirmed: bool,
    pub user_metadata: Map<String, Value>,
}

impl MockUser {
    fn to_json(&self) -> Value {
        let confirmed_at = if self.confirmed {
            json!("2026-01-01T00:00:00Z")
        } else {
            Value::Null
        };
        json!({
            "id": self.id,
            "aud": "authenticated",
            "role": "authenticated",
            "email": self.email,
            "email_confirmed_at": confirmed_at,
            "user_metadata": self.user_metadata,
        })
    }
}

#[derive(Deserialize)]
pub(crate) struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub(crate) async fn sign_up(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> Response {
    if input.email.is_empty() || !input.email.contains('@') {
        return auth_error(
            StatusCode::BAD_REQUEST,
            "validation_failed",
            "Unable to validate email address: invalid format",
        );
    }
    if input.password.len() < MIN_PASSWORD_LEN {
        return auth_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "weak_password",
            "Password should be at least 6 characters.",
        );
    }

    let mut users = state.inner.users.write().await;
    if users.values().any(|u| u.email.eq_ignore_ascii_case(&input.email)) {
        return auth_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "user_already_exists",
            "User already registered",
        );
    }
    let user = MockUser {
        id: Uuid::new_v4(),
        email: input.email.to_lowercase(),
        password: input.password,
        confirmed: state.inner.auto_confirm,
        user_metadata: Map::new(),
    };
    let body = user.to_json();
    users.insert(user.id, user);
    Json(body).into_response()
}

pub(crate) async fn token(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(input): Json<Credentials>,
) -> Response {
    if params.get("grant_type").map(String::as_str) != Some("password") {
        return auth_error(
            StatusCode::BAD_REQUEST,
            "validation_failed",
            "unsupported_grant_type",
        );
    }

    let users = state.inner.users.read().await;
    let user = users
        .values()
        .find(|u| u.email.eq_ignore_ascii_case(&input.email) && u.password == input.password);
    let Some(user) = user else {
        return auth_error(
            StatusCode::BAD_REQUEST,
            "invalid_credentials",
            "Invalid login credentials",
        );
    };
    if !user.confirmed {
        return auth_error(
            StatusCode::BAD_REQUEST,
            "email_not_confirmed",
            "Email not confirmed",
        );
    }

    Json(json!({
        "access_token": format!("mock-access-{}", Uuid::new_v4()),
        "token_type": "bearer",
        "expires_in": TOKEN_TTL_SECS,
        "refresh_token": format!("mock-refresh-{}", Uuid::new_v4()),
        "user": user.to_json(),
    }))
    .into_response()
}

pub(crate) async fn admin_update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(changes): Json<Map<String, Value>>,
) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if bearer != Some(state.inner.service_key.as_str()) {
        return auth_error(StatusCode::FORBIDDEN, "not_admin", "User not allowed");
    }

    if let Some(field) = changes.iter().find(|(k, v)| !is_updatable(k, v)).map(|(k, _)| k) {
        return auth_error(
            StatusCode::BAD_REQUEST,
            "validation_failed",
            &format!("unsupported attribute: {field}"),
        );
    }

    let mut users = state.inner.users.write().await;
    let Some(user) = users.get_mut(&id) else {
        return auth_error(StatusCode::NOT_FOUND, "user_not_found", "User not found");
    };
    for (field, value) in changes {
        match (field.as_str(), value) {
            ("email", Value::String(email)) => user.email = email.to_lowercase(),
            ("password", Value::String(password)) => user.password = password,
            ("email_confirm", Value::Bool(confirm)) => user.confirmed |= confirm,
            ("user_metadata", Value::Object(meta)) => user.user_metadata.extend(meta),
            _ => {}
        }
    }
    Json(user.to_json()).into_response()
}

fn is_updatable(field: &str, value: &Value) -> bool {
    matches!(
        (field, value),
        ("email", Value::String(_))
            | ("password", Value::String(_))
            | ("email_confirm", Value::Bool(_))
            | ("user_metadata", Value::Object(_))
    )
}
