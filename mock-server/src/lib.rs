//! In-memory stand-in for a Supabase project.
//!
//! Emulates the three sub-APIs the client talks to, closely enough for
//! integration tests: PostgREST tables under `/rest/v1`, object storage
//! under `/storage/v1/object`, and password auth under `/auth/v1`. Every
//! route sits behind an `apikey` gate accepting the anon or service key.

mod auth;
mod rest;
mod storage;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use auth::MockUser;
pub use storage::StoredObject;

pub const DEFAULT_ANON_KEY: &str = "anon-key";
pub const DEFAULT_SERVICE_KEY: &str = "service-key";

/// Shared state of one mock project. Cloning shares the same data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    anon_key: String,
    service_key: String,
    auto_confirm: bool,
    tables: RwLock<HashMap<String, Vec<Value>>>,
    objects: RwLock<HashMap<String, StoredObject>>,
    users: RwLock<HashMap<Uuid, MockUser>>,
}

impl AppState {
    pub fn new(anon_key: &str, service_key: &str) -> Self {
        Self::build(anon_key, service_key, true)
    }

    /// Like `new`, but users start unconfirmed and cannot log in until an
    /// admin update sets `email_confirm`.
    pub fn requiring_confirmation(anon_key: &str, service_key: &str) -> Self {
        Self::build(anon_key, service_key, false)
    }

    fn build(anon_key: &str, service_key: &str, auto_confirm: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                anon_key: anon_key.to_string(),
                service_key: service_key.to_string(),
                auto_confirm,
                tables: RwLock::new(HashMap::new()),
                objects: RwLock::new(HashMap::new()),
                users: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.inner.tables.read().await.get(table).cloned().unwrap_or_default()
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.inner.objects.read().await.get(key).cloned()
    }

    pub async fn user(&self, id: Uuid) -> Option<MockUser> {
        self.inner.users.read().await.get(&id).cloned()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_ANON_KEY, DEFAULT_SERVICE_KEY)
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/rest/v1/{table}",
            get(rest::select_rows)
                .post(rest::insert_rows)
                .patch(rest::update_rows)
                .delete(rest::delete_rows),
        )
        .route(
            "/storage/v1/object/{bucket}/{*path}",
            post(storage::upload_object).get(storage::download_object),
        )
        .route("/auth/v1/signup", post(auth::sign_up))
        .route("/auth/v1/token", post(auth::token))
        .route("/auth/v1/admin/users/{id}", put(auth::admin_update_user))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if key != state.inner.anon_key && key != state.inner.service_key {
        tracing::debug!(uri = %request.uri(), "rejecting request without a valid apikey");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key"})),
        )
            .into_response();
    }
    next.run(request).await
}

/// PostgREST-shaped error body.
fn pg_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({"code": code, "details": null, "hint": null, "message": message})),
    )
        .into_response()
}

/// GoTrue-shaped error body.
fn auth_error(status: StatusCode, error_code: &str, msg: &str) -> Response {
    (
        status,
        Json(json!({"code": status.as_u16(), "error_code": error_code, "msg": msg})),
    )
        .into_response()
}
