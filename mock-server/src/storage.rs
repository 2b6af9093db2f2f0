//! Object storage routes. Objects are keyed by `<bucket>/<path>`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub id: Uuid,
    pub content_type: String,
    pub data: Vec<u8>,
}

fn storage_error(status: StatusCode, code: &str, error: &str, message: &str) -> Response {
    (
        status,
        Json(json!({"statusCode": code, "error": error, "message": message})),
    )
        .into_response()
}

pub(crate) async fn upload_object(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key = format!("{bucket}/{path}");
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let upsert = headers
        .get("x-upsert")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    let mut objects = state.inner.objects.write().await;
    if objects.contains_key(&key) && !upsert {
        return storage_error(
            StatusCode::BAD_REQUEST,
            "409",
            "Duplicate",
            "The resource already exists",
        );
    }
    let id = Uuid::new_v4();
    tracing::debug!(%key, %content_type, bytes = body.len(), "stored object");
    objects.insert(
        key.clone(),
        StoredObject {
            id,
            content_type,
            data: body.to_vec(),
        },
    );
    Json(json!({"Key": key, "Id": id})).into_response()
}

pub(crate) async fn download_object(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Response {
    let key = format!("{bucket}/{path}");
    match state.inner.objects.read().await.get(&key) {
        Some(object) => (
            [(header::CONTENT_TYPE, object.content_type.clone())],
            object.data.clone(),
        )
            .into_response(),
        None => storage_error(StatusCode::BAD_REQUEST, "404", "not_found", "Object not found"),
    }
}
