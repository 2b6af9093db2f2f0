//! PostgREST table routes with a small subset of the filter grammar:
//! `eq`, `neq`, `in` and `is.null`, all compared as text.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{pg_error, AppState};

/// Query parameters that shape the response instead of filtering rows.
const RESERVED: &[&str] = &["select", "order", "limit", "offset"];

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    Eq(String, String),
    Neq(String, String),
    In(String, Vec<String>),
    IsNull(String),
}

impl Filter {
    fn parse(column: &str, expr: &str) -> Result<Self, String> {
        let (op, value) = expr
            .split_once('.')
            .ok_or_else(|| format!("failed to parse filter ({expr})"))?;
        let column = column.to_string();
        match op {
            "eq" => Ok(Filter::Eq(column, value.to_string())),
            "neq" => Ok(Filter::Neq(column, value.to_string())),
            "in" => {
                let list = value
                    .strip_prefix('(')
                    .and_then(|v| v.strip_suffix(')'))
                    .ok_or_else(|| format!("failed to parse filter ({expr})"))?;
                Ok(Filter::In(
                    column,
                    list.split(',').map(|s| s.trim().to_string()).collect(),
                ))
            }
            "is" if value == "null" => Ok(Filter::IsNull(column)),
            _ => Err(format!("\"{op}\" is not a supported operator")),
        }
    }

    fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::Eq(col, v) => text(row.get(col)).as_deref() == Some(v.as_str()),
            Filter::Neq(col, v) => text(row.get(col)).as_deref() != Some(v.as_str()),
            Filter::In(col, vs) => text(row.get(col)).is_some_and(|t| vs.contains(&t)),
            Filter::IsNull(col) => row.get(col).is_none_or(Value::is_null),
        }
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_filters(params: &[(String, String)]) -> Result<Vec<Filter>, Response> {
    params
        .iter()
        .filter(|(k, _)| !RESERVED.contains(&k.as_str()))
        .map(|(k, v)| Filter::parse(k, v))
        .collect::<Result<_, _>>()
        .map_err(|message| pg_error(StatusCode::BAD_REQUEST, "PGRST100", &message))
}

fn matching(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(row))
}

pub(crate) async fn select_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let filters = match parse_filters(&params) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let tables = state.inner.tables.read().await;
    let rows: Vec<Value> = tables
        .get(&table)
        .map(|rows| rows.iter().filter(|r| matching(r, &filters)).cloned().collect())
        .unwrap_or_default();
    Json(rows).into_response()
}

pub(crate) async fn insert_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(input): Json<Value>,
) -> Response {
    let records = match input {
        Value::Object(obj) => vec![obj],
        Value::Array(items) => {
            let mut objs = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(obj) => objs.push(obj),
                    _ => {
                        return pg_error(StatusCode::BAD_REQUEST, "PGRST102", "All object keys must match")
                    }
                }
            }
            objs
        }
        _ => return pg_error(StatusCode::BAD_REQUEST, "PGRST102", "Empty or invalid json"),
    };

    let mut tables = state.inner.tables.write().await;
    let rows = tables.entry(table).or_default();
    let mut created = Vec::with_capacity(records.len());
    for mut record in records {
        record
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        let id = text(record.get("id"));
        if rows.iter().any(|r| text(r.get("id")) == id) {
            return pg_error(
                StatusCode::CONFLICT,
                "23505",
                "duplicate key value violates unique constraint",
            );
        }
        let row = Value::Object(record);
        rows.push(row.clone());
        created.push(row);
    }
    (StatusCode::CREATED, Json(created)).into_response()
}

pub(crate) async fn update_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    Json(changes): Json<Map<String, Value>>,
) -> Response {
    let filters = match parse_filters(&params) {
        Ok(f) if f.is_empty() => {
            return pg_error(StatusCode::BAD_REQUEST, "21000", "UPDATE requires a WHERE clause")
        }
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let mut tables = state.inner.tables.write().await;
    let mut updated = Vec::new();
    if let Some(rows) = tables.get_mut(&table) {
        for row in rows.iter_mut().filter(|r| matching(r, &filters)) {
            if let Value::Object(obj) = &mut *row {
                obj.extend(changes.clone());
            }
            updated.push(row.clone());
        }
    }
    Json(updated).into_response()
}

pub(crate) async fn delete_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let filters = match parse_filters(&params) {
        Ok(f) if f.is_empty() => {
            return pg_error(StatusCode::BAD_REQUEST, "21000", "DELETE requires a WHERE clause")
        }
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let mut tables = state.inner.tables.write().await;
    let mut deleted = Vec::new();
    if let Some(rows) = tables.get_mut(&table) {
        let (gone, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|r| matching(r, &filters));
        *rows = kept;
        deleted = gone;
    }
    Json(deleted).into_response()
}
