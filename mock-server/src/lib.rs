use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    /// RFC 3339 with millisecond precision.
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    let items = Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route_layer(middleware::from_fn(require_odata_version))
        .with_state(db);

    Router::new()
        .merge(items)
        .route("/echo", any(echo))
        .route("/status/{code}", get(status))
        .route("/broken", get(broken))
        .route("/malformed", get(malformed))
        .route("/redirect", get(redirect))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// An OData error body: `{"error": {"code": ..., "message": ...}}`.
pub fn odata_error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": { "code": code, "message": message } }))).into_response()
}

fn not_found() -> Response {
    odata_error(StatusCode::NOT_FOUND, "NotFound", "Not Found")
}

async fn require_odata_version(request: Request, next: Next) -> Response {
    let version = request
        .headers()
        .get("odata-version")
        .and_then(|v| v.to_str().ok());
    if version != Some("4.0") {
        debug!(?version, "rejecting request without OData-Version 4.0");
        return odata_error(
            StatusCode::BAD_REQUEST,
            "UnsupportedVersion",
            "OData-Version 4.0 is required",
        );
    }
    next.run(request).await
}

async fn list_items(State(db): State<Db>) -> Json<Value> {
    let items = db.read().await;
    let value: Vec<&Item> = items.values().collect();
    Json(json!({ "value": value }))
}

async fn create_item(State(db): State<Db>, Json(input): Json<CreateItem>) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    db.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Response {
    let items = db.read().await;
    match items.get(&id) {
        Some(item) => Json(item.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateItem>,
) -> Response {
    let mut items = db.write().await;
    let Some(item) = items.get_mut(&id) else {
        return not_found();
    };
    if let Some(name) = input.name {
        item.name = name;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Response {
    let mut items = db.write().await;
    match items.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

/// Reflect the method, headers (lowercase names) and body of the request.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let mut reflected = Map::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        reflected.insert(name.as_str().to_string(), Value::String(value));
    }
    let body = if body.is_empty() { Value::Null } else { Value::String(body) };
    Json(json!({
        "method": method.as_str(),
        "headers": reflected,
        "body": body,
    }))
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) if (200..=599).contains(&code) => {
            odata_error(status, "Status", &format!("Status {code}"))
        }
        _ => odata_error(StatusCode::BAD_REQUEST, "BadStatus", "invalid status code"),
    }
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "not json")
}

/// A 200 whose JSON body is cut off mid-object.
async fn malformed() -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], r#"{"id":"#).into_response()
}

async fn redirect() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/items")]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_with_camel_case() {
        let item = Item {
            id: Uuid::nil(),
            name: "Widget".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Widget");
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn create_item_rejects_missing_name() {
        let result: Result<CreateItem, _> = serde_json::from_str(r#"{"title":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_item_all_fields_optional() {
        let input: UpdateItem = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_none());
    }

    #[test]
    fn created_at_has_millisecond_precision() {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.len(), "2024-01-01T00:00:00.000Z".len());
    }
}
