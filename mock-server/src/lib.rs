use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Widget {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct WidgetInput {
    pub name: String,
}

pub type Db = Arc<RwLock<HashMap<String, Widget>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/widgets", post(create_widget))
        .route(
            "/widgets/{id}",
            get(get_widget).put(put_widget).delete(delete_widget),
        )
        .route("/echo", post(echo).put(echo))
        .route("/multi", get(multi))
        .route("/big/{mib}", get(big))
        .route("/status/{code}", get(status).post(status).put(status).delete(status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn create_widget(
    State(db): State<Db>,
    Json(input): Json<WidgetInput>,
) -> (StatusCode, Json<Widget>) {
    let widget = Widget {
        id: Uuid::new_v4().to_string(),
        name: input.name,
    };
    db.write().await.insert(widget.id.clone(), widget.clone());
    (StatusCode::CREATED, Json(widget))
}

async fn get_widget(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Widget>, StatusCode> {
    let widgets = db.read().await;
    widgets.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Create or replace the widget stored under `id`.
async fn put_widget(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<WidgetInput>,
) -> Json<Widget> {
    let widget = Widget {
        id: id.clone(),
        name: input.name,
    };
    db.write().await.insert(id, widget.clone());
    Json(widget)
}

async fn delete_widget(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut widgets = db.write().await;
    widgets.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

/// Answer with the request body and the request's content type.
async fn echo(headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// Answer with two values for `X-A`.
async fn multi() -> Response {
    let mut headers = HeaderMap::new();
    headers.append("x-a", HeaderValue::from_static("v1"));
    headers.append("x-a", HeaderValue::from_static("v2"));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    (headers, "multi").into_response()
}

/// Answer with `mib` MiB of octet-stream, each byte its offset mod 251.
async fn big(Path(mib): Path<usize>) -> Response {
    let body: Vec<u8> = (0..mib * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))],
        body,
    )
        .into_response()
}

/// Answer with the status named in the path.
async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, status.canonical_reason().unwrap_or_default().to_string()).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}
