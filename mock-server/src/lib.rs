//! Fixture HTTP server for integration tests.
//!
//! # Design
//! Small axum app with the endpoints the client tests exercise: `/json`
//! echoes the received request back as JSON and emits a duplicated `Foo`
//! header, `/ping` and `/sleep` cover trivial and slow responses,
//! `/redirect` hops to `/ping`, and everything else is a 404. The app holds
//! no state.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/json` reports back about the request it received.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
    pub query: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct SleepParams {
    s: Option<u64>,
}

pub fn app() -> Router {
    Router::new()
        .route("/json", any(json_echo))
        .route("/ping", get(ping))
        .route("/sleep", get(sleep_for))
        .route("/redirect", get(redirect_to_ping))
        .fallback(not_found)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn json_echo(
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let mut header_map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &headers {
        header_map
            .entry(name.as_str().to_string())
            .or_default()
            .push(value.to_str().unwrap_or_default().to_string());
    }

    let echo = Echo {
        method: method.to_string(),
        uri: uri.to_string(),
        headers: header_map,
        body: String::from_utf8_lossy(&body).into_owned(),
        query,
    };

    (AppendHeaders([("Foo", "Bar"), ("Foo", "baZ")]), Json(echo))
}

async fn ping() -> &'static str {
    "pong"
}

async fn sleep_for(Query(params): Query<SleepParams>) -> String {
    let seconds = params.s.unwrap_or(1);
    tokio::time::sleep(Duration::from_secs(seconds)).await;
    format!("Slept for {seconds} seconds")
}

async fn redirect_to_ping() -> Redirect {
    Redirect::temporary("/ping")
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Endpoint not found")
}
