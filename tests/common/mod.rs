//! An in-process stand-in for the backend.

#![allow(dead_code)]

use std::{net::TcpListener, sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderMap, StatusCode, Uri},
    routing::{any, MethodRouter},
    Json, Router,
};
use gatehouse::{api::StatusHook, model::Database, AppState, Config};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct Hit {
    pub path: String,
    pub authorization: Option<String>,
    pub cookie: Option<String>,
    pub body: Value,
}

/// Every request the backend received, in arrival order.
#[derive(Clone, Default)]
pub struct Seen(Arc<Mutex<Vec<Hit>>>);

impl Seen {
    pub fn record(&self, uri: &Uri, headers: &HeaderMap, body: &str) {
        let get = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(String::from)
        };
        self.0.lock().push(Hit {
            path: uri.path().to_string(),
            authorization: get(header::AUTHORIZATION),
            cookie: get(header::COOKIE),
            body: serde_json::from_str(body).unwrap_or(Value::Null),
        });
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.0.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().len()
    }
}

/// Answers every request with `status` and `reply`, recording it first.
pub fn canned(seen: &Seen, status: u16, reply: Value) -> MethodRouter {
    let seen = seen.clone();
    any(move |uri: Uri, headers: HeaderMap, body: String| {
        let seen = seen.clone();
        let reply = reply.clone();
        async move {
            seen.record(&uri, &headers, &body);
            let status = StatusCode::from_u16(status).expect("valid status");
            (status, Json(reply))
        }
    })
}

/// Serve `app` on an ephemeral port and return its base url.
pub fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("binds");
    let addr = listener.local_addr().expect("has an address");
    let server = axum::Server::from_tcp(listener)
        .expect("accepts the listener")
        .serve(app.into_make_service());
    tokio::spawn(async move {
        let _ = server.await;
    });
    format!("http://{}/", addr)
}

/// A url nothing is listening on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("binds");
    let addr = listener.local_addr().expect("has an address");
    drop(listener);
    format!("http://{}/", addr)
}

pub fn config(url: &str) -> Config {
    Config {
        request_timeout: Duration::from_millis(300),
        ..Config::default()
    }
    .with_api_url(url)
}

pub fn app(url: &str) -> AppState {
    app_with_hook(url, None)
}

pub fn app_with_hook(url: &str, hook: Option<Arc<dyn StatusHook>>) -> AppState {
    let storage = Arc::new(Database::in_memory().expect("opens"));
    AppState::with_storage(config(url), storage, hook).expect("builds")
}

pub fn texts(state: &AppState) -> Vec<(gatehouse::model::Severity, String)> {
    state
        .notifications
        .list()
        .into_iter()
        .map(|n| (n.severity, n.text))
        .collect()
}
