//! In-process mock of the storefront API. Routes answer with scripted
//! responses and every request is recorded for later inspection.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};

use storefront_admin::api::{ApiClient, ReqwestTransport};
use storefront_admin::identity::{FileSessionStore, Role, Session, SessionStore, SharedSessionStore};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), (u16, String)>>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockApi {
    pub base_url: String,
    state: Arc<MockState>,
}

async fn handle(State(state): State<Arc<MockState>>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().to_string();
    let authorization = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()).map(|s| s.to_string());
    let parsed = if body.is_empty() { None } else { serde_json::from_slice(&body).ok() };
    state.requests.lock().push(Recorded { method: method.to_string(), path: path.clone(), authorization, body: parsed });

    let scripted = state.routes.lock().get(&(method.to_string(), path)).cloned();
    let (status, text) = scripted.unwrap_or((404, json!({"message": "no such route"}).to_string()));
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], text).into_response()
}

impl MockApi {
    pub async fn start() -> MockApi {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock api");
        let addr = listener.local_addr().expect("mock api addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        MockApi { base_url: format!("http://{}", addr), state }
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.respond_raw(method, path, status, body.to_string());
    }

    pub fn respond_raw(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.state.routes.lock().insert((method.to_string(), path.to_string()), (status, body.into()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.method == method && r.path == path).collect()
    }

    pub fn client(&self, store: SharedSessionStore) -> ApiClient {
        client_for(&self.base_url, store)
    }
}

pub fn client_for(base_url: &str, store: SharedSessionStore) -> ApiClient {
    let transport = ReqwestTransport::new(Some(Duration::from_secs(5))).expect("http transport");
    ApiClient::with_transport(base_url, store, Arc::new(transport)).expect("api client")
}

pub fn admin() -> Session {
    Session::new("u1", Role::Admin, "t1")
}

pub fn shopper() -> Session {
    Session::new("u2", Role::Other, "t2")
}

/// File-backed store under `dir`, optionally holding `session`.
pub fn store_in(dir: &Path, session: Option<Session>) -> SharedSessionStore {
    let store = FileSessionStore::shared(dir);
    if let Some(s) = session {
        store.save(&s).expect("save session");
    }
    store
}

pub fn sample_products() -> Value {
    json!([
        {"_id": "p1", "name": "Classic Tee", "price": 49.9, "brand": "nike", "popular": false,
         "images": ["https://img/p1.jpg"]},
        {"_id": "p2", "name": "Cargo Pants", "price": 120, "brand": "carhartt", "popular": true,
         "images": [{"url": "https://img/p2.jpg", "label": "front"}]}
    ])
}
