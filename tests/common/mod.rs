// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use rideshare_client::config::Config;
use rideshare_client::error::ClientError;
use rideshare_client::models::Identity;
use rideshare_client::routes::create_router;
use rideshare_client::session::{AccessToken, RefreshRelay, SessionController};
use rideshare_client::AppState;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// In-process stand-in for the ride-booking backend.
#[allow(dead_code)]
pub struct MockBackend {
    /// Bearer token protected routes accept.
    accepted: Mutex<Option<String>>,
    /// Access token handed out by `/auth/refresh`.
    pub issued_token: String,
    /// Cookie value `/auth/refresh` accepts.
    pub refresh_cookie: String,
    pub refresh_calls: AtomicUsize,
    pub unauthorized: AtomicUsize,
    /// Every protected request: (path, bearer token)
    pub requests: Mutex<Vec<(String, Option<String>)>>,
    /// Raw `Cookie` headers seen by `/auth/refresh`
    pub refresh_cookies_seen: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn accept(&self, token: &str) {
        *self.accepted.lock().unwrap() = Some(token.to_string());
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn unauthorized(&self) -> usize {
        self.unauthorized.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, path: &str, headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.to_string());

        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), bearer.clone()));
        bearer
    }

    fn authorize(&self, path: &str, headers: &HeaderMap) -> Result<(), Response> {
        let bearer = self.record(path, headers);
        let accepted = self.accepted.lock().unwrap().clone();
        if bearer.is_some() && bearer == accepted {
            Ok(())
        } else {
            self.unauthorized.fetch_add(1, Ordering::SeqCst);
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid token" })),
            )
                .into_response())
        }
    }
}

#[allow(dead_code)]
pub fn rider() -> Identity {
    Identity {
        id: "u1".to_string(),
        name: "Rider One".to_string(),
        email: "rider@example.com".to_string(),
    }
}

type Backend = State<Arc<MockBackend>>;

async fn me(State(backend): Backend, headers: HeaderMap) -> Response {
    if let Err(denied) = backend.authorize("/me", &headers) {
        return denied;
    }
    Json(rider()).into_response()
}

async fn available_drivers(State(backend): Backend, headers: HeaderMap) -> Response {
    if let Err(denied) = backend.authorize("/drivers/available", &headers) {
        return denied;
    }
    Json(json!([
        { "id": "d1", "name": "Jane", "is_available": true, "lat": 34.05, "lon": -118.25 }
    ]))
    .into_response()
}

async fn register_driver(
    State(backend): Backend,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(denied) = backend.authorize("/drivers", &headers) {
        return denied;
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "d42",
            "name": body["name"],
            "is_available": true,
            "lat": body["lat"],
            "lon": body["lon"],
        })),
    )
        .into_response()
}

async fn create_trip(
    State(backend): Backend,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(denied) = backend.authorize("/trips", &headers) {
        return denied;
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "t1",
            "rider_id": body["rider_id"],
            "driver_id": "d1",
            "start_lat": body["start_lat"],
            "start_lon": body["start_lon"],
            "end_lat": body["end_lat"],
            "end_lon": body["end_lon"],
            "status": "requested",
            "price": 12.5,
            "request_time": "2026-01-02T03:04:05Z",
        })),
    )
        .into_response()
}

async fn complete_trip(
    State(backend): Backend,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = backend.authorize("/trips/complete", &headers) {
        return denied;
    }
    if id == "missing" {
        return (StatusCode::NOT_FOUND, "trip not found\n").into_response();
    }
    Json(json!({ "id": id, "rider_id": "u1", "status": "completed" })).into_response()
}

async fn always_unauthorized(State(backend): Backend, headers: HeaderMap) -> Response {
    backend.record("/always-401", &headers);
    backend.unauthorized.fetch_add(1, Ordering::SeqCst);
    (StatusCode::UNAUTHORIZED, "revoked").into_response()
}

async fn teapot() -> Response {
    (StatusCode::IM_A_TEAPOT, "short and stout").into_response()
}

async fn malformed_relay() -> Response {
    (StatusCode::OK, "<html>not json</html>").into_response()
}

async fn refresh(State(backend): Backend, headers: HeaderMap) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let cookie = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    backend
        .refresh_cookies_seen
        .lock()
        .unwrap()
        .push(cookie.clone());

    let value = cookie
        .split(';')
        .filter_map(|pair| pair.trim().strip_prefix("refresh_token="))
        .next()
        .unwrap_or_default();

    if value == "garbage" {
        return (StatusCode::OK, "not json").into_response();
    }

    if value != backend.refresh_cookie {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid refresh token" })),
        )
            .into_response();
    }

    let mut response = Json(json!({ "access_token": backend.issued_token })).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        "refresh_token=rotated; Path=/; HttpOnly; SameSite=Lax"
            .parse()
            .unwrap(),
    );
    response
}

/// Serve a router on an ephemeral localhost port, returning its base URL.
#[allow(dead_code)]
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Start a mock backend; returns its base URL and handle.
#[allow(dead_code)]
pub async fn spawn_backend() -> (String, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend {
        accepted: Mutex::new(None),
        issued_token: "T-relay".to_string(),
        refresh_cookie: "good".to_string(),
        refresh_calls: AtomicUsize::new(0),
        unauthorized: AtomicUsize::new(0),
        requests: Mutex::new(Vec::new()),
        refresh_cookies_seen: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/me", get(me))
        .route("/drivers", post(register_driver))
        .route("/drivers/available", get(available_drivers))
        .route("/trips", post(create_trip))
        .route("/trips/{id}/complete", patch(complete_trip))
        .route("/always-401", get(always_unauthorized))
        .route("/teapot", get(teapot))
        .route("/relay/malformed", post(malformed_relay))
        .route("/auth/refresh", post(refresh))
        .with_state(backend.clone());

    (serve(app).await, backend)
}

/// Relay router whose backend is `backend_url`.
#[allow(dead_code)]
pub fn relay_app(backend_url: &str) -> Router {
    let config = Config {
        backend_url: backend_url.to_string(),
        ..Config::default()
    };
    create_router(Arc::new(AppState::new(config)))
}

/// Scripted `RefreshRelay`; optionally holds every call until released.
#[allow(dead_code)]
pub struct FakeRelay {
    calls: AtomicUsize,
    outcomes: Mutex<VecDeque<Result<AccessToken, ClientError>>>,
    gate: Option<Notify>,
}

#[allow(dead_code)]
impl FakeRelay {
    pub fn new(outcomes: Vec<Result<AccessToken, ClientError>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            outcomes: Mutex::new(outcomes.into()),
            gate: None,
        })
    }

    pub fn gated(outcomes: Vec<Result<AccessToken, ClientError>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            outcomes: Mutex::new(outcomes.into()),
            gate: Some(Notify::new()),
        })
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshRelay for FakeRelay {
    async fn refresh(&self) -> Result<AccessToken, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::Unauthorized))
    }
}

/// Controller against `backend_url` with a scripted relay.
#[allow(dead_code)]
pub fn controller(backend_url: &str, relay: Arc<FakeRelay>) -> SessionController {
    SessionController::new(reqwest::Client::new(), backend_url, relay)
}

/// Poll until `condition` holds (bounded wait).
#[allow(dead_code)]
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
