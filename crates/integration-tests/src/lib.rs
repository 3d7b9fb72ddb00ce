//! Integration test harness for the Orbitcart client.
//!
//! Spins up an in-process mock of the storefront backend on an ephemeral
//! port, with just enough behavior to exercise the client end to end:
//! bearer auth checking, token refresh, the cart endpoints, and event
//! ingestion. Each test spawns its own backend, so tests stay independent
//! and can run in parallel.
//!
//! ```rust,no_run
//! # async fn example() {
//! use orbitcart_integration_tests::MockBackend;
//!
//! let backend = MockBackend::spawn().await;
//! let (client, session) = backend.client();
//! # }
//! ```

// Test support code; unwraps abort the test run, which is what we want.
#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use serde_json::{Value, json};

use orbitcart_client::session::MemorySession;
use orbitcart_client::{ApiClient, ClientConfig};

/// A recorded event ingestion request.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    /// The `Authorization` header, when one was sent.
    pub auth_header: Option<String>,
    /// The request body.
    pub body: Value,
}

/// Shared state behind the mock backend's handlers.
pub struct BackendState {
    /// The access token the backend currently accepts.
    valid_access: RwLock<String>,
    /// The refresh token the backend currently accepts.
    valid_refresh: RwLock<String>,
    /// When false, `/auth/refresh` answers 401.
    refresh_ok: AtomicBool,
    /// Artificial latency for `/auth/refresh`, in milliseconds.
    refresh_delay_ms: AtomicU64,
    refresh_calls: AtomicUsize,
    account_hits: AtomicUsize,
    cart_requests: AtomicUsize,
    /// The server-held cart, as (`product_id`, quantity) pairs.
    cart: Mutex<Option<Vec<(i32, i32)>>>,
    catalog_requests: AtomicUsize,
    account_name: Mutex<String>,
    events_ok: AtomicBool,
    event_requests: AtomicUsize,
    events: Mutex<Vec<RecordedEvent>>,
}

impl BackendState {
    fn new() -> Self {
        Self {
            valid_access: RwLock::new("access-0".to_string()),
            valid_refresh: RwLock::new("refresh-0".to_string()),
            refresh_ok: AtomicBool::new(true),
            refresh_delay_ms: AtomicU64::new(0),
            refresh_calls: AtomicUsize::new(0),
            account_hits: AtomicUsize::new(0),
            cart_requests: AtomicUsize::new(0),
            cart: Mutex::new(None),
            catalog_requests: AtomicUsize::new(0),
            account_name: Mutex::new("Test User".to_string()),
            events_ok: AtomicBool::new(true),
            event_requests: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        }
    }

    fn bearer_matches(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.read().unwrap());
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            == Some(expected.as_str())
    }
}

/// An in-process mock storefront backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
}

impl MockBackend {
    /// Start a backend on an ephemeral local port.
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState::new());

        let app = axum::Router::new()
            .route("/account", get(account).put(update_account))
            .route("/auth/login", post(login))
            .route("/auth/refresh", post(refresh))
            .route("/carts/me", get(fetch_cart))
            .route("/carts", post(create_cart))
            .route("/carts/{id}/items", put(replace_items))
            .route("/carts/{id}", delete(delete_cart))
            .route("/events", post(ingest_event))
            .route("/events/batch", post(ingest_batch))
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/categories", get(list_categories))
            .route("/search", get(search))
            .route("/recommendations", get(recommendations))
            .route("/orbit-view", get(orbit_view))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// A client pointed at this backend, with a fresh in-memory session.
    pub fn client(&self) -> (ApiClient, Arc<MemorySession>) {
        let session = Arc::new(MemorySession::new());
        let config = ClientConfig::new(
            format!("http://{}", self.addr)
                .parse()
                .unwrap(),
        );
        let client = ApiClient::new(config, session.clone()).unwrap();
        (client, session)
    }

    // ── Knobs ────────────────────────────────────────────────────────────

    /// The access token the backend currently accepts.
    pub fn valid_access_token(&self) -> String {
        self.state.valid_access.read().unwrap().clone()
    }

    /// The refresh token the backend currently accepts.
    pub fn valid_refresh_token(&self) -> String {
        self.state.valid_refresh.read().unwrap().clone()
    }

    /// Make `/auth/refresh` fail with 401.
    pub fn fail_refreshes(&self) {
        self.state.refresh_ok.store(false, Ordering::SeqCst);
    }

    /// Add artificial latency to `/auth/refresh`.
    pub fn delay_refreshes(&self, delay: Duration) {
        self.state
            .refresh_delay_ms
            .store(u64::try_from(delay.as_millis()).unwrap(), Ordering::SeqCst);
    }

    /// Make the event endpoints fail with 500.
    pub fn fail_events(&self) {
        self.state.events_ok.store(false, Ordering::SeqCst);
    }

    /// Seed the server-held cart.
    pub fn seed_cart(&self, items: Vec<(i32, i32)>) {
        *self.state.cart.lock().unwrap() = Some(items);
    }

    // ── Observations ─────────────────────────────────────────────────────

    /// Number of calls `/auth/refresh` has received.
    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Number of calls `/account` has received.
    pub fn account_hits(&self) -> usize {
        self.state.account_hits.load(Ordering::SeqCst)
    }

    /// Number of requests any cart endpoint has received.
    pub fn cart_requests(&self) -> usize {
        self.state.cart_requests.load(Ordering::SeqCst)
    }

    /// Number of requests the event endpoints have received.
    pub fn event_requests(&self) -> usize {
        self.state.event_requests.load(Ordering::SeqCst)
    }

    /// Number of requests any catalog/discovery endpoint has received.
    pub fn catalog_requests(&self) -> usize {
        self.state.catalog_requests.load(Ordering::SeqCst)
    }

    /// The account display name the backend currently holds.
    pub fn account_name(&self) -> String {
        self.state.account_name.lock().unwrap().clone()
    }

    /// The server-held cart, when one exists.
    pub fn cart_items(&self) -> Option<Vec<(i32, i32)>> {
        self.state.cart.lock().unwrap().clone()
    }

    /// Every event ingestion request received so far.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.events.lock().unwrap().clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "invalid or expired token" })),
    )
        .into_response()
}

fn cart_json(items: &[(i32, i32)]) -> Value {
    json!({
        "id": 1,
        "items": items
            .iter()
            .map(|&(product_id, quantity)| json!({
                "product_id": product_id,
                "quantity": quantity,
                "subtotal": "0.00",
            }))
            .collect::<Vec<_>>(),
        "total": "0.00",
    })
}

async fn account(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.account_hits.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_matches(&headers) {
        return unauthorized();
    }
    Json(json!({ "id": 7, "email": "user@example.com", "name": "Test User" })).into_response()
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    if body.get("password").and_then(Value::as_str) != Some("hunter2") {
        return unauthorized();
    }
    let email = body
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or("user@example.com");
    let name = state.account_name.lock().unwrap().clone();
    Json(json!({
        "access_token": state.valid_access.read().unwrap().clone(),
        "refresh_token": state.valid_refresh.read().unwrap().clone(),
        "session_id": "sess-login",
        "user": { "id": 7, "email": email, "name": name },
    }))
    .into_response()
}

async fn refresh(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    let call = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;

    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let presented = body.get("refresh_token").and_then(Value::as_str);
    let expected = state.valid_refresh.read().unwrap().clone();
    if !state.refresh_ok.load(Ordering::SeqCst) || presented != Some(expected.as_str()) {
        return unauthorized();
    }

    let rotated = format!("access-{call}");
    *state.valid_access.write().unwrap() = rotated.clone();
    Json(json!({ "access_token": rotated })).into_response()
}

async fn fetch_cart(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_matches(&headers) {
        return unauthorized();
    }
    match state.cart.lock().unwrap().as_ref() {
        Some(items) => Json(cart_json(items)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "no cart" })),
        )
            .into_response(),
    }
}

fn parse_items(body: &Value) -> Vec<(i32, i32)> {
    body.get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let product_id = item.get("product_id")?.as_i64()?;
                    let quantity = item.get("quantity")?.as_i64()?;
                    Some((
                        i32::try_from(product_id).ok()?,
                        i32::try_from(quantity).ok()?,
                    ))
                })
                .collect()
        })
        .unwrap_or_default()
}

async fn create_cart(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_matches(&headers) {
        return unauthorized();
    }
    let items = parse_items(&body);
    *state.cart.lock().unwrap() = Some(items.clone());
    Json(cart_json(&items)).into_response()
}

async fn replace_items(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<i32>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_matches(&headers) {
        return unauthorized();
    }
    let items = parse_items(&body);
    *state.cart.lock().unwrap() = Some(items.clone());
    Json(cart_json(&items)).into_response()
}

async fn delete_cart(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_matches(&headers) {
        return unauthorized();
    }
    *state.cart.lock().unwrap() = None;
    StatusCode::NO_CONTENT.into_response()
}

fn record_event(state: &BackendState, headers: &HeaderMap, body: Value) -> Response {
    state.event_requests.fetch_add(1, Ordering::SeqCst);
    if !state.events_ok.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "ingestion unavailable" })),
        )
            .into_response();
    }
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    state
        .events
        .lock()
        .unwrap()
        .push(RecordedEvent { auth_header, body });
    StatusCode::NO_CONTENT.into_response()
}

async fn update_account(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.account_hits.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_matches(&headers) {
        return unauthorized();
    }
    if let Some(name) = body.get("name").and_then(Value::as_str) {
        *state.account_name.lock().unwrap() = name.to_string();
    }
    let name = state.account_name.lock().unwrap().clone();
    Json(json!({ "id": 7, "email": "user@example.com", "name": name })).into_response()
}

// Fixed two-product catalog; enough to exercise pagination, caching, and
// the discovery wrappers.
fn product_json(id: i32) -> Option<Value> {
    match id {
        1 => Some(json!({
            "id": 1,
            "name": "Trail Shoe",
            "description": "Grippy on loose rock",
            "price": "59.90",
            "category_id": 10,
        })),
        2 => Some(json!({
            "id": 2,
            "name": "Headlamp",
            "price": "24.50",
            "category_id": 11,
        })),
        _ => None,
    }
}

async fn list_products(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    let page = params
        .get("page")
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(1);
    let per_page = params
        .get("per_page")
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(20);
    Json(json!({
        "items": [product_json(1), product_json(2)],
        "page": page,
        "per_page": per_page,
        "total": 2,
    }))
    .into_response()
}

async fn get_product(State(state): State<Arc<BackendState>>, Path(id): Path<i32>) -> Response {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    match product_json(id) {
        Some(product) => Json(product).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "product not found" })),
        )
            .into_response(),
    }
}

async fn list_categories(State(state): State<Arc<BackendState>>) -> Response {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        { "id": 10, "name": "Footwear" },
        { "id": 11, "name": "Lighting" },
    ]))
    .into_response()
}

async fn search(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    // Toy semantics: a query mentioning "shoe" matches product 1.
    let results = if params
        .get("q")
        .is_some_and(|q| q.to_lowercase().contains("shoe"))
    {
        vec![product_json(1)]
    } else {
        Vec::new()
    };
    Json(json!({ "results": results })).into_response()
}

async fn recommendations(State(state): State<Arc<BackendState>>) -> Response {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "recommendations": [product_json(2)] })).into_response()
}

async fn orbit_view(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    let center = params
        .get("product_id")
        .and_then(|p| p.parse::<i32>().ok())
        .unwrap_or(1);
    Json(json!({
        "center": center,
        "points": [
            { "product_id": 2, "x": 0.42, "y": -0.17 },
        ],
    }))
    .into_response()
}

async fn ingest_event(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_event(&state, &headers, body)
}

async fn ingest_batch(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_event(&state, &headers, body)
}
