// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test harness: the app under test plus an in-process stand-in for
//! the loyalty API and the auth provider.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{self, post, put},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use punchcard_web::config::Config;
use punchcard_web::middleware::session::{create_session_token, SessionClaims, SESSION_COOKIE};
use punchcard_web::models::UserRole;
use punchcard_web::routes::create_router;
use punchcard_web::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const CUSTOMER_TOKEN: &str = "customer-token";
pub const MERCHANT_TOKEN: &str = "merchant-token";
pub const REVOKED_TOKEN: &str = "revoked-token";
/// Merchant whose programs come back as a flat list.
pub const FLAT_MERCHANT_TOKEN: &str = "flat-merchant-token";

/// One request seen by the mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SeenRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub apikey: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockUpstream {
    pub requests: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockUpstream {
    fn log(&self, path: &str, query: &HashMap<String, String>, headers: &HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(SeenRequest {
            path: path.to_string(),
            query: query.clone(),
            authorization: header("authorization"),
            apikey: header("apikey"),
        });
    }

    #[allow(dead_code)]
    pub fn seen(&self, path: &str) -> Vec<SeenRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

type Q = Query<HashMap<String, String>>;

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid token" }))).into_response()
}

fn card(id: &str, program_id: &str, merchant: &str, current: u32, status: &str) -> Value {
    json!({
        "id": id,
        "program_id": program_id,
        "merchant_name": merchant,
        "program_name": "Coffee Card",
        "current_punches": current,
        "punches_required": 8,
        "status": status,
        "created_at": "2025-01-15T09:30:00Z",
        "reward_description": "Free latte"
    })
}

fn customer_cards() -> Value {
    json!({
        "cards": [
            card("card-old", "prog-1", "Brew & Bean", 2, "expired"),
            card("card-new", "prog-1", "Brew & Bean", 5, "active"),
            card("card-lone", "prog-2", "Corner Deli", 1, "expired"),
            { "id": "card-bad", "program_id": "prog-2", "current_punches": null },
        ]
    })
}

fn user(id: &str, email: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "user_metadata": { "first_name": "Ana", "last_name": "Cruz" }
    })
}

fn auth_session(access_token: &str, email: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": "refresh-1",
        "expires_in": 3600,
        "user": user(&format!("user-{access_token}"), email),
    })
}

// ─── Loyalty API ─────────────────────────────────────────────

async fn user_cards(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/api/user/cards", &q, &headers);
    match bearer(&headers) {
        Some(CUSTOMER_TOKEN) => Json(customer_cards()).into_response(),
        Some(MERCHANT_TOKEN) => Json(json!({})).into_response(),
        _ => unauthorized(),
    }
}

async fn user_profile(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/api/user/profile", &q, &headers);
    match bearer(&headers) {
        Some(MERCHANT_TOKEN) => Json(json!({ "role": "merchant" })).into_response(),
        Some(CUSTOMER_TOKEN) => Json(json!({ "role": "customer" })).into_response(),
        _ => unauthorized(),
    }
}

async fn merchant_programs(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/api/program/merchant_user_programs", &q, &headers);
    if bearer(&headers) == Some(FLAT_MERCHANT_TOKEN) {
        return Json(json!({
            "programs": [
                {
                    "id": "prog-7", "name": "Smoothie Club", "punches_required": 6,
                    "merchant_name": "Juice Bar", "active_cards": 9,
                    "total_redepmtions": 3, "total_punches": 48
                }
            ]
        }))
        .into_response();
    }
    if bearer(&headers) != Some(MERCHANT_TOKEN) {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "Not a merchant" }))).into_response();
    }
    Json(json!({
        "success": true,
        "programs": {
            "merchant-a": {
                "merchant_info": {
                    "id": "merchant-a",
                    "name": "Brew & Bean",
                    "brand_color": "#cf2387"
                },
                "programs": [
                    { "id": "prog-1", "name": "Coffee Card", "punches_required": 8, "reward_description": "Free latte", "active_cards": 42 },
                    { "id": "prog-3", "name": "Pastry Club", "punches_required": 6, "active": false }
                ],
                "active_cards": 7,
                "total_redepmtions": 5
            },
            "merchant-b": {
                "merchant_info": { "id": "merchant-b", "name": "Corner Deli" },
                "programs": [
                    { "id": "prog-2", "name": "Sandwich Stamps", "punches_required": 10 }
                ]
            }
        }
    }))
    .into_response()
}

async fn get_program(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/api/program/get_program", &q, &headers);
    match q.get("program_id").map(String::as_str) {
        Some("prog-1") => Json(json!({
            "id": "prog-1",
            "name": "Coffee Card",
            "punches_required": 8,
            "merchant_name": "Brew & Bean",
            "reward_description": "Free latte",
            "brand_color": "#cf2387",
            "foreground_color": "#ffffff"
        }))
        .into_response(),
        Some("prog-9") => Json(json!({
            "id": "prog-9",
            "name": "Tea Time",
            "punches_required": 5,
            "merchant_name": "Leaf"
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "Program not found" }))).into_response(),
    }
}

async fn punch_card(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/api/passes/punch_card", &q, &headers);
    if bearer(&headers) == Some(REVOKED_TOKEN) {
        return unauthorized();
    }
    match q.get("card_id").map(String::as_str) {
        Some("card-full") => Json(json!({ "success": true, "remaining": 0 })).into_response(),
        Some("card-gone") => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": "Card not found" }))).into_response()
        }
        Some("card-boom") => (StatusCode::INTERNAL_SERVER_ERROR, "database down").into_response(),
        Some(_) => Json(json!({ "success": true, "remaining": 3 })).into_response(),
        None => (StatusCode::BAD_REQUEST, Json(json!({ "error": "card_id required" }))).into_response(),
    }
}

async fn redeem_reward(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/api/redemptions/redeem_reward", &q, &headers);
    match q.get("card_id").map(String::as_str) {
        Some("card-used") => (StatusCode::CONFLICT, Json(json!({}))).into_response(),
        Some("card-locked") => {
            (StatusCode::FORBIDDEN, Json(json!({ "error": "Not your program" }))).into_response()
        }
        _ => Json(json!({ "success": true })).into_response(),
    }
}

async fn apple_pass(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/api/passes/apple/get_or_create/", &q, &headers);
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    (
        [(header::CONTENT_TYPE, "application/vnd.apple.pkpass")],
        Body::from(&b"PK\x03\x04fake-pass"[..]),
    )
        .into_response()
}

async fn google_pass(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/api/passes/google/get_or_create/", &q, &headers);
    match q.get("program_id").map(String::as_str) {
        Some("prog-1") => Json(json!({ "save_url": "https://pay.google.com/gp/v/save/abc123" })).into_response(),
        _ => Json(json!({})).into_response(),
    }
}

// ─── Auth provider ───────────────────────────────────────────

async fn token(
    State(mock): State<MockUpstream>,
    Query(q): Q,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.log("/auth/v1/token", &q, &headers);
    match q.get("grant_type").map(String::as_str) {
        Some("password") => {
            let email = body["email"].as_str().unwrap_or_default();
            if body["password"].as_str() == Some("wrong") {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })),
                )
                    .into_response();
            }
            let token = if email.starts_with("merchant") {
                MERCHANT_TOKEN
            } else {
                CUSTOMER_TOKEN
            };
            Json(auth_session(token, email)).into_response()
        }
        Some("refresh_token") => match body["refresh_token"].as_str() {
            Some("refresh-1") => Json(auth_session(CUSTOMER_TOKEN, "ana@example.com")).into_response(),
            _ => (StatusCode::BAD_REQUEST, Json(json!({ "error_description": "Invalid Refresh Token" })))
                .into_response(),
        },
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn signup(
    State(mock): State<MockUpstream>,
    Query(q): Q,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.log("/auth/v1/signup", &q, &headers);
    let email = body["email"].as_str().unwrap_or_default();
    match email {
        "taken@example.com" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "code": 422, "msg": "User already registered" })),
        )
            .into_response(),
        "confirm@example.com" => Json(user("user-pending", email)).into_response(),
        _ => Json(auth_session(CUSTOMER_TOKEN, email)).into_response(),
    }
}

async fn logout(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> StatusCode {
    mock.log("/auth/v1/logout", &q, &headers);
    StatusCode::NO_CONTENT
}

async fn recover(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Json<Value> {
    mock.log("/auth/v1/recover", &q, &headers);
    Json(json!({}))
}

async fn verify(
    State(mock): State<MockUpstream>,
    Query(q): Q,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.log("/auth/v1/verify", &q, &headers);
    match (body["type"].as_str(), body["token_hash"].as_str()) {
        (Some("recovery"), Some("hash-abc")) => Json(auth_session("recovery-abc", "ana@example.com")).into_response(),
        _ => (
            StatusCode::FORBIDDEN,
            Json(json!({ "code": 403, "error_code": "otp_expired", "msg": "Email link is invalid or has expired" })),
        )
            .into_response(),
    }
}

async fn update_user(State(mock): State<MockUpstream>, Query(q): Q, headers: HeaderMap) -> Response {
    mock.log("/auth/v1/user", &q, &headers);
    match bearer(&headers) {
        Some(token) => Json(user(&format!("user-{token}"), "ana@example.com")).into_response(),
        None => unauthorized(),
    }
}

fn upstream_router(mock: MockUpstream) -> Router {
    Router::new()
        .route("/api/user/cards", routing::get(user_cards))
        .route("/api/user/profile", routing::get(user_profile))
        .route("/api/program/merchant_user_programs", routing::get(merchant_programs))
        .route("/api/program/get_program", routing::get(get_program))
        .route("/api/passes/punch_card", routing::get(punch_card))
        .route("/api/redemptions/redeem_reward", routing::get(redeem_reward))
        .route("/api/passes/apple/get_or_create/", routing::get(apple_pass))
        .route("/api/passes/google/get_or_create/", routing::get(google_pass))
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/signup", post(signup))
        .route("/auth/v1/logout", post(logout))
        .route("/auth/v1/recover", post(recover))
        .route("/auth/v1/verify", post(verify))
        .route("/auth/v1/user", put(update_user))
        .with_state(mock)
}

// ─── App under test ──────────────────────────────────────────

/// App whose upstreams point at a closed port.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default()));
    (create_router(state.clone()), state)
}

/// App wired to a freshly started mock upstream.
#[allow(dead_code)]
pub async fn create_test_app_with_upstream() -> (Router, Arc<AppState>, MockUpstream) {
    let mock = MockUpstream::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock upstream");
    let addr = listener.local_addr().expect("mock upstream address");
    let router = upstream_router(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock upstream");
    });

    let base = format!("http://{addr}");
    let config = Config {
        api_url: base.clone(),
        supabase_url: base,
        ..Config::test_default()
    };
    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state, mock)
}

/// Claims for a signed-in user holding `access_token`.
#[allow(dead_code)]
pub fn claims(role: UserRole, admin: bool, access_token: &str) -> SessionClaims {
    let now = chrono::Utc::now().timestamp() as usize;
    SessionClaims {
        sub: format!("user-{access_token}"),
        email: "ana@example.com".to_string(),
        name: Some("Ana Cruz".to_string()),
        role,
        admin,
        access_token: access_token.to_string(),
        refresh_token: None,
        iat: now,
        exp: now + 3600,
    }
}

/// `Cookie` header value carrying a signed session.
#[allow(dead_code)]
pub fn session_cookie(claims: &SessionClaims) -> String {
    let key = Config::test_default().session_signing_key;
    let token = create_session_token(claims, &key).expect("sign session");
    format!("{SESSION_COOKIE}={token}")
}

#[allow(dead_code)]
pub fn customer_cookie() -> String {
    session_cookie(&claims(UserRole::Customer, false, CUSTOMER_TOKEN))
}

#[allow(dead_code)]
pub fn merchant_cookie() -> String {
    session_cookie(&claims(UserRole::Merchant, false, MERCHANT_TOKEN))
}

/// Unsigned JWT-shaped token whose `exp` is in the past.
#[allow(dead_code)]
pub fn expired_provider_token() -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"user-1","exp":1000000000}"#);
    format!("{header}.{payload}.signature")
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8_lossy(&bytes).into_owned()
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn get(uri: &str, cookie: Option<&str>) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// URL-encoded form POST.
#[allow(dead_code)]
pub fn post_form(uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> axum::http::Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}
