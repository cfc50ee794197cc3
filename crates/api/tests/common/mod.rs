#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use lms_api::auth::jwt::{generate_access_token, JwtConfig};
use lms_api::auth::password::hash_password;
use lms_api::billing::stripe::StripeConfig;
use lms_api::billing::{CheckoutRequest, CheckoutSession, PaymentError, PaymentProvider, PortalSession};
use lms_api::config::{ServerConfig, TenancyConfig};
use lms_api::router::build_app_router;
use lms_api::state::AppState;
use lms_db::models::tenant::{CreateTenant, Tenant};
use lms_db::models::user::{CreateUser, User};
use lms_db::repositories::{RoleRepo, TenantRepo, UserRepo};
use lms_events::EventBus;

pub const BASE_DOMAIN: &str = "lms.test";
pub const WEBHOOK_SECRET: &str = "whsec_integration_secret";
pub const PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        tenancy: TenancyConfig {
            base_domain: Some(BASE_DOMAIN.to_string()),
            default_slug: None,
        },
        public_app_url: "http://localhost:5173".to_string(),
        stripe: StripeConfig {
            secret_key: None,
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Payment provider double
// ---------------------------------------------------------------------------

/// Records every call and returns canned sessions.
#[derive(Default)]
pub struct FakePaymentProvider {
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    pub portals: Mutex<Vec<(String, Option<String>)>>,
}

#[async_trait]
impl PaymentProvider for FakePaymentProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut calls = self.checkouts.lock().unwrap();
        calls.push(request.clone());
        Ok(CheckoutSession {
            id: format!("cs_test_{}", calls.len()),
            url: "https://checkout.test/session".to_string(),
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        _return_url: &str,
        connected_account: Option<&str>,
    ) -> Result<PortalSession, PaymentError> {
        self.portals
            .lock()
            .unwrap()
            .push((customer_id.to_string(), connected_account.map(str::to_string)));
        Ok(PortalSession {
            url: "https://billing.test/portal".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Handles a test needs to observe side effects of requests.
pub struct TestApp {
    pub router: Router,
    pub payments: Arc<FakePaymentProvider>,
    pub event_bus: Arc<EventBus>,
}

/// Build the full application router (same middleware stack as `main.rs`).
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_harness(pool).router
}

pub fn build_test_harness(pool: PgPool) -> TestApp {
    build_test_harness_with_config(pool, test_config())
}

pub fn build_test_harness_with_config(pool: PgPool, config: ServerConfig) -> TestApp {
    let payments = Arc::new(FakePaymentProvider::default());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        payments: Arc::clone(&payments) as Arc<dyn PaymentProvider>,
    };

    TestApp {
        router: build_app_router(state, &config),
        payments,
        event_bus,
    }
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Host header that resolves to the tenant with `slug`.
pub fn host_for(slug: &str) -> String {
    format!("{slug}.{BASE_DOMAIN}")
}

pub async fn seed_tenant(pool: &PgPool, slug: &str) -> Tenant {
    TenantRepo::create(
        pool,
        &CreateTenant {
            slug: slug.to_string(),
            name: format!("{slug} academy"),
            domain: None,
            stripe_account_id: None,
        },
    )
    .await
    .expect("tenant creation should succeed")
}

/// Insert a user with [`PASSWORD`]. `tenant_id = None` creates a platform user.
pub async fn seed_user(pool: &PgPool, tenant_id: Option<i64>, email: &str, role: &str) -> User {
    let role_id = RoleRepo::id_for_name(pool, role)
        .await
        .expect("role should exist");
    UserRepo::create(
        pool,
        &CreateUser {
            tenant_id,
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            role_id,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Mint an access token for a seeded user without going through login.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.tenant_id, &user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn builder(method: Method, host: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut b = Request::builder().method(method).uri(uri).header(HOST, host);
    if let Some(token) = token {
        b = b.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    b
}

pub async fn get(app: Router, host: &str, uri: &str) -> Response<Body> {
    let req = builder(Method::GET, host, uri, None)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn get_auth(app: Router, host: &str, uri: &str, token: &str) -> Response<Body> {
    let req = builder(Method::GET, host, uri, Some(token))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn post_json(
    app: Router,
    host: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let req = builder(Method::POST, host, uri, None)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn post_json_auth(
    app: Router,
    host: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let req = builder(Method::POST, host, uri, Some(token))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn put_json_auth(
    app: Router,
    host: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let req = builder(Method::PUT, host, uri, Some(token))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn delete_auth(app: Router, host: &str, uri: &str, token: &str) -> Response<Body> {
    let req = builder(Method::DELETE, host, uri, Some(token))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

/// Create a video through the admin API and return its id.
pub async fn create_video(app: Router, host: &str, token: &str, body: serde_json::Value) -> i64 {
    let response = post_json_auth(app, host, "/api/lms/admin/videos", token, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_i64()
        .expect("created video should have an id")
}
