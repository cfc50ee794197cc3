//! Host and cookie tenant resolution, cross-tenant tokens, branding.

mod common;

use axum::body::Body;
use axum::http::header::{COOKIE, HOST};
use axum::http::{Request, StatusCode};
use common::*;
use lms_db::models::tenant::CreateTenant;
use lms_db::repositories::TenantRepo;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn subdomain_resolves_tenant(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let app = build_test_app(pool);

    let response = get(app, "acme.lms.test:443", "/api/lms/tenant").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], tenant.id);
    assert_eq!(json["data"]["slug"], "acme");
    assert!(json["data"].get("stripe_account_id").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn custom_domain_resolves_tenant(pool: PgPool) {
    TenantRepo::create(
        &pool,
        &CreateTenant {
            slug: "school".into(),
            name: "The School".into(),
            domain: Some("learn.school.org".into()),
            stripe_account_id: Some("acct_123".into()),
        },
    )
    .await
    .unwrap();
    let app = build_test_app(pool);

    let response = get(app, "www.learn.school.org", "/api/lms/tenant").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["slug"], "school");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_host_is_404(pool: PgPool) {
    seed_tenant(&pool, "acme").await;
    let app = build_test_app(pool);

    let response = get(app, "nobody.lms.test", "/api/lms/tenant").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Tenant not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cookie_selects_tenant_when_host_does_not(pool: PgPool) {
    seed_tenant(&pool, "acme").await;
    let app = build_test_app(pool);

    let request = Request::builder()
        .uri("/api/lms/tenant")
        .header(HOST, "localhost:3000")
        .header(COOKIE, "theme=dark; tenant=acme")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["slug"], "acme");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_tenant_is_not_served(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    TenantRepo::deactivate(&pool, tenant.id).await.unwrap();
    let app = build_test_app(pool);

    let response = get(app, &host_for("acme"), "/api/lms/tenant").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_from_another_tenant_is_forbidden(pool: PgPool) {
    let acme = seed_tenant(&pool, "acme").await;
    seed_tenant(&pool, "beta").await;
    let user = seed_user(&pool, Some(acme.id), "learner@example.com", "member").await;
    let token = token_for(&user);
    let app = build_test_app(pool);

    let home = get_auth(app.clone(), &host_for("acme"), "/api/lms/me", &token).await;
    assert_eq!(home.status(), StatusCode::OK);

    let away = get_auth(app, &host_for("beta"), "/api/lms/me", &token).await;
    assert_eq!(away.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn super_admin_token_works_in_every_tenant(pool: PgPool) {
    seed_tenant(&pool, "acme").await;
    seed_tenant(&pool, "beta").await;
    let root = seed_user(&pool, None, "root@platform.test", "super_admin").await;
    let token = token_for(&root);
    let app = build_test_app(pool);

    for slug in ["acme", "beta"] {
        let response = get_auth(app.clone(), &host_for(slug), "/api/lms/admin/users", &token).await;
        assert_eq!(response.status(), StatusCode::OK, "tenant {slug}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn branding_defaults_to_platform_values(pool: PgPool) {
    seed_tenant(&pool, "acme").await;
    let app = build_test_app(pool);

    let response = get(app, &host_for("acme"), "/api/lms/branding").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["site_title"], "acme academy");
    assert_eq!(json["data"]["primary_color"], "#2563eb");
    assert!(json["data"]["logo_url"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_updates_branding(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let admin = seed_user(&pool, Some(tenant.id), "admin@example.com", "admin").await;
    let member = seed_user(&pool, Some(tenant.id), "member@example.com", "member").await;
    let app = build_test_app(pool);
    let host = host_for("acme");

    let bad = put_json_auth(
        app.clone(),
        &host,
        "/api/lms/admin/branding",
        &token_for(&admin),
        json!({ "primary_color": "blue" }),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let denied = put_json_auth(
        app.clone(),
        &host,
        "/api/lms/admin/branding",
        &token_for(&member),
        json!({ "primary_color": "#ff0000" }),
    )
    .await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let ok = put_json_auth(
        app.clone(),
        &host,
        "/api/lms/admin/branding",
        &token_for(&admin),
        json!({ "primary_color": "#ff0000", "site_title": "Acme Learning" }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);

    let json = body_json(get(app, &host, "/api/lms/branding").await).await;
    assert_eq!(json["data"]["primary_color"], "#ff0000");
    assert_eq!(json["data"]["site_title"], "Acme Learning");
    assert_eq!(json["data"]["secondary_color"], "#1e293b");
}
