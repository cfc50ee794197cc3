//! Profile, password change and tenant user administration.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_validates_avatar(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let app = build_test_app(pool);
    let host = host_for("acme");
    let token = token_for(&member);

    let bad = put_json_auth(app.clone(), &host, "/api/lms/me", &token, json!({ "avatar_url": "ftp://x" })).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let ok = put_json_auth(
        app.clone(),
        &host,
        "/api/lms/me",
        &token,
        json!({ "display_name": "Renamed", "avatar_url": "https://cdn.example.com/me.png" }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);

    let me = body_json(get_auth(app, &host, "/api/lms/me", &token).await).await;
    assert_eq!(me["data"]["display_name"], "Renamed");
    assert!(me["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_change_checks_current_and_revokes_sessions(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let app = build_test_app(pool);
    let host = host_for("acme");

    let login = body_json(
        post_json(
            app.clone(),
            &host,
            "/api/auth/login",
            json!({ "email": "learner@example.com", "password": PASSWORD }),
        )
        .await,
    )
    .await;
    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let wrong = put_json_auth(
        app.clone(),
        &host,
        "/api/lms/me/password",
        access,
        json!({ "current_password": "nope-nope", "new_password": "another-long-pw" }),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let ok = put_json_auth(
        app.clone(),
        &host,
        "/api/lms/me/password",
        access,
        json!({ "current_password": PASSWORD, "new_password": "another-long-pw" }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::NO_CONTENT);

    let stale = post_json(app.clone(), &host, "/api/auth/refresh", json!({ "refresh_token": refresh })).await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    let relogin = post_json(
        app,
        &host,
        "/api/auth/login",
        json!({ "email": "learner@example.com", "password": "another-long-pw" }),
    )
    .await;
    assert_eq!(relogin.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_assigns_roles_within_limits(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let admin = seed_user(&pool, Some(tenant.id), "admin@example.com", "admin").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let app = build_test_app(pool);
    let host = host_for("acme");
    let token = token_for(&admin);

    let promoted = put_json_auth(
        app.clone(),
        &host,
        &format!("/api/lms/admin/users/{}/role", member.id),
        &token,
        json!({ "role": "instructor" }),
    )
    .await;
    assert_eq!(promoted.status(), StatusCode::OK);
    assert_eq!(body_json(promoted).await["data"]["role"], "instructor");

    let too_high = put_json_auth(
        app.clone(),
        &host,
        &format!("/api/lms/admin/users/{}/role", member.id),
        &token,
        json!({ "role": "super_admin" }),
    )
    .await;
    assert_eq!(too_high.status(), StatusCode::FORBIDDEN);

    let self_change = put_json_auth(
        app,
        &host,
        &format!("/api/lms/admin/users/{}/role", admin.id),
        &token,
        json!({ "role": "member" }),
    )
    .await;
    assert_eq!(self_change.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_users_cannot_log_in(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let admin = seed_user(&pool, Some(tenant.id), "admin@example.com", "admin").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let app = build_test_app(pool);
    let host = host_for("acme");
    let uri = format!("/api/lms/admin/users/{}/deactivate", member.id);

    let first = post_json_auth(app.clone(), &host, &uri, &token_for(&admin), json!({})).await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    let again = post_json_auth(app.clone(), &host, &uri, &token_for(&admin), json!({})).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let login = post_json(
        app,
        &host,
        "/api/auth/login",
        json!({ "email": "learner@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(login.status(), StatusCode::FORBIDDEN);
}
