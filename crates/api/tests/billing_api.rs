//! Checkout, webhook verification and subscription state.

mod common;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::*;
use lms_api::handlers::billing::SIGNATURE_HEADER;
use lms_core::billing::compute_signature;
use lms_db::repositories::SubscriptionRepo;
use lms_events::event_types;
use serde_json::json;
use sqlx::PgPool;

async fn create_product(app: axum::Router, host: &str, admin_token: &str) -> i64 {
    let response = post_json_auth(
        app,
        host,
        "/api/lms/admin/products",
        admin_token,
        json!({
            "name": "Monthly",
            "stripe_price_id": "price_monthly",
            "price_cents": 1900,
            "billing_interval": "month"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn signed_webhook(payload: &serde_json::Value, secret: &str) -> Request<Body> {
    let body = payload.to_string();
    let ts = Utc::now().timestamp();
    let sig = compute_signature(secret, ts, body.as_bytes());
    Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .header(CONTENT_TYPE, "application/json")
        .header(SIGNATURE_HEADER, format!("t={ts},v1={sig}"))
        .body(Body::from(body))
        .unwrap()
}

fn checkout_completed(tenant_id: i64, user_id: i64, product_id: i64) -> serde_json::Value {
    json!({
        "id": "evt_checkout",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_1",
            "customer": "cus_1",
            "subscription": "sub_1",
            "client_reference_id": user_id.to_string(),
            "metadata": {
                "tenant_id": tenant_id.to_string(),
                "user_id": user_id.to_string(),
                "product_id": product_id.to_string()
            }
        }}
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn products_list_shows_price_labels(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let admin = seed_user(&pool, Some(tenant.id), "admin@example.com", "admin").await;
    let app = build_test_app(pool);
    let host = host_for("acme");

    create_product(app.clone(), &host, &token_for(&admin)).await;

    let json = body_json(get(app, &host, "/api/lms/products").await).await;
    assert_eq!(json["data"][0]["price_label"], "$19.00 / month");
    assert!(json["data"][0].get("stripe_price_id").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn checkout_sends_tenant_metadata(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let admin = seed_user(&pool, Some(tenant.id), "admin@example.com", "admin").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let harness = build_test_harness(pool);
    let host = host_for("acme");
    let product = create_product(harness.router.clone(), &host, &token_for(&admin)).await;

    let response = post_json_auth(
        harness.router.clone(),
        &host,
        "/api/stripe/create-tenant-checkout-session",
        &token_for(&member),
        json!({ "product_id": product }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["url"], "https://checkout.test/session");

    let calls = harness.payments.checkouts.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.price_id, "price_monthly");
    assert_eq!(call.mode, "subscription");
    assert_eq!(call.customer_email.as_deref(), Some("learner@example.com"));
    assert!(call.success_url.starts_with("http://localhost:5173/billing/success"));
    assert!(call
        .metadata
        .contains(&("tenant_id".to_string(), tenant.id.to_string())));
    assert!(call
        .metadata
        .contains(&("user_id".to_string(), member.id.to_string())));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn checkout_for_unknown_product_is_404(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app,
        &host_for("acme"),
        "/api/stripe/create-tenant-checkout-session",
        &token_for(&member),
        json!({ "product_id": 424242 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhook_activates_and_blocks_second_checkout(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let admin = seed_user(&pool, Some(tenant.id), "admin@example.com", "admin").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let harness = build_test_harness(pool.clone());
    let host = host_for("acme");
    let product = create_product(harness.router.clone(), &host, &token_for(&admin)).await;
    let mut rx = harness.event_bus.subscribe();

    let response = send(
        harness.router.clone(),
        signed_webhook(&checkout_completed(tenant.id, member.id, product), WEBHOOK_SECRET),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["received"], true);

    let sub = SubscriptionRepo::find_for_user(&pool, tenant.id, member.id)
        .await
        .unwrap()
        .expect("subscription should exist");
    assert_eq!(sub.status, "active");
    assert_eq!(sub.stripe_customer_id.as_deref(), Some("cus_1"));
    assert_eq!(sub.product_id, Some(product));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event_type, event_types::SUBSCRIPTION_ACTIVATED);

    let current = body_json(
        get_auth(harness.router.clone(), &host, "/api/lms/billing/subscription", &token_for(&member)).await,
    )
    .await;
    assert_eq!(current["data"]["status"], "active");

    let again = post_json_auth(
        harness.router.clone(),
        &host,
        "/api/stripe/create-tenant-checkout-session",
        &token_for(&member),
        json!({ "product_id": product }),
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let portal = post_json_auth(
        harness.router,
        &host,
        "/api/stripe/create-portal-session",
        &token_for(&member),
        json!({}),
    )
    .await;
    assert_eq!(portal.status(), StatusCode::OK);
    assert_eq!(body_json(portal).await["url"], "https://billing.test/portal");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn subscription_deleted_cancels(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let app = build_test_app(pool.clone());

    let activate = json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "customer": "cus_1",
            "subscription": "sub_1",
            "metadata": { "tenant_id": tenant.id.to_string(), "user_id": member.id.to_string() }
        }}
    });
    send(app.clone(), signed_webhook(&activate, WEBHOOK_SECRET)).await;

    let deleted = json!({
        "id": "evt_2",
        "type": "customer.subscription.deleted",
        "data": { "object": {
            "id": "sub_1",
            "status": "active",
            "current_period_end": 1_900_000_000,
            "cancel_at_period_end": false
        }}
    });
    let response = send(app, signed_webhook(&deleted, WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sub = SubscriptionRepo::find_for_user(&pool, tenant.id, member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sub.status, "canceled");
    assert!(sub.current_period_end.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhook_with_bad_signature_is_rejected(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let app = build_test_app(pool.clone());

    let response = send(
        app.clone(),
        signed_webhook(&checkout_completed(tenant.id, member.id, 1), "whsec_wrong"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unsigned = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .body(Body::from("{}"))
        .unwrap();
    assert_eq!(send(app, unsigned).await.status(), StatusCode::BAD_REQUEST);

    let sub = SubscriptionRepo::find_for_user(&pool, tenant.id, member.id)
        .await
        .unwrap();
    assert!(sub.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_events_and_foreign_metadata_are_acknowledged(pool: PgPool) {
    let acme = seed_tenant(&pool, "acme").await;
    let beta = seed_tenant(&pool, "beta").await;
    let member = seed_user(&pool, Some(acme.id), "learner@example.com", "member").await;
    let app = build_test_app(pool.clone());

    let unknown = json!({ "id": "evt_x", "type": "invoice.paid", "data": { "object": {} } });
    let response = send(app.clone(), signed_webhook(&unknown, WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // User belongs to acme but metadata claims beta.
    let mismatched = checkout_completed(beta.id, member.id, 1);
    let response = send(app, signed_webhook(&mismatched, WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(SubscriptionRepo::find_for_user(&pool, beta.id, member.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unmapped_subscription_status_is_acknowledged_and_ignored(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let app = build_test_app(pool.clone());

    let activate = json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "customer": "cus_1",
            "subscription": "sub_1",
            "metadata": { "tenant_id": tenant.id.to_string(), "user_id": member.id.to_string() }
        }}
    });
    send(app.clone(), signed_webhook(&activate, WEBHOOK_SECRET)).await;

    let updated = json!({
        "id": "evt_2",
        "type": "customer.subscription.updated",
        "data": { "object": { "id": "sub_1", "status": "on_hold" } }
    });
    let response = send(app, signed_webhook(&updated, WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["received"], true);

    let sub = SubscriptionRepo::find_for_user(&pool, tenant.id, member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sub.status, "active");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhook_without_configured_secret_is_a_server_fault(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let mut config = test_config();
    config.stripe.webhook_secret = None;
    let app = build_test_harness_with_config(pool, config).router;

    let response = send(
        app,
        signed_webhook(&checkout_completed(tenant.id, member.id, 1), WEBHOOK_SECRET),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "INTERNAL_ERROR");
}
