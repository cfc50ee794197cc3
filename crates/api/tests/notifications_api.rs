//! Comments flowing through the event bus into notification feeds.

mod common;

use axum::http::StatusCode;
use common::*;
use lms_api::notifications::{NotificationRouter, KIND_COMMENT};
use lms_events::{event_types, PlatformEvent};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn comment_notifies_the_video_owner(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let instructor = seed_user(&pool, Some(tenant.id), "coach@example.com", "instructor").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let harness = build_test_harness(pool.clone());
    let host = host_for("acme");
    let coach_token = token_for(&instructor);

    let video = create_video(
        harness.router.clone(),
        &host,
        &coach_token,
        json!({ "title": "Breathing", "playback_url": "https://cdn.example.com/b.m3u8", "is_published": true }),
    )
    .await;

    let mut rx = harness.event_bus.subscribe();
    let created = post_json_auth(
        harness.router.clone(),
        &host,
        &format!("/api/lms/videos/{video}/comments"),
        &token_for(&member),
        json!({ "body": "  Loved this one!  " }),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(body_json(created).await["data"]["body"], "Loved this one!");

    let event = rx.try_recv().expect("comment event should be published");
    assert_eq!(event.event_type, event_types::COMMENT_CREATED);

    let router = NotificationRouter::new(pool.clone());
    let notification = router
        .handle_event(&event)
        .await
        .unwrap()
        .expect("owner should be notified");
    assert_eq!(notification.user_id, instructor.id);
    assert_eq!(notification.kind, KIND_COMMENT);
    assert_eq!(notification.link.as_deref(), Some("/videos/breathing"));

    let feed = body_json(
        get_auth(harness.router.clone(), &host, "/api/lms/notifications", &coach_token).await,
    )
    .await;
    assert_eq!(feed["unread_count"], 1);
    assert_eq!(feed["data"][0]["id"], notification.id);

    let read = post_json_auth(
        harness.router.clone(),
        &host,
        &format!("/api/lms/notifications/{}/read", notification.id),
        &coach_token,
        json!({}),
    )
    .await;
    assert_eq!(read.status(), StatusCode::NO_CONTENT);

    let feed = body_json(
        get_auth(harness.router.clone(), &host, "/api/lms/notifications", &coach_token).await,
    )
    .await;
    assert_eq!(feed["unread_count"], 0);

    // Another user's notification is invisible to the member.
    let foreign = post_json_auth(
        harness.router,
        &host,
        &format!("/api/lms/notifications/{}/read", notification.id),
        &token_for(&member),
        json!({}),
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn commenting_on_own_video_notifies_nobody(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let instructor = seed_user(&pool, Some(tenant.id), "coach@example.com", "instructor").await;
    let harness = build_test_harness(pool.clone());
    let host = host_for("acme");
    let token = token_for(&instructor);

    let video = create_video(
        harness.router.clone(),
        &host,
        &token,
        json!({ "title": "Breathing", "playback_url": "https://cdn.example.com/b.m3u8", "is_published": true }),
    )
    .await;

    let mut rx = harness.event_bus.subscribe();
    post_json_auth(
        harness.router,
        &host,
        &format!("/api/lms/videos/{video}/comments"),
        &token,
        json!({ "body": "Pinned: bring a mat" }),
    )
    .await;
    let event = rx.try_recv().unwrap();

    let result = NotificationRouter::new(pool).handle_event(&event).await.unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_events_are_ignored(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let router = NotificationRouter::new(pool);

    let event = PlatformEvent::new("tenant.renamed", tenant.id);
    assert!(router.handle_event(&event).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_all_read_clears_the_badge(pool: PgPool) {
    let tenant = seed_tenant(&pool, "acme").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    let router = NotificationRouter::new(pool.clone());
    let app = build_test_app(pool);
    let host = host_for("acme");
    let token = token_for(&member);

    for title in ["First", "Second"] {
        let event = PlatformEvent::new(event_types::VIDEO_COMPLETED, tenant.id)
            .with_actor(member.id)
            .with_payload(json!({ "video_id": 1, "title": title, "slug": "x" }));
        router.handle_event(&event).await.unwrap();
    }

    let unread = body_json(
        get_auth(app.clone(), &host, "/api/lms/notifications?unread_only=true", &token).await,
    )
    .await;
    assert_eq!(unread["data"].as_array().unwrap().len(), 2);

    let response = post_json_auth(app.clone(), &host, "/api/lms/notifications/read-all", &token, json!({})).await;
    assert_eq!(body_json(response).await["updated"], 2);

    let feed = body_json(get_auth(app, &host, "/api/lms/notifications", &token).await).await;
    assert_eq!(feed["unread_count"], 0);
    assert_eq!(feed["data"].as_array().unwrap().len(), 2);
}
