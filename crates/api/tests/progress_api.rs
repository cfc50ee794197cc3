//! Progress reporting, completion events and program roll-ups.

mod common;

use axum::http::StatusCode;
use common::*;
use lms_events::event_types;
use serde_json::json;
use sqlx::PgPool;

struct Fixture {
    app: TestApp,
    host: String,
    instructor_token: String,
    member_token: String,
    member_id: i64,
}

async fn fixture(pool: PgPool) -> Fixture {
    let tenant = seed_tenant(&pool, "acme").await;
    let instructor = seed_user(&pool, Some(tenant.id), "coach@example.com", "instructor").await;
    let member = seed_user(&pool, Some(tenant.id), "learner@example.com", "member").await;
    Fixture {
        app: build_test_harness(pool),
        host: host_for("acme"),
        instructor_token: token_for(&instructor),
        member_token: token_for(&member),
        member_id: member.id,
    }
}

async fn published_video(f: &Fixture, title: &str, duration: i32) -> i64 {
    create_video(
        f.app.router.clone(),
        &f.host,
        &f.instructor_token,
        json!({
            "title": title,
            "playback_url": "https://cdn.example.com/v.m3u8",
            "duration_secs": duration,
            "is_published": true
        }),
    )
    .await
}

async fn report(f: &Fixture, video_id: i64, position: f64) -> serde_json::Value {
    let response = post_json_auth(
        f.app.router.clone(),
        &f.host,
        &format!("/api/lms/videos/{video_id}/progress"),
        &f.member_token,
        json!({ "position_secs": position }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn crossing_threshold_completes_once_and_publishes(pool: PgPool) {
    let f = fixture(pool).await;
    let video = published_video(&f, "Breathing", 100).await;
    let mut rx = f.app.event_bus.subscribe();

    let first = report(&f, video, 40.0).await;
    assert_eq!(first["data"]["percent_complete"], 40.0);
    assert_eq!(first["data"]["completed"], false);
    assert_eq!(first["data"]["newly_completed"], false);

    let done = report(&f, video, 95.0).await;
    assert_eq!(done["data"]["completed"], true);
    assert_eq!(done["data"]["newly_completed"], true);

    let again = report(&f, video, 99.0).await;
    assert_eq!(again["data"]["newly_completed"], false);

    let event = rx.try_recv().expect("completion event should be published");
    assert_eq!(event.event_type, event_types::VIDEO_COMPLETED);
    assert_eq!(event.actor_user_id, Some(f.member_id));
    assert_eq!(event.payload["title"], "Breathing");
    assert!(rx.try_recv().is_err(), "only one completion event expected");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_reports_publish_one_completion(pool: PgPool) {
    let f = fixture(pool).await;
    let mut rx = f.app.event_bus.subscribe();

    for n in 0..10 {
        let video = published_video(&f, &format!("Race {n}"), 100).await;
        let (a, b) = tokio::join!(report(&f, video, 95.0), report(&f, video, 96.0));

        assert_eq!(a["data"]["completed"], true);
        assert_eq!(b["data"]["completed"], true);
        let winners = [&a, &b]
            .iter()
            .filter(|r| r["data"]["newly_completed"] == true)
            .count();
        assert_eq!(winners, 1, "video {video} completed by both reports");
    }

    let mut completions = 0;
    while let Ok(event) = rx.try_recv() {
        if event.event_type == event_types::VIDEO_COMPLETED {
            completions += 1;
        }
    }
    assert_eq!(completions, 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn scrubbing_back_keeps_furthest_position(pool: PgPool) {
    let f = fixture(pool).await;
    let video = published_video(&f, "Breathing", 200).await;

    report(&f, video, 150.0).await;
    let back = report(&f, video, 10.0).await;
    assert_eq!(back["data"]["position_secs"], 150.0);
    assert_eq!(back["data"]["percent_complete"], 75.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_reports_are_rejected(pool: PgPool) {
    let f = fixture(pool).await;
    let video = published_video(&f, "Breathing", 100).await;

    let response = post_json_auth(
        f.app.router.clone(),
        &f.host,
        &format!("/api/lms/videos/{video}/progress"),
        &f.member_token,
        json!({ "position_secs": -5.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let anonymous = post_json(
        f.app.router.clone(),
        &f.host,
        &format!("/api/lms/videos/{video}/progress"),
        json!({ "position_secs": 5.0 }),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_and_program_rollup(pool: PgPool) {
    let f = fixture(pool).await;
    let a = published_video(&f, "Lesson A", 100).await;
    let b = published_video(&f, "Lesson B", 100).await;

    let program = post_json_auth(
        f.app.router.clone(),
        &f.host,
        "/api/lms/admin/programs",
        &f.instructor_token,
        json!({ "title": "Foundations", "is_published": true }),
    )
    .await;
    assert_eq!(program.status(), StatusCode::CREATED);
    let program_id = body_json(program).await["data"]["id"].as_i64().unwrap();

    let lessons = put_json_auth(
        f.app.router.clone(),
        &f.host,
        &format!("/api/lms/admin/programs/{program_id}/lessons"),
        &f.instructor_token,
        json!({ "video_ids": [b, a] }),
    )
    .await;
    assert_eq!(lessons.status(), StatusCode::OK);
    let lessons = body_json(lessons).await;
    assert_eq!(lessons["data"][0]["video_id"], b);

    report(&f, a, 100.0).await;
    report(&f, b, 30.0).await;

    let detail = body_json(
        get_auth(
            f.app.router.clone(),
            &f.host,
            &format!("/api/lms/programs/{program_id}"),
            &f.member_token,
        )
        .await,
    )
    .await;
    assert_eq!(detail["data"]["percent_complete"], 50.0);
    assert_eq!(detail["data"]["lessons"][1]["completed"], true);

    let summary = body_json(
        get_auth(f.app.router.clone(), &f.host, "/api/lms/progress/summary", &f.member_token).await,
    )
    .await;
    assert_eq!(summary["data"]["videos_started"], 2);
    assert_eq!(summary["data"]["videos_completed"], 1);
    assert_eq!(summary["data"]["total_watch_secs"], 130.0);
    assert_eq!(summary["data"]["programs_completed"], 0);

    report(&f, b, 100.0).await;
    let summary = body_json(
        get_auth(f.app.router.clone(), &f.host, "/api/lms/progress/summary", &f.member_token).await,
    )
    .await;
    assert_eq!(summary["data"]["programs_completed"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lessons_must_belong_to_the_tenant(pool: PgPool) {
    let f = fixture(pool).await;
    let a = published_video(&f, "Lesson A", 100).await;

    let program = post_json_auth(
        f.app.router.clone(),
        &f.host,
        "/api/lms/admin/programs",
        &f.instructor_token,
        json!({ "title": "Foundations" }),
    )
    .await;
    let program_id = body_json(program).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/lms/admin/programs/{program_id}/lessons");

    let missing = put_json_auth(
        f.app.router.clone(),
        &f.host,
        &uri,
        &f.instructor_token,
        json!({ "video_ids": [a, 999_999] }),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let duplicate = put_json_auth(
        f.app.router.clone(),
        &f.host,
        &uri,
        &f.instructor_token,
        json!({ "video_ids": [a, a] }),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
}
