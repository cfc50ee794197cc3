//! Handlers for programs (ordered lesson lists) and their admin CRUD.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::catalog::{resolve_slug, validate_lesson_order, validate_title};
use lms_core::error::CoreError;
use lms_core::formatting::duration_label;
use lms_core::progress::percentage;
use lms_core::types::DbId;
use lms_db::models::program::{CreateProgram, Lesson, Program, ProgramSummary, UpdateProgram};
use lms_db::repositories::{ProgramRepo, ProgressRepo, VideoRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireInstructor, TenantUser};
use crate::middleware::tenant::CurrentTenant;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProgramCard {
    #[serde(flatten)]
    pub summary: ProgramSummary,
    pub total_duration_label: String,
}

#[derive(Debug, Serialize)]
pub struct LessonView {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub duration_label: String,
    /// Caller's progress; `None` when anonymous.
    pub percent_complete: Option<f64>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProgramDetail {
    #[serde(flatten)]
    pub program: Program,
    pub lessons: Vec<LessonView>,
    /// Completed lessons over lessons. `None` when anonymous.
    pub percent_complete: Option<f64>,
}

/// Request body for `PUT /admin/programs/{id}/lessons`.
#[derive(Debug, Deserialize)]
pub struct ReplaceLessonsRequest {
    pub video_ids: Vec<DbId>,
}

fn program_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Program",
        id,
    })
}

/// GET /api/lms/programs
pub async fn list(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
) -> AppResult<Json<DataResponse<Vec<ProgramCard>>>> {
    let programs = ProgramRepo::list_published_summaries(&state.pool, tenant.id).await?;
    Ok(Json(DataResponse {
        data: programs
            .into_iter()
            .map(|summary| ProgramCard {
                total_duration_label: duration_label(summary.total_duration_secs),
                summary,
            })
            .collect(),
    }))
}

/// GET /api/lms/programs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    user: Option<TenantUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProgramDetail>>> {
    let program = ProgramRepo::find_published(&state.pool, tenant.id, id)
        .await?
        .ok_or_else(|| program_not_found(id))?;
    let lessons = ProgramRepo::lessons(&state.pool, program.id, true).await?;

    let progress = match &user {
        Some(u) => Some(
            ProgressRepo::for_program(&state.pool, u.user_id, program.id)
                .await?
                .into_iter()
                .map(|row| (row.video_id, row))
                .collect::<HashMap<_, _>>(),
        ),
        None => None,
    };

    let percent_complete = progress.as_ref().map(|by_video| {
        let done = lessons
            .iter()
            .filter(|l| by_video.get(&l.video_id).is_some_and(|p| p.completed))
            .count();
        percentage(done as i64, lessons.len() as i64)
    });

    let lessons = lessons
        .into_iter()
        .map(|lesson| {
            let row = progress.as_ref().map(|p| p.get(&lesson.video_id));
            LessonView {
                duration_label: duration_label(i64::from(lesson.duration_secs)),
                percent_complete: row.map(|r| r.map_or(0.0, |p| p.percent_complete)),
                completed: row.map(|r| r.is_some_and(|p| p.completed)),
                lesson,
            }
        })
        .collect();

    Ok(Json(DataResponse {
        data: ProgramDetail {
            program,
            lessons,
            percent_complete,
        },
    }))
}

/// GET /api/lms/admin/programs
pub async fn admin_list(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
) -> AppResult<Json<DataResponse<Vec<Program>>>> {
    let programs = ProgramRepo::list_all(&state.pool, user.tenant_id()).await?;
    Ok(Json(DataResponse { data: programs }))
}

/// POST /api/lms/admin/programs
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateProgram>,
) -> AppResult<(StatusCode, Json<DataResponse<Program>>)> {
    validate_title(&input.title)?;
    let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
    let program = ProgramRepo::create(&state.pool, user.tenant_id(), &slug, &input).await?;
    tracing::info!(program_id = program.id, tenant_id = program.tenant_id, "Program created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: program })))
}

/// PUT /api/lms/admin/programs/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProgram>,
) -> AppResult<Json<DataResponse<Program>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    let slug = match input.slug.as_deref() {
        Some(s) => Some(resolve_slug(Some(s), "")?),
        None => None,
    };
    let program = ProgramRepo::update(&state.pool, user.tenant_id(), id, slug.as_deref(), &input)
        .await?
        .ok_or_else(|| program_not_found(id))?;
    Ok(Json(DataResponse { data: program }))
}

/// DELETE /api/lms/admin/programs/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProgramRepo::delete(&state.pool, user.tenant_id(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(program_not_found(id))
    }
}

/// PUT /api/lms/admin/programs/{id}/lessons
///
/// Replaces the ordered lesson list. Every video must belong to the tenant.
pub async fn replace_lessons(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<ReplaceLessonsRequest>,
) -> AppResult<Json<DataResponse<Vec<Lesson>>>> {
    let program = ProgramRepo::find_in_tenant(&state.pool, user.tenant_id(), id)
        .await?
        .ok_or_else(|| program_not_found(id))?;

    validate_lesson_order(&input.video_ids)?;
    let owned = VideoRepo::count_in_tenant(&state.pool, user.tenant_id(), &input.video_ids).await?;
    if owned != input.video_ids.len() as i64 {
        return Err(AppError::Core(CoreError::Validation(
            "Every lesson must be a video of this tenant".into(),
        )));
    }

    ProgramRepo::replace_lessons(&state.pool, program.id, &input.video_ids).await?;
    let lessons = ProgramRepo::lessons(&state.pool, program.id, false).await?;
    tracing::info!(
        program_id = program.id,
        lesson_count = lessons.len(),
        "Program lessons replaced"
    );
    Ok(Json(DataResponse { data: lessons }))
}
