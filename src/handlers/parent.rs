// src/handlers/parent.rs

use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    catalog::{demo_share, stream_guide},
    error::AppError,
    models::{
        share::{ParentStudentResponse, ShareView},
        user::LinkStudentRequest,
    },
    state::AppState,
    sync::{ResultSynchronizer, reconcile_share},
    utils::jwt::Claims,
};

fn with_courses(student: ShareView, demo: bool) -> ParentStudentResponse {
    let courses = student
        .stream
        .map(|stream| stream_guide(stream).courses)
        .unwrap_or_default();

    ParentStudentResponse {
        student,
        courses,
        demo,
    }
}

/// Links the parent to a student by the student's account email.
pub async fn link_student(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<LinkStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let link = ResultSynchronizer::new(state.store.as_ref(), &state.paths)
        .link_student(&claims.sub, &payload.email)
        .await?;

    Ok(Json(link))
}

/// The linked student's reconciled share record and stream courses.
pub async fn get_student(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let sync = ResultSynchronizer::new(state.store.as_ref(), &state.paths);

    let profile = sync
        .load_profile(&claims.sub)
        .await?
        .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    let student_uid = profile
        .linked_student_uid
        .ok_or(AppError::NotFound("No student linked".to_string()))?;

    let student = sync.load_share_view(&student_uid).await?.ok_or_else(|| {
        AppError::NotFound("Linked student has no results yet".to_string())
    })?;

    Ok(Json(with_courses(student, false)))
}

/// A fixed sample student for parents without a link.
pub async fn get_demo() -> impl IntoResponse {
    Json(with_courses(reconcile_share(&demo_share()), true))
}
