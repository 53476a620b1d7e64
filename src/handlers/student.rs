// src/handlers/student.rs

use std::convert::Infallible;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use tokio_stream::{StreamExt, wrappers::ReceiverStream};

use crate::{
    catalog::stream_guide,
    error::AppError,
    models::{
        quiz::CompleteStepRequest,
        result::{ClassificationResult, StudentResultResponse},
    },
    state::AppState,
    sync::{ResultSynchronizer, SyncError},
    utils::jwt::Claims,
};

/// The signed-in student's saved result, with step quiz answers stripped.
pub async fn get_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let result = ResultSynchronizer::new(state.store.as_ref(), &state.paths)
        .load_result(&claims.sub)
        .await?
        .ok_or(SyncError::NoResults)?;

    Ok(Json(StudentResultResponse::from(&result)))
}

/// Live feed of the student's result record as server-sent events.
///
/// The current record is sent first, then every later write to it.
pub async fn stream_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let rx = state
        .store
        .subscribe(&state.paths.results(&claims.sub))
        .await?;

    let uid = claims.sub;
    let events = ReceiverStream::new(rx).filter_map(move |doc| {
        match serde_json::from_value::<ClassificationResult>(doc) {
            Ok(result) => Event::default()
                .event("result")
                .json_data(StudentResultResponse::from(&result))
                .ok()
                .map(Ok::<_, Infallible>),
            Err(e) => {
                tracing::warn!("Skipping unreadable result for {}: {}", uid, e);
                None
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Grades a roadmap step's assessment; on pass the step is completed and
/// progress recomputed in both the private and shared records.
pub async fn complete_step(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(step_id): Path<u32>,
    Json(payload): Json<CompleteStepRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = ResultSynchronizer::new(state.store.as_ref(), &state.paths)
        .complete_step(&claims.sub, step_id, &payload.answers)
        .await?;

    Ok(Json(outcome))
}

/// Courses, jobs, colleges and scholarships for the student's stream.
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let result = ResultSynchronizer::new(state.store.as_ref(), &state.paths)
        .load_result(&claims.sub)
        .await?
        .ok_or(SyncError::NoResults)?;

    Ok(Json(stream_guide(result.recommended_stream)))
}
