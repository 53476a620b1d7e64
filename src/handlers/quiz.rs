// src/handlers/quiz.rs

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    catalog::psych_questions,
    error::AppError,
    models::quiz::SubmitQuizRequest,
    session::Session,
    state::AppState,
    utils::jwt::claims_from_headers,
};

/// Returns the psychometric question bank.
pub async fn get_questions() -> impl IntoResponse {
    let questions = psych_questions();
    Json(json!({
        "total": questions.len(),
        "questions": questions,
    }))
}

/// Classifies a set of answers.
///
/// Authentication is optional: without an `Authorization` header the result
/// is returned unsaved and the client is routed to signup with the result
/// pending. A header carrying a bad or expired token is rejected with 401.
pub async fn submit_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    // A token that is sent must be valid; only a missing header means anonymous.
    let claims = match headers.get(header::AUTHORIZATION) {
        None => None,
        Some(_) => Some(
            claims_from_headers(&headers, &state.config.jwt_secret)
                .ok_or(AppError::AuthError("Invalid or expired token".to_string()))?,
        ),
    };

    let response = Session::new(&state)
        .complete_quiz(claims.as_ref(), payload.answers)
        .await?;

    Ok(Json(response))
}
