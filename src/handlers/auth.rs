// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::user::{LoginRequest, RegisterRequest},
    session::{AuthIntent, Session},
    state::AppState,
    utils::jwt::Claims,
};

/// Creates an account.
///
/// Students get an email lookup entry so parents can find them. A parent may
/// pass `student_email` to link immediately, and a student may pass
/// `pending_answers` from an anonymous quiz to have them saved.
/// Returns 201 Created with the token and the next view.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = Session::new(&state)
        .authenticate(AuthIntent::Signup(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Authenticates an account and returns a JWT token plus the next view.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = Session::new(&state)
        .authenticate(AuthIntent::Login(payload))
        .await?;

    Ok(Json(outcome))
}

pub async fn logout() -> impl IntoResponse {
    Json(json!({
        "message": "Logged out",
        "view": Session::logout(),
    }))
}

/// Routes a returning client based on its token and stored profile.
pub async fn session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let info = Session::new(&state).bootstrap(&claims).await;
    Ok(Json(info))
}
