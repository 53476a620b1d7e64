// src/handlers/catalog.rs

use axum::{Json, extract::Path, response::IntoResponse};

use crate::{
    catalog::{roadmap_template, stream_guide},
    error::AppError,
    models::{personality::Stream, result::PublicRoadmapStep},
};

/// The roadmap every new result starts from, without answer keys.
pub async fn get_roadmap() -> impl IntoResponse {
    let steps: Vec<PublicRoadmapStep> = roadmap_template()
        .iter()
        .map(PublicRoadmapStep::from)
        .collect();
    Json(steps)
}

pub async fn get_stream_guide(Path(slug): Path<String>) -> Result<impl IntoResponse, AppError> {
    let stream = Stream::from_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown stream '{}'", slug)))?;

    Ok(Json(stream_guide(stream)))
}
