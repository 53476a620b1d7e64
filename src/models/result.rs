// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::personality::{AnswerSet, Stream, Trait, TraitTally};

/// One graded question attached to a roadmap step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    #[serde(rename = "q")]
    pub question: String,
    pub options: Vec<String>,
    /// The option text that counts as correct.
    pub correct: String,
}

/// Milestone in the post-classification guidance plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub id: u32,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quiz: Vec<QuizItem>,
}

/// Outcome of the psychometric quiz, stored as the student's private result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub answers: AnswerSet,
    pub traits: TraitTally,
    pub dominant_trait: Trait,
    pub recommended_stream: Stream,
    pub roadmap: Vec<RoadmapStep>,
    /// Percentage of completed roadmap steps, 0-100.
    pub progress: u8,
    pub monthly_progress: [u8; 4],
    /// Stamped by the store when the result is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// `round(100 * completed / total)` with halves rounded up.
/// Returns `None` for an empty roadmap.
pub fn roadmap_progress(roadmap: &[RoadmapStep]) -> Option<u8> {
    let total = roadmap.len();
    if total == 0 {
        return None;
    }
    let completed = roadmap.iter().filter(|s| s.completed).count();
    // Integer form of Math.round(100 * c / t).
    Some(((200 * completed + total) / (2 * total)) as u8)
}

/// Quiz item as shown to the student (answer key withheld).
#[derive(Debug, Serialize)]
pub struct PublicQuizItem {
    #[serde(rename = "q")]
    pub question: String,
    pub options: Vec<String>,
}

/// Roadmap step as shown to clients.
#[derive(Debug, Serialize)]
pub struct PublicRoadmapStep {
    pub id: u32,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quiz: Vec<PublicQuizItem>,
}

impl From<&RoadmapStep> for PublicRoadmapStep {
    fn from(step: &RoadmapStep) -> Self {
        Self {
            id: step.id,
            title: step.title.clone(),
            description: step.description.clone(),
            completed: step.completed,
            quiz: step
                .quiz
                .iter()
                .map(|q| PublicQuizItem {
                    question: q.question.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }
}

/// Private result returned to its owner, with roadmap answer keys hidden.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResultResponse {
    pub answers: AnswerSet,
    pub traits: TraitTally,
    pub dominant_trait: Trait,
    pub recommended_stream: Stream,
    pub roadmap: Vec<PublicRoadmapStep>,
    pub progress: u8,
    pub monthly_progress: [u8; 4],
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&ClassificationResult> for StudentResultResponse {
    fn from(r: &ClassificationResult) -> Self {
        Self {
            answers: r.answers.clone(),
            traits: r.traits,
            dominant_trait: r.dominant_trait,
            recommended_stream: r.recommended_stream,
            roadmap: r.roadmap.iter().map(PublicRoadmapStep::from).collect(),
            progress: r.progress,
            monthly_progress: r.monthly_progress,
            completed_at: r.completed_at,
        }
    }
}
