// src/models/share.rs

use serde::{Deserialize, Serialize};

use super::{
    catalog::Course,
    personality::Stream,
    result::RoadmapStep,
};

/// Public projection of a student's result; the only record a linked parent reads.
///
/// Every field is optional on read because older or partially written
/// records may lack them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stream: Option<Stream>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub roadmap: Option<Vec<RoadmapStep>>,
    #[serde(default)]
    pub monthly_progress: Option<Vec<u8>>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Roadmap step as seen by a parent: no quiz content at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub id: u32,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub completed: bool,
}

impl From<&RoadmapStep> for StepSummary {
    fn from(step: &RoadmapStep) -> Self {
        Self {
            id: step.id,
            title: step.title.clone(),
            description: step.description.clone(),
            completed: step.completed,
        }
    }
}

/// Share record after read-side reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareView {
    pub name: String,
    pub stream: Option<Stream>,
    pub progress: u8,
    pub progress_detail: String,
    pub monthly_stats: Vec<u8>,
    pub course: String,
    pub roadmap: Vec<StepSummary>,
}

/// Parent dashboard payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentStudentResponse {
    pub student: ShareView,
    pub courses: Vec<Course>,
    pub demo: bool,
}
