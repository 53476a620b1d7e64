// src/sync.rs

//! Keeps the three records derived from one classification consistent.
//!
//! A classification lands in the private result record, the public share
//! record and the profile flag, written in that order. The profile flag is
//! what routes a returning student to the dashboard, so it is only set after
//! both result records exist.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{
    config::{DEFAULT_MONTHLY_PROGRESS, PASS_DENOMINATOR, PASS_NUMERATOR},
    models::{
        personality::Stream,
        result::{ClassificationResult, QuizItem, RoadmapStep, roadmap_progress},
        share::{ShareRecord, ShareView, StepSummary},
        user::{Profile, Role, UserMapEntry, normalize_email},
    },
    store::{DocumentStore, Paths, StoreError, WriteMode, get_as, server_timestamp},
};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no test results recorded for this student")]
    NoResults,

    #[error("roadmap step {0} does not exist")]
    UnknownStep(u32),

    #[error("Student email not found. Please ensure the student has created an account.")]
    StudentNotFound,
}

/// Outcome of one target in the classification fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum WriteStatus {
    Written,
    Failed(String),
    Skipped,
}

/// Per-target report of [`ResultSynchronizer::save_classification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanOutReport {
    pub result: WriteStatus,
    pub share: WriteStatus,
    pub profile: WriteStatus,
}

impl FanOutReport {
    fn pending() -> Self {
        Self {
            result: WriteStatus::Skipped,
            share: WriteStatus::Skipped,
            profile: WriteStatus::Skipped,
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.result, &self.share, &self.profile]
            .iter()
            .all(|s| **s == WriteStatus::Written)
    }

    /// First failure message, if any target failed.
    pub fn failure(&self) -> Option<&str> {
        [&self.result, &self.share, &self.profile]
            .into_iter()
            .find_map(|s| match s {
                WriteStatus::Failed(msg) => Some(msg.as_str()),
                _ => None,
            })
    }
}

/// Score of a roadmap step assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizGrade {
    pub score: usize,
    pub total: usize,
}

impl QuizGrade {
    /// At least half correct. An empty quiz passes.
    pub fn passed(&self) -> bool {
        self.score * PASS_DENOMINATOR >= self.total * PASS_NUMERATOR
    }
}

/// Grades answers keyed by zero-based question index against the quiz key.
pub fn grade_quiz(quiz: &[QuizItem], answers: &BTreeMap<usize, String>) -> QuizGrade {
    let score = quiz
        .iter()
        .enumerate()
        .filter(|(idx, item)| answers.get(idx) == Some(&item.correct))
        .count();

    QuizGrade {
        score,
        total: quiz.len(),
    }
}

/// Result of a step completion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub step_id: u32,
    pub passed: bool,
    pub score: usize,
    pub total: usize,
    /// Progress after the attempt (unchanged on failure).
    pub progress: u8,
    /// True when the share record was missing and had to be recreated.
    pub share_recreated: bool,
    pub message: String,
}

/// A resolved parent -> student link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub linked_student_uid: String,
    pub linked_student_email: String,
    pub student_name: String,
}

/// Builds the public share document written alongside a result.
fn share_document(
    name: &str,
    stream: Stream,
    progress: u8,
    roadmap: &[RoadmapStep],
    monthly: &[u8],
) -> Value {
    json!({
        "name": name,
        "stream": stream,
        "progress": progress,
        "roadmap": roadmap,
        "monthlyProgress": monthly,
        "updatedAt": server_timestamp(),
    })
}

/// Read-side reconciliation of a share record.
///
/// Progress is recomputed from the roadmap completion flags whenever a
/// non-empty roadmap is present; the stored `progress` is only a fallback.
pub fn reconcile_share(record: &ShareRecord) -> ShareView {
    let roadmap = record.roadmap.as_deref().unwrap_or_default();
    let total = roadmap.len();
    let completed = roadmap.iter().filter(|s| s.completed).count();

    let progress = roadmap_progress(roadmap)
        .or(record.progress)
        .unwrap_or(0)
        .min(100);

    let course = match record.stream {
        Some(stream) => {
            let head = stream.label().split(' ').next().unwrap_or_default();
            format!("Recommended: {}", head)
        }
        None => "Recommended: Pending".to_string(),
    };

    ShareView {
        name: record
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Student".to_string()),
        stream: record.stream,
        progress,
        progress_detail: format!("{} of {} Levels Completed", completed, total),
        monthly_stats: record
            .monthly_progress
            .clone()
            .unwrap_or_else(|| vec![0, 0, 0, 0]),
        course,
        roadmap: roadmap.iter().map(StepSummary::from).collect(),
    }
}

/// Write/update protocol over the document store.
pub struct ResultSynchronizer<'a> {
    store: &'a dyn DocumentStore,
    paths: &'a Paths,
}

impl<'a> ResultSynchronizer<'a> {
    pub fn new(store: &'a dyn DocumentStore, paths: &'a Paths) -> Self {
        Self { store, paths }
    }

    /// Full replace of the private result record.
    pub async fn persist_result(
        &self,
        uid: &str,
        result: &ClassificationResult,
    ) -> Result<(), StoreError> {
        let mut doc = serde_json::to_value(result)?;
        if let Value::Object(fields) = &mut doc {
            fields.insert("completedAt".to_string(), server_timestamp());
        }
        self.store
            .put(&self.paths.results(uid), doc, WriteMode::Replace)
            .await
    }

    /// Full replace of the public share record.
    pub async fn publish_share(
        &self,
        uid: &str,
        name: &str,
        result: &ClassificationResult,
    ) -> Result<(), StoreError> {
        let doc = share_document(
            name,
            result.recommended_stream,
            result.progress,
            &result.roadmap,
            &result.monthly_progress,
        );
        self.store
            .put(&self.paths.share(uid), doc, WriteMode::Replace)
            .await
    }

    /// Merges `testTaken = true` and the stream into the profile.
    pub async fn mark_test_taken(&self, uid: &str, stream: Stream) -> Result<(), StoreError> {
        self.store
            .put(
                &self.paths.profile(uid),
                json!({ "testTaken": true, "stream": stream }),
                WriteMode::Merge,
            )
            .await
    }

    /// Private result, then share, then profile flag. Stops at the first failure.
    pub async fn save_classification(
        &self,
        uid: &str,
        name: &str,
        result: &ClassificationResult,
    ) -> FanOutReport {
        let mut report = FanOutReport::pending();

        if let Err(e) = self.persist_result(uid, result).await {
            tracing::error!("Failed to persist results for {}: {:?}", uid, e);
            report.result = WriteStatus::Failed(e.to_string());
            return report;
        }
        report.result = WriteStatus::Written;

        if let Err(e) = self.publish_share(uid, name, result).await {
            tracing::error!("Failed to publish share for {}: {:?}", uid, e);
            report.share = WriteStatus::Failed(e.to_string());
            return report;
        }
        report.share = WriteStatus::Written;

        if let Err(e) = self.mark_test_taken(uid, result.recommended_stream).await {
            tracing::error!("Failed to flag test taken for {}: {:?}", uid, e);
            report.profile = WriteStatus::Failed(e.to_string());
            return report;
        }
        report.profile = WriteStatus::Written;

        tracing::info!(
            "Saved classification for {} ({})",
            uid,
            result.recommended_stream
        );
        report
    }

    pub async fn load_result(&self, uid: &str) -> Result<Option<ClassificationResult>, StoreError> {
        get_as(self.store, &self.paths.results(uid)).await
    }

    pub async fn load_profile(&self, uid: &str) -> Result<Option<Profile>, StoreError> {
        get_as(self.store, &self.paths.profile(uid)).await
    }

    /// Grades a step assessment and, on pass, records completion everywhere.
    pub async fn complete_step(
        &self,
        uid: &str,
        step_id: u32,
        answers: &BTreeMap<usize, String>,
    ) -> Result<StepOutcome, SyncError> {
        let mut result = self.load_result(uid).await?.ok_or(SyncError::NoResults)?;

        let idx = result
            .roadmap
            .iter()
            .position(|s| s.id == step_id)
            .ok_or(SyncError::UnknownStep(step_id))?;

        let grade = grade_quiz(&result.roadmap[idx].quiz, answers);
        if !grade.passed() {
            return Ok(StepOutcome {
                step_id,
                passed: false,
                score: grade.score,
                total: grade.total,
                progress: result.progress,
                share_recreated: false,
                message: format!(
                    "You scored {}/{}. You need at least 50% to pass. Try again!",
                    grade.score, grade.total
                ),
            });
        }

        result.roadmap[idx].completed = true;
        let progress = roadmap_progress(&result.roadmap).unwrap_or(0);

        self.store
            .update(
                &self.paths.results(uid),
                json!({ "roadmap": result.roadmap, "progress": progress }),
            )
            .await?;

        let share_path = self.paths.share(uid);
        let share_update = json!({
            "progress": progress,
            "roadmap": result.roadmap,
            "updatedAt": server_timestamp(),
        });

        let share_recreated = match self.store.update(&share_path, share_update).await {
            Ok(()) => false,
            Err(StoreError::NotFound(_)) => {
                tracing::warn!("Share record missing for {}, recreating", uid);
                let name = self
                    .load_profile(uid)
                    .await?
                    .map(|p| p.name)
                    .unwrap_or_else(|| "Student".to_string());
                let doc = share_document(
                    &name,
                    result.recommended_stream,
                    progress,
                    &result.roadmap,
                    &DEFAULT_MONTHLY_PROGRESS,
                );
                self.store.put(&share_path, doc, WriteMode::Replace).await?;
                true
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Student {} completed roadmap step {}", uid, step_id);

        Ok(StepOutcome {
            step_id,
            passed: true,
            score: grade.score,
            total: grade.total,
            progress,
            share_recreated,
            message: "Great job! Step completed.".to_string(),
        })
    }

    /// Reads and reconciles a student's share record.
    pub async fn load_share_view(&self, student_uid: &str) -> Result<Option<ShareView>, StoreError> {
        let record: Option<ShareRecord> = get_as(self.store, &self.paths.share(student_uid)).await?;
        Ok(record.as_ref().map(reconcile_share))
    }

    /// Publishes the email -> uid lookup entry for a student.
    pub async fn register_lookup(&self, uid: &str, email: &str, name: &str) -> Result<(), StoreError> {
        let email = normalize_email(email);
        let entry = UserMapEntry {
            email: email.clone(),
            uid: uid.to_string(),
            name: name.to_string(),
            role: Role::Student,
        };
        self.store
            .put(
                &self.paths.user_map(&email),
                serde_json::to_value(entry)?,
                WriteMode::Replace,
            )
            .await
    }

    /// Resolves a student by email and points the parent's profile at them.
    /// A miss writes nothing.
    pub async fn link_student(&self, parent_uid: &str, email: &str) -> Result<Link, SyncError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(SyncError::StudentNotFound);
        }

        let entry: UserMapEntry = get_as(self.store, &self.paths.user_map(&email))
            .await?
            .ok_or(SyncError::StudentNotFound)?;

        self.store
            .update(
                &self.paths.profile(parent_uid),
                json!({
                    "linkedStudentUid": entry.uid,
                    "linkedStudentEmail": email,
                }),
            )
            .await?;

        tracing::info!("Parent {} linked to student {}", parent_uid, entry.uid);

        Ok(Link {
            linked_student_uid: entry.uid,
            linked_student_email: email,
            student_name: entry.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(correct: &str) -> QuizItem {
        QuizItem {
            question: "Q".into(),
            options: vec!["A".into(), "B".into()],
            correct: correct.into(),
        }
    }

    fn answers(pairs: &[(usize, &str)]) -> BTreeMap<usize, String> {
        pairs.iter().map(|(i, a)| (*i, a.to_string())).collect()
    }

    #[test]
    fn test_grade_half_passes() {
        let quiz = vec![item("A"), item("A"), item("A"), item("A")];
        let grade = grade_quiz(&quiz, &answers(&[(0, "A"), (1, "A"), (2, "B"), (3, "B")]));
        assert_eq!(grade, QuizGrade { score: 2, total: 4 });
        assert!(grade.passed());
    }

    #[test]
    fn test_grade_quarter_fails() {
        let quiz = vec![item("A"), item("A"), item("A"), item("A")];
        let grade = grade_quiz(&quiz, &answers(&[(0, "A"), (1, "B")]));
        assert_eq!(grade.score, 1);
        assert!(!grade.passed());
    }

    #[test]
    fn test_grade_ignores_out_of_range_indexes() {
        let quiz = vec![item("A"), item("B")];
        let grade = grade_quiz(&quiz, &answers(&[(5, "A"), (1, "B")]));
        assert_eq!(grade, QuizGrade { score: 1, total: 2 });
    }

    #[test]
    fn test_empty_quiz_passes() {
        assert!(grade_quiz(&[], &BTreeMap::new()).passed());
    }

    fn step(id: u32, completed: bool) -> RoadmapStep {
        RoadmapStep {
            id,
            title: format!("Step {}", id),
            description: String::new(),
            completed,
            quiz: vec![item("A")],
        }
    }

    #[test]
    fn test_reconcile_overrides_stale_progress() {
        let record = ShareRecord {
            name: Some("Asha".into()),
            stream: Some(Stream::Commerce),
            progress: Some(30),
            roadmap: Some(vec![step(1, true), step(2, true), step(3, false), step(4, false)]),
            monthly_progress: Some(vec![20, 35, 45, 60]),
            updated_at: None,
        };
        let view = reconcile_share(&record);
        assert_eq!(view.progress, 50);
        assert_eq!(view.progress_detail, "2 of 4 Levels Completed");
        assert_eq!(view.course, "Recommended: Commerce");
        assert_eq!(view.roadmap.len(), 4);
    }

    #[test]
    fn test_reconcile_without_roadmap_uses_stored_progress() {
        let record = ShareRecord {
            progress: Some(40),
            ..Default::default()
        };
        let view = reconcile_share(&record);
        assert_eq!(view.progress, 40);
        assert_eq!(view.name, "Student");
        assert_eq!(view.monthly_stats, vec![0, 0, 0, 0]);
        assert_eq!(view.course, "Recommended: Pending");
        assert_eq!(view.progress_detail, "0 of 0 Levels Completed");
    }

    #[test]
    fn test_reconcile_defaults_to_zero() {
        assert_eq!(reconcile_share(&ShareRecord::default()).progress, 0);
    }

    #[test]
    fn test_course_uses_first_word_of_stream() {
        let record = ShareRecord {
            stream: Some(Stream::Science),
            ..Default::default()
        };
        assert_eq!(reconcile_share(&record).course, "Recommended: Science");
    }

    #[test]
    fn test_fan_out_report_failure() {
        let report = FanOutReport {
            result: WriteStatus::Written,
            share: WriteStatus::Failed("boom".into()),
            profile: WriteStatus::Skipped,
        };
        assert!(!report.is_complete());
        assert_eq!(report.failure(), Some("boom"));
    }
}
