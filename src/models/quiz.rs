// src/models/quiz.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{personality::AnswerSet, result::ClassificationResult};
use crate::session::View;

/// DTO for submitting the psychometric quiz.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    /// Key: question id. Value: trait label of the chosen option.
    pub answers: AnswerSet,
}

/// Result of a quiz submission plus where the client should go next.
#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub result: ClassificationResult,
    /// False when the caller was anonymous and must sign up to keep the result.
    pub saved: bool,
    pub view: View,
}

/// DTO for a roadmap step assessment.
#[derive(Debug, Deserialize)]
pub struct CompleteStepRequest {
    /// Key: zero-based question index within the step quiz. Value: chosen option.
    pub answers: BTreeMap<usize, String>,
}
