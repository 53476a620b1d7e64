// src/models/catalog.rs

use serde::Serialize;

use super::personality::Stream;

/// One option of a psychometric question.
#[derive(Debug, Clone, Serialize)]
pub struct PsychOption {
    pub id: &'static str,
    pub icon: &'static str,
    pub text: &'static str,
    /// Trait label recorded when this option is chosen.
    #[serde(rename = "trait")]
    pub trait_label: &'static str,
}

/// Question in the psychometric quiz bank.
#[derive(Debug, Clone, Serialize)]
pub struct PsychQuestion {
    pub id: u32,
    pub question: &'static str,
    pub options: Vec<PsychOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub name: &'static str,
    /// "High" or "Medium".
    pub suitability: &'static str,
    pub scholarships: &'static str,
    pub duration: &'static str,
    pub background: &'static str,
    pub skills: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub title: &'static str,
    pub salary: &'static str,
    pub growth: &'static str,
    pub desc: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct College {
    pub name: &'static str,
    pub fees: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scholarship {
    pub name: &'static str,
    pub amount: &'static str,
    pub eligibility: &'static str,
}

/// Recommendations shown for one stream.
#[derive(Debug, Clone, Serialize)]
pub struct StreamGuide {
    pub stream: Stream,
    pub description: &'static str,
    pub courses: Vec<Course>,
    pub jobs: Vec<Job>,
    pub colleges: Vec<College>,
    pub scholarships_ongoing: Vec<Scholarship>,
}
