// src/classifier.rs

//! Maps psychometric answers to a trait tally, a dominant trait and a stream.

use crate::{
    catalog::roadmap_template,
    config::DEFAULT_MONTHLY_PROGRESS,
    models::{
        personality::{AnswerSet, Stream, Trait, TraitTally},
        result::ClassificationResult,
    },
};

/// Count at which a single trait overrides the dominant-trait rule.
pub const STRONG_TRAIT_THRESHOLD: u32 = 4;

/// Counts one point per answer whose label is a known trait.
/// Unknown labels are ignored.
pub fn tally(answers: &AnswerSet) -> TraitTally {
    let mut tally = TraitTally::default();
    for label in answers.values() {
        if let Ok(t) = label.parse::<Trait>() {
            tally.increment(t);
        }
    }
    tally
}

/// Two-tier stream rule.
///
/// Strong traits are checked first in a fixed order; only when none reaches
/// the threshold does the dominant trait decide.
pub fn recommend_stream(tally: &TraitTally, dominant: Trait) -> Stream {
    let strong = |t: Trait| tally.get(t) >= STRONG_TRAIT_THRESHOLD;

    if strong(Trait::Practical) {
        Stream::Vocational
    } else if strong(Trait::Analytical) || strong(Trait::Logical) {
        Stream::Science
    } else if strong(Trait::Confident) {
        Stream::Commerce
    } else if strong(Trait::Creative) || strong(Trait::Emotional) {
        Stream::Arts
    } else {
        match dominant {
            Trait::Practical => Stream::Vocational,
            Trait::Analytical | Trait::Logical => Stream::Science,
            Trait::Confident => Stream::Commerce,
            Trait::Creative | Trait::Emotional => Stream::Arts,
        }
    }
}

/// Classifies a (possibly partial) answer set.
///
/// Total and deterministic: an empty set yields Analytical / Science.
pub fn classify(answers: &AnswerSet) -> ClassificationResult {
    let traits = tally(answers);
    let dominant_trait = traits.dominant();
    let recommended_stream = recommend_stream(&traits, dominant_trait);

    ClassificationResult {
        answers: answers.clone(),
        traits,
        dominant_trait,
        recommended_stream,
        roadmap: roadmap_template(),
        progress: 0,
        monthly_progress: DEFAULT_MONTHLY_PROGRESS,
        completed_at: None,
    }
}
