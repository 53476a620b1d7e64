// src/models/personality.rs

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Answers to the psychometric quiz.
/// Key: question id. Value: the trait label attached to the chosen option.
pub type AnswerSet = BTreeMap<u32, String>;

/// Personality dimension scored by the quiz.
///
/// Declaration order is the tie-break order for the dominant trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    Analytical,
    Creative,
    Logical,
    Emotional,
    Confident,
    Practical,
}

impl Trait {
    pub const ALL: [Trait; 6] = [
        Trait::Analytical,
        Trait::Creative,
        Trait::Logical,
        Trait::Emotional,
        Trait::Confident,
        Trait::Practical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Trait::Analytical => "Analytical",
            Trait::Creative => "Creative",
            Trait::Logical => "Logical",
            Trait::Emotional => "Emotional",
            Trait::Confident => "Confident",
            Trait::Practical => "Practical",
        }
    }
}

impl FromStr for Trait {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trait::ALL.into_iter().find(|t| t.label() == s).ok_or(())
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Academic/career track assigned to a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stream {
    #[serde(rename = "Science (PCM/B)")]
    Science,
    #[serde(rename = "Commerce")]
    Commerce,
    #[serde(rename = "Arts & Humanities")]
    Arts,
    #[serde(rename = "Vocational & Technical")]
    Vocational,
}

impl Stream {
    pub const ALL: [Stream; 4] = [
        Stream::Science,
        Stream::Commerce,
        Stream::Arts,
        Stream::Vocational,
    ];

    /// Display label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Stream::Science => "Science (PCM/B)",
            Stream::Commerce => "Commerce",
            Stream::Arts => "Arts & Humanities",
            Stream::Vocational => "Vocational & Technical",
        }
    }

    /// URL-safe identifier.
    pub fn slug(self) -> &'static str {
        match self {
            Stream::Science => "science",
            Stream::Commerce => "commerce",
            Stream::Arts => "arts",
            Stream::Vocational => "vocational",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim().to_ascii_lowercase();
        Stream::ALL.into_iter().find(|s| s.slug() == slug)
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-trait answer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TraitTally {
    pub analytical: u32,
    pub creative: u32,
    pub logical: u32,
    pub emotional: u32,
    pub confident: u32,
    pub practical: u32,
}

impl TraitTally {
    pub fn get(&self, t: Trait) -> u32 {
        match t {
            Trait::Analytical => self.analytical,
            Trait::Creative => self.creative,
            Trait::Logical => self.logical,
            Trait::Emotional => self.emotional,
            Trait::Confident => self.confident,
            Trait::Practical => self.practical,
        }
    }

    pub fn increment(&mut self, t: Trait) {
        let slot = match t {
            Trait::Analytical => &mut self.analytical,
            Trait::Creative => &mut self.creative,
            Trait::Logical => &mut self.logical,
            Trait::Emotional => &mut self.emotional,
            Trait::Confident => &mut self.confident,
            Trait::Practical => &mut self.practical,
        };
        *slot += 1;
    }

    /// Trait with the highest count; the earliest in [`Trait::ALL`] wins ties.
    pub fn dominant(&self) -> Trait {
        let mut best = Trait::ALL[0];
        for t in Trait::ALL.into_iter().skip(1) {
            if self.get(t) > self.get(best) {
                best = t;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_serializes_to_display_label() {
        let json = serde_json::to_string(&Stream::Arts).unwrap();
        assert_eq!(json, "\"Arts & Humanities\"");
        let back: Stream = serde_json::from_str("\"Science (PCM/B)\"").unwrap();
        assert_eq!(back, Stream::Science);
    }

    #[test]
    fn slugs_are_case_insensitive() {
        assert_eq!(Stream::from_slug("Vocational"), Some(Stream::Vocational));
        assert_eq!(Stream::from_slug("law"), None);
    }

    #[test]
    fn tally_serializes_with_trait_labels() {
        let mut tally = TraitTally::default();
        tally.increment(Trait::Confident);
        let value = serde_json::to_value(tally).unwrap();
        assert_eq!(value["Confident"], 1);
        assert_eq!(value["Analytical"], 0);
    }

    #[test]
    fn unknown_trait_label_does_not_parse() {
        assert!("Curious".parse::<Trait>().is_err());
        assert_eq!("Practical".parse::<Trait>(), Ok(Trait::Practical));
    }
}
