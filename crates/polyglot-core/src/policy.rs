//! Title replacement policy.
//!
//! Given the title an upstream API served and the canonical oEmbed title,
//! decide whether the displayed title should be swapped.

use std::fmt;

/// Similarity above which two titles are treated as the same title.
const SIMILARITY_THRESHOLD: f64 = 0.9;

/// Inputs to [`decide`]. Languages come from [`crate::detect::detect`].
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub current_title: &'a str,
    pub oembed_title: Option<&'a str>,
    pub current_lang: Option<&'a str>,
    pub current_confidence: f32,
    pub oembed_lang: Option<&'a str>,
    pub oembed_confidence: f32,
}

/// Why a title was kept or replaced.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionReason {
    NoCandidate,
    Identical,
    CandidateBlank,
    AlreadySimilar(f64),
    LanguageMismatch { current: String, candidate: String },
    TitlesDiffer,
    NoClearDifference,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidate => write!(f, "no oEmbed title"),
            Self::Identical => write!(f, "titles identical"),
            Self::CandidateBlank => write!(f, "oEmbed title empty"),
            Self::AlreadySimilar(s) => write!(f, "titles already similar ({:.1}%)", s * 100.0),
            Self::LanguageMismatch { current, candidate } => {
                write!(f, "language mismatch: {current} vs {candidate}")
            }
            Self::TitlesDiffer => write!(f, "titles differ (case-insensitive)"),
            Self::NoClearDifference => write!(f, "no clear difference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub should_replace: bool,
    pub reason: DecisionReason,
}

impl Decision {
    fn keep(reason: DecisionReason) -> Self {
        Self {
            should_replace: false,
            reason,
        }
    }

    fn replace(reason: DecisionReason) -> Self {
        Self {
            should_replace: true,
            reason,
        }
    }

    /// Log tag: `REPLACE` or `KEEP`.
    pub fn tag(&self) -> &'static str {
        if self.should_replace {
            "REPLACE"
        } else {
            "KEEP"
        }
    }
}

/// Decide whether `oembed_title` should replace `current_title`.
///
/// Rules, first match wins: no candidate, identical, blank candidate and
/// near-identical (similarity > 0.9) all keep; detected languages that
/// differ replace; titles that differ beyond case replace.
pub fn decide(input: &DecisionInput<'_>) -> Decision {
    let Some(candidate) = input.oembed_title else {
        return Decision::keep(DecisionReason::NoCandidate);
    };

    if input.current_title == candidate {
        return Decision::keep(DecisionReason::Identical);
    }

    if candidate.trim().is_empty() {
        return Decision::keep(DecisionReason::CandidateBlank);
    }

    let sim = similarity(input.current_title, candidate);
    if sim > SIMILARITY_THRESHOLD {
        return Decision::keep(DecisionReason::AlreadySimilar(sim));
    }

    if let (Some(current), Some(detected)) = (input.current_lang, input.oembed_lang) {
        if current != detected {
            return Decision::replace(DecisionReason::LanguageMismatch {
                current: current.to_string(),
                candidate: detected.to_string(),
            });
        }
    }

    if input.current_title.to_lowercase() != candidate.to_lowercase() {
        return Decision::replace(DecisionReason::TitlesDiffer);
    }

    Decision::keep(DecisionReason::NoClearDifference)
}

/// Case-insensitive similarity in `0.0..=1.0`.
///
/// `1.0` for identical strings, `0.99` for strings equal ignoring case,
/// otherwise `(max_len - edit_distance) / max_len` over lowercased chars.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a == b {
        return 0.99;
    }

    let longer = a.len().max(b.len());
    let distance = levenshtein(&a, &b);
    (longer - distance) as f64 / longer as f64
}

/// Edit distance with a single rolling row.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[b.len()]
}
