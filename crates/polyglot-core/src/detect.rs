//! Heuristic language detection for short titles.
//!
//! Two passes: a Unicode script scan for non-Latin writing systems, then an
//! ordered list of diacritic/stop-word rules for common Latin-script
//! languages. This is a coarse gate for title restoration, not a language
//! identifier; callers should compare `confidence` against a threshold.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Detected language (ISO 639-1) with a confidence in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionResult {
    pub lang: Option<&'static str>,
    pub confidence: f32,
}

impl DetectionResult {
    pub const UNKNOWN: Self = Self {
        lang: None,
        confidence: 0.0,
    };

    fn new(lang: &'static str, confidence: f32) -> Self {
        Self {
            lang: Some(lang),
            confidence,
        }
    }

    /// True when a language was detected with at least `threshold` confidence.
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.lang.is_some() && self.confidence >= threshold
    }
}

// ── Pass 1: script ranges ─────────────────────────────────────────────

/// Non-Latin scripts in check order, each with its representative language.
///
/// With several scripts present the *last* match in this order wins. That
/// tie-break is arbitrary but kept stable so results stay comparable.
const SCRIPTS: &[(&str, &[(char, char)])] = &[
    ("ru", &[('\u{0400}', '\u{04FF}')]),
    ("ar", &[('\u{0600}', '\u{06FF}')]),
    ("he", &[('\u{0590}', '\u{05FF}')]),
    (
        "ja",
        &[
            ('\u{3040}', '\u{30FF}'),
            ('\u{4E00}', '\u{9FFF}'),
            ('\u{AC00}', '\u{D7AF}'),
        ],
    ),
    ("hi", &[('\u{0900}', '\u{097F}')]),
    ("th", &[('\u{0E00}', '\u{0E7F}')]),
    ("el", &[('\u{0370}', '\u{03FF}')]),
];

const SINGLE_SCRIPT_CONFIDENCE: f32 = 0.9;
const MIXED_SCRIPT_CONFIDENCE: f32 = 0.5;
const DEFAULT_CONFIDENCE: f32 = 0.5;

fn contains_script(text: &str, ranges: &[(char, char)]) -> bool {
    text.chars()
        .any(|c| ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&c)))
}

// ── Pass 2: Latin keyword rules ───────────────────────────────────────

struct LatinRule {
    lang: &'static str,
    confidence: f32,
    pattern: Regex,
}

fn rule(lang: &'static str, confidence: f32, pattern: &str) -> LatinRule {
    LatinRule {
        lang,
        confidence,
        pattern: Regex::new(pattern).expect("language rule pattern is valid"),
    }
}

/// Checked in order against the lowercased text; first match wins.
///
/// Word boundaries are ASCII: accented letters count as non-word characters,
/// so `"ça"` ends in the standalone word `"a"`.
static LATIN_RULES: LazyLock<Vec<LatinRule>> = LazyLock::new(|| {
    vec![
        rule("pl", 0.7, r"[óąćęłńśźż]|(?-u:\b)(?:jest|nie|tak|dla|się|ale)(?-u:\b)"),
        rule("de", 0.7, r"[ßäöü]|(?-u:\b)(?:und|der|die|das|ist|nicht)(?-u:\b)"),
        rule("fr", 0.6, r"(?-u:\b)(?:le|la|les|un|une|des|est|dans|pour)(?-u:\b)"),
        rule("es", 0.6, r"[áéíñóú]|(?-u:\b)(?:el|la|los|las|es|un|una|del)(?-u:\b)"),
        rule("it", 0.6, r"(?-u:\b)(?:il|lo|la|gli|le|un|uno|una|è|di|per)(?-u:\b)"),
        rule("pt", 0.6, r"[ãõ]|(?-u:\b)(?:o|a|os|as|um|uma|é|de|para|não)(?-u:\b)"),
    ]
});

/// Detect the language of `text`.
///
/// Empty or whitespace-only input yields [`DetectionResult::UNKNOWN`].
/// Latin text matching no rule defaults to English at 0.5.
pub fn detect(text: &str) -> DetectionResult {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DetectionResult::UNKNOWN;
    }

    let mut script_count = 0;
    let mut dominant = None;
    for &(lang, ranges) in SCRIPTS {
        if contains_script(trimmed, ranges) {
            script_count += 1;
            dominant = Some(lang);
        }
    }

    match (script_count, dominant) {
        (1, Some(lang)) => return DetectionResult::new(lang, SINGLE_SCRIPT_CONFIDENCE),
        (n, Some(lang)) if n > 1 => return DetectionResult::new(lang, MIXED_SCRIPT_CONFIDENCE),
        _ => {}
    }

    let lower = trimmed.to_lowercase();
    LATIN_RULES
        .iter()
        .find(|r| r.pattern.is_match(&lower))
        .map(|r| DetectionResult::new(r.lang, r.confidence))
        .unwrap_or_else(|| DetectionResult::new("en", DEFAULT_CONFIDENCE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(detect(""), DetectionResult::UNKNOWN);
        assert_eq!(detect("   \t\n"), DetectionResult::UNKNOWN);
    }

    #[test]
    fn test_single_script() {
        assert_eq!(detect("Привет мир"), DetectionResult::new("ru", 0.9));
        assert_eq!(detect("مرحبا بالعالم"), DetectionResult::new("ar", 0.9));
        assert_eq!(detect("שלום עולם"), DetectionResult::new("he", 0.9));
        assert_eq!(detect("葬送のフリーレン"), DetectionResult::new("ja", 0.9));
        assert_eq!(detect("안녕하세요"), DetectionResult::new("ja", 0.9));
        assert_eq!(detect("नमस्ते दुनिया"), DetectionResult::new("hi", 0.9));
        assert_eq!(detect("สวัสดีชาวโลก"), DetectionResult::new("th", 0.9));
        assert_eq!(detect("Γειά σου Κόσμε"), DetectionResult::new("el", 0.9));
    }

    #[test]
    fn test_latin_mixed_with_one_script_is_still_single_script() {
        assert_eq!(detect("Minecraft по-русски"), DetectionResult::new("ru", 0.9));
    }

    #[test]
    fn test_mixed_scripts_pick_last_in_check_order() {
        // Cyrillic is checked before CJK, so CJK wins.
        assert_eq!(detect("Привет 世界"), DetectionResult::new("ja", 0.5));
        // Greek is checked last of all.
        assert_eq!(detect("Γειά Привет"), DetectionResult::new("el", 0.5));
    }

    #[test]
    fn test_english_default() {
        assert_eq!(detect("Hello world"), DetectionResult::new("en", 0.5));
        assert_eq!(detect("Minecraft Let's Play"), DetectionResult::new("en", 0.5));
    }

    #[test]
    fn test_latin_rules() {
        assert_eq!(detect("Zażółć gęślą jaźń"), DetectionResult::new("pl", 0.7));
        assert_eq!(detect("To jest test"), DetectionResult::new("pl", 0.7));
        assert_eq!(detect("Die Straße"), DetectionResult::new("de", 0.7));
        assert_eq!(detect("Dans la maison"), DetectionResult::new("fr", 0.6));
        assert_eq!(detect("Los perros"), DetectionResult::new("es", 0.6));
        assert_eq!(detect("Gli amici"), DetectionResult::new("it", 0.6));
        assert_eq!(detect("Coração partido"), DetectionResult::new("pt", 0.6));
    }

    #[test]
    fn test_rule_order_first_match_wins() {
        // "la" is both French and Spanish; French is checked first.
        assert_eq!(detect("la casa"), DetectionResult::new("fr", 0.6));
        // "ó" belongs to the Polish class, which precedes Spanish.
        assert_eq!(detect("canción"), DetectionResult::new("pl", 0.7));
    }

    #[test]
    fn test_keywords_need_word_boundaries() {
        // "undone" contains "und" but not as a word.
        assert_eq!(detect("Undone"), DetectionResult::new("en", 0.5));
    }

    #[test]
    fn test_word_boundaries_are_ascii() {
        // "ç" is not an ASCII word character, leaving "a" as a Portuguese word.
        assert_eq!(detect("Ça va"), DetectionResult::new("pt", 0.6));
        // "û" splits "sûr" into "s" and "r", neither of which is a keyword.
        assert_eq!(detect("Bien sûr"), DetectionResult::new("en", 0.5));
    }

    #[test]
    fn test_no_letters_defaults_to_english() {
        assert_eq!(detect("12345 !!!"), DetectionResult::new("en", 0.5));
    }

    #[test]
    fn test_is_confident() {
        assert!(detect("Привет").is_confident(0.6));
        assert!(!detect("Hello").is_confident(0.6));
        assert!(!DetectionResult::UNKNOWN.is_confident(0.0));
    }
}
