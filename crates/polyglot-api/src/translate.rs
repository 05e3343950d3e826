//! Machine-translation fallback for titles whose canonical source is blocked.
//!
//! Disabled unless explicitly configured, and even then no provider is wired
//! up yet: every call resolves to `None`.

use serde::{Deserialize, Serialize};

/// Both sides must be detected at least this confidently before translating.
pub const MIN_CONFIDENCE: f32 = 0.6;

#[derive(Debug, Clone, Default)]
pub struct TranslationRequest<'a> {
    pub text: &'a str,
    pub source_lang: Option<&'a str>,
    pub source_confidence: f32,
    pub target_lang: Option<&'a str>,
    pub target_confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationSettings {
    pub enabled: bool,
    pub provider_url: Option<String>,
}

/// Why a translation was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    Disabled,
    NoProvider,
    SameOrUndetected,
    LowConfidence,
}

fn check(request: &TranslationRequest<'_>, settings: &TranslationSettings) -> Result<(), Skip> {
    if !settings.enabled {
        return Err(Skip::Disabled);
    }
    if settings.provider_url.as_deref().map_or(true, str::is_empty) {
        return Err(Skip::NoProvider);
    }
    match (request.source_lang, request.target_lang) {
        (Some(src), Some(dst)) if src != dst => {}
        _ => return Err(Skip::SameOrUndetected),
    }
    if request.source_confidence < MIN_CONFIDENCE || request.target_confidence < MIN_CONFIDENCE {
        return Err(Skip::LowConfidence);
    }
    Ok(())
}

/// Try to translate `request.text`. Currently always `None`.
pub async fn maybe_translate_title(
    request: &TranslationRequest<'_>,
    settings: &TranslationSettings,
) -> Option<String> {
    match check(request, settings) {
        Err(Skip::Disabled) => {}
        Err(skip) => {
            tracing::debug!(?skip, "Title translation skipped");
        }
        Ok(()) => {
            tracing::debug!(
                source = ?request.source_lang,
                target = ?request.target_lang,
                "Title translation not implemented"
            );
        }
    }
    None
}
