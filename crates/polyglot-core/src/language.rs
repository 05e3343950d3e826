use phf::phf_map;

/// English display names for the languages YouTube commonly dubs into.
static LANGUAGE_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "ar" => "Arabic",
    "bn" => "Bangla",
    "cs" => "Czech",
    "da" => "Danish",
    "de" => "German",
    "el" => "Greek",
    "en" => "English",
    "es" => "Spanish",
    "fa" => "Persian",
    "fi" => "Finnish",
    "fil" => "Filipino",
    "fr" => "French",
    "he" => "Hebrew",
    "hi" => "Hindi",
    "hu" => "Hungarian",
    "id" => "Indonesian",
    "it" => "Italian",
    "ja" => "Japanese",
    "ko" => "Korean",
    "ml" => "Malayalam",
    "ms" => "Malay",
    "nl" => "Dutch",
    "no" => "Norwegian",
    "pa" => "Punjabi",
    "pl" => "Polish",
    "pt" => "Portuguese",
    "ro" => "Romanian",
    "ru" => "Russian",
    "sv" => "Swedish",
    "ta" => "Tamil",
    "te" => "Telugu",
    "th" => "Thai",
    "tr" => "Turkish",
    "uk" => "Ukrainian",
    "ur" => "Urdu",
    "vi" => "Vietnamese",
    "zh" => "Chinese",
};

/// Language code used when a track carries none.
pub const UNDETERMINED: &str = "und";

/// Lowercased primary subtag: `"en-US"` → `"en"`.
pub fn primary_subtag(code: &str) -> String {
    code.split('-').next().unwrap_or_default().trim().to_lowercase()
}

/// Two-letter uppercase badge for a language code: `"pl-PL"` → `"PL"`.
///
/// Empty or undetermined codes render as `"??"`.
pub fn short_code(code: &str) -> String {
    if code.is_empty() || code == UNDETERMINED {
        return "??".into();
    }
    primary_subtag(code).to_uppercase().chars().take(2).collect()
}

/// English display name for a language code.
///
/// Regional variants fall back to their primary subtag (`"pt-BR"` → `"Portuguese"`);
/// unknown codes are returned as-is.
pub fn display_name(code: &str) -> String {
    if code.is_empty() || code == UNDETERMINED {
        return "Unknown".into();
    }
    LANGUAGE_NAMES
        .get(code.to_lowercase().as_str())
        .or_else(|| LANGUAGE_NAMES.get(primary_subtag(code).as_str()))
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}
