//! Audio track aggregation across backends.
//!
//! Flatten → dedupe by language code → bucket (original, system language,
//! others) → sort others by display name → concatenate. Track IDs in the
//! result are unique.

use std::collections::{HashMap, HashSet};

use crate::language::{self, UNDETERMINED};
use crate::models::{AudioMetadata, AudioTrack, RawAudioTrack, TrackSource};

/// Merge per-backend track lists into one ordered, deduplicated list.
///
/// `system_language` may be a full tag (`"fr-CA"`); only its primary subtag is
/// compared. Blank means English.
pub fn aggregate(metadata: &AudioMetadata, system_language: &str) -> Vec<AudioTrack> {
    let collected = flatten(metadata);
    tracing::debug!(total = collected.len(), "Audio tracks collected");

    let deduped = dedupe(collected);
    tracing::debug!(total = deduped.len(), "Audio tracks after deduplication");

    let ordered = unique_ids(order(deduped, system_language));
    for (position, track) in ordered.iter().enumerate() {
        tracing::trace!(
            position = position + 1,
            language = %track.language_code,
            name = %track.language_name,
            original = track.is_original,
            source = %track.source,
            "Aggregated track"
        );
    }
    ordered
}

// ── Step 1: flatten ───────────────────────────────────────────────────

fn flatten(metadata: &AudioMetadata) -> Vec<AudioTrack> {
    metadata
        .sources()
        .into_iter()
        .flat_map(|(source, raws)| raws.iter().map(move |raw| build(raw, source)))
        .collect()
}

/// Build a descriptor from one backend's raw entry.
fn build(raw: &RawAudioTrack, source: TrackSource) -> AudioTrack {
    let language_code = raw
        .language_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNDETERMINED)
        .to_string();

    let id = match (&raw.id, &raw.format_id) {
        (Some(id), _) if !id.is_empty() => id.clone(),
        // Dubs of one video usually share an itag, so the language keeps IDs apart.
        (_, Some(format_id)) => format!("{source}-{format_id}-{language_code}"),
        _ => format!("{source}-{language_code}"),
    };

    let language_name = raw
        .language_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| language::display_name(&language_code));

    AudioTrack {
        id,
        language_code,
        language_name,
        url: raw.url.clone(),
        is_original: raw.is_original,
        bitrate: raw.bitrate,
        format_id: raw.format_id.clone(),
        source,
    }
}

// ── Step 2: dedupe ────────────────────────────────────────────────────

/// One track per language code. First seen wins, unless a later duplicate is
/// playable and the kept one is not.
fn dedupe(tracks: Vec<AudioTrack>) -> Vec<AudioTrack> {
    let mut kept: Vec<AudioTrack> = Vec::with_capacity(tracks.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for track in tracks {
        match index.get(&track.language_code) {
            None => {
                tracing::trace!(language = %track.language_code, source = %track.source, "Added track");
                index.insert(track.language_code.clone(), kept.len());
                kept.push(track);
            }
            Some(&slot) if track.is_playable() && !kept[slot].is_playable() => {
                tracing::trace!(
                    language = %track.language_code,
                    from = %kept[slot].source,
                    to = %track.source,
                    "Replaced track with playable duplicate"
                );
                kept[slot] = track;
            }
            Some(_) => {
                tracing::trace!(language = %track.language_code, source = %track.source, "Skipped duplicate track");
            }
        }
    }

    kept
}

// ── Steps 3–5: bucket, sort, concatenate ──────────────────────────────

fn order(tracks: Vec<AudioTrack>, system_language: &str) -> Vec<AudioTrack> {
    let system = match language::primary_subtag(system_language) {
        s if s.is_empty() => "en".to_string(),
        s => s,
    };

    let mut original = Vec::new();
    let mut system_lang = Vec::new();
    let mut others = Vec::new();

    for track in tracks {
        if track.is_original {
            original.push(track);
        } else if language::primary_subtag(&track.language_code) == system {
            system_lang.push(track);
        } else {
            others.push(track);
        }
    }

    others.sort_by_cached_key(|t| (t.language_name.to_lowercase(), t.language_code.clone()));

    original.extend(system_lang);
    original.extend(others);
    original
}

// ── Step 6: IDs ───────────────────────────────────────────────────────

/// Backends may reuse an ID across languages. Later holders get the
/// language code appended, then a counter if that is taken too.
fn unique_ids(mut tracks: Vec<AudioTrack>) -> Vec<AudioTrack> {
    let mut seen: HashSet<String> = HashSet::with_capacity(tracks.len());
    for track in &mut tracks {
        if !seen.contains(&track.id) {
            seen.insert(track.id.clone());
            continue;
        }
        let base = format!("{}-{}", track.id, track.language_code);
        let mut candidate = base.clone();
        let mut n = 2;
        while seen.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        tracing::trace!(from = %track.id, to = %candidate, "Renamed duplicate track ID");
        track.id = candidate.clone();
        seen.insert(candidate);
    }
    tracks
}
