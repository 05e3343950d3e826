use std::fmt;

use crate::aggregate;
use crate::events::EventBus;
use crate::language;
use crate::models::{AudioMetadata, AudioTrack};

/// Notice shown when the user picks a track the player cannot load.
pub const NO_URL_NOTICE: &str = "This audio track cannot be played (no URL available)";

/// Why a switch request did not change the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchRejection {
    MissingId,
    NoTracks,
    TrackNotFound,
    NoUrl,
    AlreadySelected,
}

impl SwitchRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingId => "missing-id",
            Self::NoTracks => "no-tracks",
            Self::TrackNotFound => "track-not-found",
            Self::NoUrl => "no-url",
            Self::AlreadySelected => "already-selected",
        }
    }
}

impl fmt::Display for SwitchRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`TrackSelectionStore::request_switch`].
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchOutcome {
    Switched(AudioTrack),
    Rejected {
        reason: SwitchRejection,
        track: Option<AudioTrack>,
    },
}

impl SwitchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Switched(_))
    }

    pub fn rejection(&self) -> Option<SwitchRejection> {
        match self {
            Self::Switched(_) => None,
            Self::Rejected { reason, .. } => Some(*reason),
        }
    }

    fn rejected(reason: SwitchRejection, track: Option<AudioTrack>) -> Self {
        Self::Rejected { reason, track }
    }
}

/// Aggregated tracks for the current video plus the user's selection.
///
/// The selected ID always refers to a track in `tracks`; loading or clearing
/// resets it.
#[derive(Debug, Default)]
pub struct TrackSelectionStore {
    tracks: Vec<AudioTrack>,
    current_video_id: Option<String>,
    selected_audio_track_id: Option<String>,
    system_language: String,
    bus: EventBus,
}

impl TrackSelectionStore {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            ..Default::default()
        }
    }

    /// Replace the track list for `video_id`. No metadata means no tracks.
    #[tracing::instrument(name = "load_tracks", skip(self, metadata))]
    pub fn load(
        &mut self,
        video_id: &str,
        metadata: Option<&AudioMetadata>,
        system_language: &str,
    ) {
        self.tracks = match metadata {
            Some(meta) => aggregate::aggregate(meta, system_language),
            None => {
                tracing::debug!("No audio metadata provided");
                Vec::new()
            }
        };
        self.selected_audio_track_id = None;
        self.current_video_id = Some(video_id.to_string());
        self.system_language = system_language.to_string();
        tracing::debug!(tracks = self.tracks.len(), "Audio tracks loaded");
    }

    pub fn clear(&mut self) {
        tracing::debug!("Clearing audio tracks");
        self.tracks.clear();
        self.current_video_id = None;
        self.selected_audio_track_id = None;
    }

    pub fn tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }

    pub fn current_video_id(&self) -> Option<&str> {
        self.current_video_id.as_deref()
    }

    pub fn selected_track(&self) -> Option<&AudioTrack> {
        let id = self.selected_audio_track_id.as_deref()?;
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Try to make `track_id` the active track.
    pub fn request_switch(&mut self, track_id: Option<&str>) -> SwitchOutcome {
        tracing::debug!(
            track_id = ?track_id,
            video_id = ?self.current_video_id,
            available = self.tracks.len(),
            "Audio switch requested"
        );

        let Some(track_id) = track_id.filter(|id| !id.is_empty()) else {
            tracing::warn!(reason = "missing-id", "Audio switch rejected");
            return SwitchOutcome::rejected(SwitchRejection::MissingId, None);
        };

        if self.tracks.is_empty() {
            tracing::warn!(reason = "no-tracks", "Audio switch rejected");
            return SwitchOutcome::rejected(SwitchRejection::NoTracks, None);
        }

        let Some(target) = self.tracks.iter().find(|t| t.id == track_id).cloned() else {
            tracing::warn!(reason = "track-not-found", track_id, "Audio switch rejected");
            return SwitchOutcome::rejected(SwitchRejection::TrackNotFound, None);
        };

        if !target.is_playable() {
            tracing::warn!(
                reason = "no-url",
                language = %target.language_name,
                "Audio switch rejected"
            );
            self.bus.toast(NO_URL_NOTICE);
            return SwitchOutcome::rejected(SwitchRejection::NoUrl, Some(target));
        }

        if self.selected_audio_track_id.as_deref() == Some(track_id) {
            tracing::debug!(reason = "already-selected", "Audio switch skipped");
            return SwitchOutcome::rejected(SwitchRejection::AlreadySelected, Some(target));
        }

        self.selected_audio_track_id = Some(target.id.clone());
        tracing::info!(
            language = %target.language_code,
            source = %target.source,
            bitrate = ?target.bitrate,
            "Audio track switched"
        );
        SwitchOutcome::Switched(target)
    }

    /// Pick the track to start with.
    ///
    /// Precedence: saved preference (by primary subtag), the original track,
    /// the system language, then the first track.
    pub fn best_track(&self, preferred_language: Option<&str>) -> Option<&AudioTrack> {
        if let Some(pref) = preferred_language.map(language::primary_subtag) {
            let found = self
                .tracks
                .iter()
                .find(|t| language::primary_subtag(&t.language_code) == pref);
            if found.is_some() {
                return found;
            }
        }

        if let Some(original) = self.tracks.iter().find(|t| t.is_original) {
            return Some(original);
        }

        let system = language::primary_subtag(&self.system_language);
        self.tracks
            .iter()
            .find(|t| language::primary_subtag(&t.language_code) == system)
            .or_else(|| self.tracks.first())
    }
}
