use polyglot_core::events::{EventBus, PolyglotEvent};
use polyglot_core::models::{AudioMetadata, AudioTrack};
use polyglot_core::preferences::{self, PreferenceStore};
use polyglot_core::selection::{SwitchOutcome, TrackSelectionStore};

/// Audio tracks of the video being played, with remembered preferences.
pub struct TrackSession {
    store: TrackSelectionStore,
    preferences: Box<dyn PreferenceStore>,
    bus: EventBus,
}

impl TrackSession {
    pub fn new(preferences: Box<dyn PreferenceStore>, bus: EventBus) -> Self {
        Self {
            store: TrackSelectionStore::new(bus.clone()),
            preferences,
            bus,
        }
    }

    pub fn store(&self) -> &TrackSelectionStore {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Load tracks for a video and select the best playable one.
    ///
    /// Returns the auto-selected track. Nothing is selected when the best
    /// candidate has no URL.
    pub fn load(
        &mut self,
        video_id: &str,
        metadata: Option<&AudioMetadata>,
        system_language: &str,
    ) -> Option<AudioTrack> {
        self.store.load(video_id, metadata, system_language);

        let preferred = preferences::load_preference(self.preferences.as_ref(), video_id);
        let best = self.store.best_track(preferred.as_deref())?;
        if !best.is_playable() {
            tracing::debug!(video_id, track_id = %best.id, "Best audio track has no URL");
            return None;
        }

        let best_id = best.id.clone();
        match self.store.request_switch(Some(&best_id)) {
            SwitchOutcome::Switched(track) => Some(track),
            SwitchOutcome::Rejected { .. } => None,
        }
    }

    /// Switch tracks on user request, remembering the language on success.
    pub fn switch(&mut self, track_id: Option<&str>) -> SwitchOutcome {
        let outcome = self.store.request_switch(track_id);
        if let (SwitchOutcome::Switched(track), Some(video_id)) =
            (&outcome, self.store.current_video_id())
        {
            preferences::save_preference(self.preferences.as_ref(), video_id, &track.language_code);
        }
        outcome
    }

    /// Ask whoever owns the player to load a track this session may not hold yet.
    pub fn request_track(&self, audio_track_id: &str, language: &str) {
        tracing::debug!(audio_track_id, language, "Requesting audio track");
        self.bus.publish(PolyglotEvent::AudioTrackSwitchRequested {
            audio_track_id: audio_track_id.to_string(),
            language: language.to_string(),
        });
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }
}
