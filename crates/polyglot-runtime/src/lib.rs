pub mod pipeline;
pub mod session;

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};

use polyglot_api::oembed::{OEmbedClient, TitleCache};
use polyglot_api::translate::TranslationSettings;
use polyglot_core::config::AppConfig;
use polyglot_core::events::{EventBus, PolyglotEvent};
use polyglot_core::models::{AudioMetadata, AudioTrack, VideoItem};
use polyglot_core::preferences::{PreferenceStore, SqlitePreferences};
use polyglot_core::selection::SwitchOutcome;

pub use pipeline::{BatchSummary, PipelineSettings, ProcessOptions, TitleRestorationPipeline};
pub use session::TrackSession;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
}

/// Wires configuration, the title pipeline and the track session together.
pub struct Runtime {
    config: Arc<RwLock<AppConfig>>,
    pipeline: TitleRestorationPipeline<OEmbedClient>,
    tracks: Mutex<TrackSession>,
    bus: EventBus,
}

impl Runtime {
    /// Use `config` as given, with preferences in the default database.
    pub fn open(config: AppConfig) -> Result<Self, RuntimeError> {
        let db_path =
            AppConfig::ensure_db_path().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let preferences =
            SqlitePreferences::open(&db_path).map_err(|e| RuntimeError::Database(e.to_string()))?;
        Ok(Self::with_config(config, Box::new(preferences)))
    }

    pub fn with_config(config: AppConfig, preferences: Box<dyn PreferenceStore>) -> Self {
        let titles = &config.titles;
        let cache = Arc::new(TitleCache::new(
            titles.positive_cache_size,
            titles.negative_ttl(),
        ));
        let client = OEmbedClient::new(titles.oembed_endpoint.clone(), cache);
        let pipeline = TitleRestorationPipeline::new(client, PipelineSettings::from(titles));
        let bus = EventBus::default();

        Self {
            config: Arc::new(RwLock::new(config)),
            pipeline,
            tracks: Mutex::new(TrackSession::new(preferences, bus.clone())),
            bus,
        }
    }

    pub async fn get_config(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    pub fn pipeline(&self) -> &TitleRestorationPipeline<OEmbedClient> {
        &self.pipeline
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PolyglotEvent> {
        self.bus.subscribe()
    }

    /// Options for a list view, with translation settings from config.
    pub async fn list_options(&self, source: &str) -> ProcessOptions {
        let config = self.config.read().await;
        let provider_url = Some(config.translation.provider_url.clone()).filter(|u| !u.is_empty());
        ProcessOptions {
            is_list_context: true,
            source: source.to_string(),
            translation: TranslationSettings {
                enabled: config.translation.enabled,
                provider_url,
            },
        }
    }

    pub async fn restore_titles(
        &self,
        items: Vec<VideoItem>,
        options: &ProcessOptions,
    ) -> (Vec<VideoItem>, BatchSummary) {
        self.pipeline.process_batch_with_summary(items, options).await
    }

    /// Load audio tracks for the video being played.
    ///
    /// Videos with more than one track are registered as multi-audio so
    /// their list titles are restored directly.
    pub async fn load_tracks(
        &self,
        video_id: &str,
        metadata: Option<&AudioMetadata>,
    ) -> (Vec<AudioTrack>, Option<AudioTrack>) {
        let system_language = self.config.read().await.tracks.system_language.clone();
        let mut session = self.tracks.lock().await;
        let selected = session.load(video_id, metadata, &system_language);
        let tracks = session.store().tracks().to_vec();
        if tracks.len() > 1 {
            self.pipeline.mark_multi_audio(video_id);
        }
        (tracks, selected)
    }

    pub async fn switch_track(&self, track_id: Option<&str>) -> SwitchOutcome {
        self.tracks.lock().await.switch(track_id)
    }

    pub async fn request_track(&self, audio_track_id: &str, language: &str) {
        self.tracks.lock().await.request_track(audio_track_id, language);
    }

    pub async fn clear_tracks(&self) {
        self.tracks.lock().await.clear();
    }
}
