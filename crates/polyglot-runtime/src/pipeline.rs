use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use polyglot_api::traits::TitleSource;
use polyglot_api::translate::{self, TranslationRequest, TranslationSettings};
use polyglot_core::config::TitlesConfig;
use polyglot_core::detect::{self, DetectionResult};
use polyglot_core::models::{ItemKind, VideoItem};
use polyglot_core::policy::{self, DecisionInput};

/// Per-call context for title restoration.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Only list views (search, feeds, related) get their titles restored.
    pub is_list_context: bool,
    /// Where the items came from, for logs only.
    pub source: String,
    pub translation: TranslationSettings,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            is_list_context: false,
            source: "unknown".into(),
            translation: TranslationSettings::default(),
        }
    }
}

impl ProcessOptions {
    pub fn list(source: impl Into<String>) -> Self {
        Self {
            is_list_context: true,
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Tunables for a [`TitleRestorationPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub timeout_ms: u64,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub probe_video_ids: HashSet<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            batch_size: 10,
            batch_delay: Duration::from_millis(100),
            probe_video_ids: HashSet::new(),
        }
    }
}

impl From<&TitlesConfig> for PipelineSettings {
    fn from(config: &TitlesConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            batch_size: config.batch_size.max(1),
            batch_delay: config.batch_delay(),
            probe_video_ids: config.probe_video_ids.iter().cloned().collect(),
        }
    }
}

/// Item counts for a processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    /// Videos with an ID, i.e. candidates for restoration.
    pub videos: usize,
    pub channels: usize,
    pub playlists: usize,
    pub restored: usize,
    /// Videos that were processed but kept their title.
    pub skipped: usize,
    pub non_videos: usize,
}

impl BatchSummary {
    pub fn of(items: &[VideoItem]) -> Self {
        let mut summary = Self {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            match item.kind {
                ItemKind::Video => {
                    if item.video_id.as_deref().is_some_and(|id| !id.is_empty()) {
                        summary.videos += 1;
                    }
                    if item.title_lang_fixed && !item.title_restored {
                        summary.skipped += 1;
                    }
                }
                ItemKind::Channel => summary.channels += 1,
                ItemKind::Playlist => summary.playlists += 1,
                ItemKind::Other => {}
            }
            if item.kind != ItemKind::Video {
                summary.non_videos += 1;
            }
            if item.title_restored {
                summary.restored += 1;
            }
        }
        summary
    }
}

/// Restores original-language titles on list items.
///
/// Each item is processed at most once: every path through
/// [`process_item`](Self::process_item) that touches the network marks the
/// item `_titleLangFixed`.
pub struct TitleRestorationPipeline<S> {
    source: S,
    settings: PipelineSettings,
    multi_audio: Mutex<HashSet<String>>,
}

impl<S: TitleSource> TitleRestorationPipeline<S> {
    pub fn new(source: S, settings: PipelineSettings) -> Self {
        Self {
            source,
            settings,
            multi_audio: Mutex::new(HashSet::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Remember that a video carries several audio tracks. Its title then
    /// takes the canonical one without going through the policy.
    pub fn mark_multi_audio(&self, video_id: &str) {
        let inserted = self
            .multi_audio
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(video_id.to_string());
        if inserted {
            tracing::debug!(video_id, "Registered multi-audio video");
        }
    }

    pub fn is_known_multi_audio(&self, video_id: &str) -> bool {
        self.multi_audio
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(video_id)
    }

    fn is_probe(&self, video_id: &str) -> bool {
        self.settings.probe_video_ids.contains(video_id)
    }

    fn log_outcome(&self, video_id: &str, source: &str, decision: &str, reason: &str) {
        if self.is_probe(video_id) {
            tracing::info!(video_id, source, decision, reason, "Probe title decision");
        } else {
            tracing::debug!(video_id, source, decision, reason, "Title decision");
        }
    }

    /// Restore one item's title if it was served in the wrong language.
    #[tracing::instrument(
        name = "restore_title",
        skip_all,
        fields(video_id = ?item.video_id, source = %options.source)
    )]
    pub async fn process_item(&self, item: VideoItem, options: &ProcessOptions) -> VideoItem {
        if !options.is_list_context || item.title_lang_fixed {
            return item;
        }
        let (Some(video_id), Some(current)) = (item.video_id.clone(), item.title.clone()) else {
            return item;
        };
        if video_id.is_empty() || current.is_empty() {
            return item;
        }

        let source = options.source.as_str();
        let timeout_ms = self.settings.timeout_ms;

        if item.is_multi_audio || self.is_known_multi_audio(&video_id) {
            let fetched = self.source.fetch_title(&video_id, timeout_ms).await;
            return match fetched.usable_title() {
                Some(title) => {
                    self.log_outcome(&video_id, source, "REPLACE", "multi-audio");
                    tracing::debug!(video_id, from = %current, to = %title, "Title restored");
                    item.into_restored(title.to_string())
                }
                None => {
                    self.log_outcome(&video_id, source, "KEEP", "multi-audio, no oEmbed title");
                    item.into_fixed()
                }
            };
        }

        let current_lang = detect::detect(&current);
        let fetched = self.source.fetch_title(&video_id, timeout_ms).await;

        if fetched.blocked {
            tracing::debug!(
                video_id,
                path = %fetched.path,
                status = ?fetched.status,
                "oEmbed blocked, trying translation"
            );
            let request = TranslationRequest {
                text: &current,
                source_lang: current_lang.lang,
                source_confidence: current_lang.confidence,
                target_lang: None,
                target_confidence: 0.0,
            };
            if let Some(translated) =
                translate::maybe_translate_title(&request, &options.translation).await
            {
                self.log_outcome(&video_id, source, "MT_FALLBACK", "oEmbed blocked");
                return item.into_restored(translated);
            }
            self.log_outcome(&video_id, source, "KEEP", "oEmbed blocked, no translation");
            return item.into_fixed();
        }

        let candidate = fetched.title.as_deref();
        let candidate_lang = candidate.map_or(DetectionResult::UNKNOWN, detect::detect);
        tracing::trace!(
            video_id,
            current = ?current_lang.lang,
            current_confidence = current_lang.confidence,
            candidate = ?candidate_lang.lang,
            candidate_confidence = candidate_lang.confidence,
            "Title languages"
        );

        let decision = policy::decide(&DecisionInput {
            current_title: &current,
            oembed_title: candidate,
            current_lang: current_lang.lang,
            current_confidence: current_lang.confidence,
            oembed_lang: candidate_lang.lang,
            oembed_confidence: candidate_lang.confidence,
        });
        self.log_outcome(&video_id, source, decision.tag(), &decision.reason.to_string());

        match candidate {
            Some(title) if decision.should_replace => {
                tracing::debug!(video_id, from = %current, to = %title, "Title restored");
                item.into_restored(title.to_string())
            }
            _ => item.into_fixed(),
        }
    }

    /// Process items in throttled groups, preserving input order.
    pub async fn process_batch(
        &self,
        items: Vec<VideoItem>,
        options: &ProcessOptions,
    ) -> Vec<VideoItem> {
        self.process_batch_with_summary(items, options).await.0
    }

    /// Like [`process_batch`](Self::process_batch), also returning counts.
    pub async fn process_batch_with_summary(
        &self,
        items: Vec<VideoItem>,
        options: &ProcessOptions,
    ) -> (Vec<VideoItem>, BatchSummary) {
        if items.is_empty() {
            return (items, BatchSummary::default());
        }

        let incoming = BatchSummary::of(&items);
        tracing::info!(
            source = %options.source,
            total = incoming.total,
            videos = incoming.videos,
            channels = incoming.channels,
            playlists = incoming.playlists,
            "Title batch started"
        );

        let total = items.len();
        let batch_size = self.settings.batch_size.max(1);
        let mut pending = items.into_iter();
        let mut results = Vec::with_capacity(total);

        loop {
            let group: Vec<VideoItem> = pending.by_ref().take(batch_size).collect();
            if group.is_empty() {
                break;
            }
            let processed = join_all(group.into_iter().map(|item| self.process_item(item, options))).await;
            results.extend(processed);

            if results.len() < total {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        let summary = BatchSummary::of(&results);
        tracing::info!(
            source = %options.source,
            restored = summary.restored,
            videos = summary.videos,
            skipped = summary.skipped,
            non_videos = summary.non_videos,
            "Title batch complete"
        );
        (results, summary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use polyglot_api::oembed::{FetchPath, TitleFetchResult};
    use tokio::time::Instant;

    use super::*;

    /// Title source answering from a fixed table, with optional per-ID latency.
    #[derive(Default)]
    struct StubSource {
        titles: HashMap<String, String>,
        blocked: HashSet<String>,
        latency: HashMap<String, Duration>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn with_titles(pairs: &[(&str, &str)]) -> Self {
            Self {
                titles: pairs
                    .iter()
                    .map(|(id, t)| (id.to_string(), t.to_string()))
                    .collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TitleSource for StubSource {
        async fn fetch_title(&self, video_id: &str, _timeout_ms: u64) -> TitleFetchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.latency.get(video_id) {
                tokio::time::sleep(*delay).await;
            }
            let blocked = self.blocked.contains(video_id);
            let title = self.titles.get(video_id).cloned().filter(|_| !blocked);
            TitleFetchResult {
                ok: title.is_some(),
                status: Some(if blocked {
                    403
                } else if title.is_some() {
                    200
                } else {
                    404
                }),
                title,
                blocked,
                from_cache: false,
                path: FetchPath::Direct,
                error: None,
            }
        }
    }

    fn pipeline(source: StubSource) -> TitleRestorationPipeline<StubSource> {
        TitleRestorationPipeline::new(source, PipelineSettings::default())
    }

    #[tokio::test]
    async fn test_outside_list_context_untouched() {
        let p = pipeline(StubSource::with_titles(&[("v1", "Оригинал")]));
        let item = VideoItem::video("v1", "Original");
        let out = p.process_item(item.clone(), &ProcessOptions::default()).await;
        assert_eq!(out, item);
        assert_eq!(p.source().calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_title_or_id_untouched() {
        let p = pipeline(StubSource::default());
        let opts = ProcessOptions::list("search");

        let mut no_title = VideoItem::video("v1", "x");
        no_title.title = None;
        assert_eq!(p.process_item(no_title.clone(), &opts).await, no_title);

        let mut no_id = VideoItem::video("v1", "x");
        no_id.video_id = None;
        assert_eq!(p.process_item(no_id.clone(), &opts).await, no_id);
        assert_eq!(p.source().calls(), 0);
    }

    #[tokio::test]
    async fn test_language_mismatch_restores_title() {
        let p = pipeline(StubSource::with_titles(&[("v1", "Привет мир")]));
        let out = p
            .process_item(VideoItem::video("v1", "Hello world"), &ProcessOptions::list("search"))
            .await;
        assert_eq!(out.title.as_deref(), Some("Привет мир"));
        assert_eq!(out.original_title.as_deref(), Some("Hello world"));
        assert!(out.title_restored);
        assert!(out.title_lang_fixed);
    }

    #[tokio::test]
    async fn test_similar_title_kept() {
        let p = pipeline(StubSource::with_titles(&[("v1", "hello world")]));
        let out = p
            .process_item(VideoItem::video("v1", "Hello World"), &ProcessOptions::list("search"))
            .await;
        assert_eq!(out.title.as_deref(), Some("Hello World"));
        assert!(!out.title_restored);
        assert!(out.title_lang_fixed);
        assert!(out.original_title.is_none());
    }

    #[tokio::test]
    async fn test_processing_is_idempotent() {
        let p = pipeline(StubSource::with_titles(&[("v1", "Привет мир")]));
        let opts = ProcessOptions::list("search");
        let once = p.process_item(VideoItem::video("v1", "Hello world"), &opts).await;
        let twice = p.process_item(once.clone(), &opts).await;
        assert_eq!(once, twice);
        assert_eq!(p.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_blocked_marks_fixed_without_replacing() {
        let mut source = StubSource::with_titles(&[("v1", "Привет мир")]);
        source.blocked.insert("v1".into());
        let p = pipeline(source);

        let out = p
            .process_item(VideoItem::video("v1", "Hello world"), &ProcessOptions::list("search"))
            .await;
        assert_eq!(out.title.as_deref(), Some("Hello world"));
        assert!(out.title_lang_fixed);
        assert!(!out.title_restored);
    }

    #[tokio::test]
    async fn test_failed_fetch_marks_fixed() {
        let p = pipeline(StubSource::default());
        let out = p
            .process_item(VideoItem::video("v1", "Hello"), &ProcessOptions::list("search"))
            .await;
        assert!(out.title_lang_fixed);
        assert!(!out.title_restored);
    }

    #[tokio::test]
    async fn test_multi_audio_applies_directly() {
        // Same language, near-identical: the policy would keep it.
        let p = pipeline(StubSource::with_titles(&[("v1", "Hello World!")]));
        let mut item = VideoItem::video("v1", "Hello World");
        item.is_multi_audio = true;

        let out = p.process_item(item, &ProcessOptions::list("search")).await;
        assert_eq!(out.title.as_deref(), Some("Hello World!"));
        assert_eq!(out.original_title.as_deref(), Some("Hello World"));
        assert!(out.title_restored);
        assert!(out.title_lang_fixed);
    }

    #[tokio::test]
    async fn test_known_multi_audio_set() {
        let p = pipeline(StubSource::with_titles(&[("v1", "Hello World!")]));
        p.mark_multi_audio("v1");
        assert!(p.is_known_multi_audio("v1"));

        let out = p
            .process_item(VideoItem::video("v1", "Hello World"), &ProcessOptions::list("search"))
            .await;
        assert!(out.title_restored);

        let missing = p
            .process_item(VideoItem::video("v2", "Other"), &ProcessOptions::list("search"))
            .await;
        assert!(!missing.title_restored);
    }

    #[tokio::test]
    async fn test_multi_audio_failure_still_marks_fixed() {
        let p = pipeline(StubSource::default());
        let mut item = VideoItem::video("v1", "Hello");
        item.is_multi_audio = true;
        let out = p.process_item(item, &ProcessOptions::list("search")).await;
        assert!(out.title_lang_fixed);
        assert!(!out.title_restored);
        assert_eq!(out.title.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let p = pipeline(StubSource::default());
        let (out, summary) = p
            .process_batch_with_summary(Vec::new(), &ProcessOptions::list("search"))
            .await;
        assert!(out.is_empty());
        assert_eq!(summary, BatchSummary::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_preserves_order_and_throttles() {
        let mut source = StubSource::default();
        for i in 0..25 {
            let id = format!("v{i}");
            source.titles.insert(id.clone(), format!("Заголовок {i}"));
            // Later items in a group finish first.
            source
                .latency
                .insert(id, Duration::from_millis(((25 - i) % 7) as u64 * 10));
        }
        let p = pipeline(source);

        let items: Vec<VideoItem> = (0..25)
            .map(|i| VideoItem::video(format!("v{i}"), format!("Title {i}")))
            .collect();

        let start = Instant::now();
        let out = p.process_batch(items, &ProcessOptions::list("trending")).await;
        let elapsed = start.elapsed();

        let ids: Vec<String> = out.iter().filter_map(|v| v.video_id.clone()).collect();
        let expected: Vec<String> = (0..25).map(|i| format!("v{i}")).collect();
        assert_eq!(ids, expected);
        assert!(out.iter().all(|v| v.title_restored));
        assert_eq!(out[3].title.as_deref(), Some("Заголовок 3"));

        // Three groups, two pauses between them, items within a group concurrent.
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(500));
        assert_eq!(p.source().calls(), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_group_has_no_delay() {
        let p = pipeline(StubSource::default());
        let items: Vec<VideoItem> = (0..10)
            .map(|i| VideoItem::video(format!("v{i}"), "Hello"))
            .collect();
        let start = Instant::now();
        p.process_batch(items, &ProcessOptions::list("search")).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_batch_summary_counts() {
        let p = pipeline(StubSource::with_titles(&[("v1", "Привет мир"), ("v2", "Hello")]));

        let mut channel = VideoItem::default();
        channel.kind = ItemKind::Channel;
        let mut playlist = VideoItem::default();
        playlist.kind = ItemKind::Playlist;

        let items = vec![
            VideoItem::video("v1", "Hello world"),
            VideoItem::video("v2", "Hello"),
            channel,
            playlist,
        ];
        let (out, summary) = p
            .process_batch_with_summary(items, &ProcessOptions::list("subs"))
            .await;

        assert_eq!(out.len(), 4);
        assert_eq!(
            summary,
            BatchSummary {
                total: 4,
                videos: 2,
                channels: 1,
                playlists: 1,
                restored: 1,
                skipped: 1,
                non_videos: 2,
            }
        );
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = polyglot_core::config::AppConfig::default().titles;
        config.batch_size = 0;
        config.probe_video_ids = vec!["probe".into()];
        let settings = PipelineSettings::from(&config);
        assert_eq!(settings.batch_size, 1);
        assert_eq!(settings.timeout_ms, 2000);
        assert_eq!(settings.batch_delay, Duration::from_millis(100));
        assert!(settings.probe_video_ids.contains("probe"));
    }
}
