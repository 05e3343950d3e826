use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::cache::TitleCache;
use super::error::OEmbedError;
use super::types::{FetchPath, OEmbedResponse, TitleFetchResult};
use crate::traits::{HostBridge, NoBridge, TitleSource};

pub const DEFAULT_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Default deadline for a direct request.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// A failed network attempt, as it gets cached.
struct Failure {
    status: Option<u16>,
    error: Option<String>,
}

impl From<OEmbedError> for Failure {
    fn from(e: OEmbedError) -> Self {
        match e {
            OEmbedError::Http(e) if e.is_timeout() => Failure {
                status: None,
                error: Some(TitleFetchResult::TIMEOUT.into()),
            },
            OEmbedError::Api { status, message } => Failure {
                status: Some(status),
                error: Some(message).filter(|m| !m.is_empty()),
            },
            OEmbedError::MissingTitle { status } => Failure {
                status: Some(status),
                error: Some(TitleFetchResult::MISSING_TITLE.into()),
            },
            other => Failure {
                status: None,
                error: Some(other.to_string()),
            },
        }
    }
}

/// Canonical title lookups against an oEmbed endpoint.
///
/// Goes through the host bridge when one is attached, otherwise issues a
/// direct GET. Results are cached in the shared [`TitleCache`].
pub struct OEmbedClient<B = NoBridge> {
    http: Client,
    endpoint: String,
    cache: Arc<TitleCache>,
    bridge: Option<B>,
}

impl OEmbedClient<NoBridge> {
    pub fn new(endpoint: impl Into<String>, cache: Arc<TitleCache>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            cache,
            bridge: None,
        }
    }
}

impl<B: HostBridge> OEmbedClient<B> {
    /// Route lookups through a host process instead of the network.
    pub fn with_bridge<B2: HostBridge>(self, bridge: B2) -> OEmbedClient<B2> {
        OEmbedClient {
            http: self.http,
            endpoint: self.endpoint,
            cache: self.cache,
            bridge: Some(bridge),
        }
    }

    pub fn cache(&self) -> &Arc<TitleCache> {
        &self.cache
    }

    fn network_path(&self) -> FetchPath {
        if self.bridge.is_some() {
            FetchPath::HostBridge
        } else {
            FetchPath::Direct
        }
    }

    /// Look up the canonical title for `video_id`.
    ///
    /// Order: argument check, positive cache, negative cache, then exactly
    /// one network attempt whose outcome is cached either way.
    pub async fn fetch(&self, video_id: &str, timeout_ms: u64) -> TitleFetchResult {
        let path = self.network_path();
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return TitleFetchResult::invalid_argument(path);
        }

        if let Some(title) = self.cache.get_title(video_id) {
            tracing::trace!(video_id, "oEmbed positive cache hit");
            return TitleFetchResult::cached_title(title);
        }

        if let Some(entry) = self.cache.get_failure(video_id) {
            tracing::trace!(video_id, status = ?entry.status, "oEmbed negative cache hit");
            return TitleFetchResult::cached_failure(entry);
        }

        let attempt = match &self.bridge {
            Some(bridge) => fetch_via_bridge(bridge, video_id).await,
            None => self
                .fetch_direct(video_id, timeout_ms)
                .await
                .map(|(title, status)| (title, Some(status)))
                .map_err(Failure::from),
        };

        match attempt {
            Ok((title, status)) => {
                tracing::debug!(video_id, %path, title = %title, "oEmbed title fetched");
                self.cache.put_title(video_id, &title);
                TitleFetchResult::fetched(title, status, path)
            }
            Err(Failure { status, error }) => {
                let result = TitleFetchResult::failed(status, error.clone(), path);
                if result.blocked {
                    tracing::warn!(video_id, %path, status = ?status, "oEmbed blocked");
                } else {
                    tracing::debug!(video_id, %path, status = ?status, error = ?error, "oEmbed fetch failed");
                }
                self.cache.put_failure(video_id, status, error);
                result
            }
        }
    }

    fn request_url(&self, video_id: &str) -> Result<url::Url, OEmbedError> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        Ok(url::Url::parse_with_params(
            &self.endpoint,
            &[("url", watch_url.as_str()), ("format", "json")],
        )?)
    }

    async fn fetch_direct(
        &self,
        video_id: &str,
        timeout_ms: u64,
    ) -> Result<(String, u16), OEmbedError> {
        let resp = self
            .http
            .get(self.request_url(video_id)?)
            .header("Accept", "application/json")
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OEmbedError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        // Body read errors stay `Http` so a deadline hit mid-body reports as a timeout.
        let bytes = resp.bytes().await?;
        let body: OEmbedResponse =
            serde_json::from_slice(&bytes).map_err(|e| OEmbedError::Parse(e.to_string()))?;

        match body.title {
            Some(title) if !title.trim().is_empty() => Ok((title, status.as_u16())),
            _ => Err(OEmbedError::MissingTitle {
                status: status.as_u16(),
            }),
        }
    }
}

async fn fetch_via_bridge<B: HostBridge>(
    bridge: &B,
    video_id: &str,
) -> Result<(String, Option<u16>), Failure> {
    let resp = bridge
        .fetch_title(video_id)
        .await
        .map_err(|e| Failure {
            status: None,
            error: Some(e.0),
        })?;

    match resp.title.as_deref() {
        Some(title) if resp.ok && !title.trim().is_empty() => Ok((title.to_string(), resp.status)),
        _ => {
            let error = resp.failure_message().or_else(|| {
                resp.ok
                    .then(|| TitleFetchResult::MISSING_TITLE.to_string())
            });
            Err(Failure {
                status: resp.status,
                error,
            })
        }
    }
}

impl<B: HostBridge> TitleSource for OEmbedClient<B> {
    async fn fetch_title(&self, video_id: &str, timeout_ms: u64) -> TitleFetchResult {
        self.fetch(video_id, timeout_ms).await
    }
}
