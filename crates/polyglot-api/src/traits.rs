//! Seams between title restoration and the outside world.
//!
//! The pipeline only sees [`TitleSource`]; the oEmbed client reaches a
//! privileged host process through [`HostBridge`] when one is available.

use std::future::Future;

use crate::oembed::{BridgeError, BridgeResponse, TitleFetchResult};

/// Anything that can produce a canonical title for a content ID.
pub trait TitleSource: Send + Sync {
    /// Look up the canonical title. Never fails; failures are reported in the result.
    fn fetch_title(
        &self,
        video_id: &str,
        timeout_ms: u64,
    ) -> impl Future<Output = TitleFetchResult> + Send;
}

/// Request/response channel to a host process that performs the fetch.
pub trait HostBridge: Send + Sync {
    fn fetch_title(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<BridgeResponse, BridgeError>> + Send;
}

/// Placeholder bridge type for clients that always fetch directly.
#[derive(Debug, Clone, Copy)]
pub enum NoBridge {}

impl HostBridge for NoBridge {
    async fn fetch_title(&self, _video_id: &str) -> Result<BridgeResponse, BridgeError> {
        match *self {}
    }
}
