use std::fmt;

use serde::{Deserialize, Serialize};

use super::cache::NegativeEntry;

/// How a title lookup was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPath {
    Cache,
    HostBridge,
    Direct,
}

impl fmt::Display for FetchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::HostBridge => write!(f, "host-bridge"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

/// Outcome of a canonical title lookup. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleFetchResult {
    pub ok: bool,
    pub title: Option<String>,
    pub status: Option<u16>,
    /// Upstream refused the request (HTTP 401/403).
    pub blocked: bool,
    pub from_cache: bool,
    pub path: FetchPath,
    pub error: Option<String>,
}

pub(crate) fn is_blocked(status: Option<u16>) -> bool {
    matches!(status, Some(401 | 403))
}

impl TitleFetchResult {
    pub const INVALID_ARGUMENT: &'static str = "invalid-argument";
    pub const MISSING_TITLE: &'static str = "missing-title";
    pub const TIMEOUT: &'static str = "timeout";

    pub(crate) fn invalid_argument(path: FetchPath) -> Self {
        Self {
            ok: false,
            title: None,
            status: None,
            blocked: false,
            from_cache: false,
            path,
            error: Some(Self::INVALID_ARGUMENT.into()),
        }
    }

    pub(crate) fn cached_title(title: String) -> Self {
        Self {
            ok: true,
            title: Some(title),
            status: Some(200),
            blocked: false,
            from_cache: true,
            path: FetchPath::Cache,
            error: None,
        }
    }

    pub(crate) fn cached_failure(entry: NegativeEntry) -> Self {
        Self {
            ok: false,
            title: None,
            status: entry.status,
            blocked: is_blocked(entry.status),
            from_cache: true,
            path: FetchPath::Cache,
            error: entry.error,
        }
    }

    pub(crate) fn fetched(title: String, status: Option<u16>, path: FetchPath) -> Self {
        Self {
            ok: true,
            title: Some(title),
            status,
            blocked: false,
            from_cache: false,
            path,
            error: None,
        }
    }

    pub(crate) fn failed(status: Option<u16>, error: Option<String>, path: FetchPath) -> Self {
        Self {
            ok: false,
            title: None,
            status,
            blocked: is_blocked(status),
            from_cache: false,
            path,
            error,
        }
    }

    /// The fetched title, if the lookup succeeded with a non-blank one.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|t| self.ok && !t.trim().is_empty())
    }
}

/// Reply from a privileged host process that fetched the title on our behalf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
}

impl BridgeResponse {
    /// First available failure description: message, error, then status text.
    pub fn failure_message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .or_else(|| self.status_text.clone())
    }
}

/// Body of a successful oEmbed response; only the title is read.
#[derive(Debug, Deserialize)]
pub(crate) struct OEmbedResponse {
    #[serde(default)]
    pub title: Option<String>,
}
