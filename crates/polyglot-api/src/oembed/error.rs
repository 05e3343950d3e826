use thiserror::Error;

/// Errors from a direct oEmbed request.
#[derive(Debug, Error)]
pub enum OEmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("response (status {status}) has no title")]
    MissingTitle { status: u16 },
}

/// A host bridge call that failed before producing a response.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BridgeError(pub String);
