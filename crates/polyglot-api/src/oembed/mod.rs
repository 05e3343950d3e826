pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use cache::TitleCache;
pub use client::OEmbedClient;
pub use error::{BridgeError, OEmbedError};
pub use types::{BridgeResponse, FetchPath, TitleFetchResult};
