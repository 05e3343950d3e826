pub mod oembed;
pub mod traits;
pub mod translate;
