mod track;
mod video;

pub use track::{AudioMetadata, AudioTrack, FormatId, RawAudioTrack, TrackSource};
pub use video::{ItemKind, VideoItem};
