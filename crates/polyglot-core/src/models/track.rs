use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend an audio track descriptor was collected from.
///
/// Closed on purpose: a new backend has to be added here and to
/// [`AudioMetadata::sources`] before its tracks take part in aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackSource {
    Mweb,
    Web,
    Dash,
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mweb => write!(f, "MWEB"),
            Self::Web => write!(f, "WEB"),
            Self::Dash => write!(f, "DASH"),
        }
    }
}

/// Upstream format identifier; itags arrive as numbers, some backends send strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatId {
    Itag(u64),
    Text(String),
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Itag(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A track descriptor as one backend reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAudioTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub language_name: Option<String>,
    #[serde(default)]
    pub format_id: Option<FormatId>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub is_original: bool,
    #[serde(default)]
    pub bitrate: Option<u32>,
}

/// Per-backend audio track lists for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    #[serde(default)]
    pub mweb: Vec<RawAudioTrack>,
    #[serde(default)]
    pub web: Vec<RawAudioTrack>,
    #[serde(default)]
    pub dash: Vec<RawAudioTrack>,
}

impl AudioMetadata {
    /// Source lists in aggregation order.
    pub fn sources(&self) -> [(TrackSource, &[RawAudioTrack]); 3] {
        [
            (TrackSource::Mweb, self.mweb.as_slice()),
            (TrackSource::Web, self.web.as_slice()),
            (TrackSource::Dash, self.dash.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.mweb.is_empty() && self.web.is_empty() && self.dash.is_empty()
    }
}

/// An aggregated, deduplicated audio track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTrack {
    pub id: String,
    pub language_code: String,
    pub language_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub is_original: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_id: Option<FormatId>,
    pub source: TrackSource,
}

impl AudioTrack {
    /// Whether the track has a non-empty URL the player can switch to.
    pub fn is_playable(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_track_accepts_numeric_and_string_format_ids() {
        let json = r#"{
            "dash": [{"languageCode": "en", "formatId": 251, "url": "https://a"}],
            "web": [{"languageCode": "de", "formatId": "251-drc"}]
        }"#;
        let meta: AudioMetadata = serde_json::from_str(json).unwrap();
        assert!(meta.mweb.is_empty());
        assert_eq!(meta.dash[0].format_id, Some(FormatId::Itag(251)));
        assert_eq!(
            meta.web[0].format_id,
            Some(FormatId::Text("251-drc".into()))
        );
        assert!(!meta.web[0].is_original);
    }

    #[test]
    fn test_playable_requires_non_blank_url() {
        let mut track = AudioTrack {
            id: "a".into(),
            language_code: "en".into(),
            language_name: "English".into(),
            url: Some("  ".into()),
            is_original: false,
            bitrate: None,
            format_id: None,
            source: TrackSource::Web,
        };
        assert!(!track.is_playable());
        track.url = Some("https://example.com/audio".into());
        assert!(track.is_playable());
    }

    #[test]
    fn test_source_display_matches_serde() {
        assert_eq!(TrackSource::Dash.to_string(), "DASH");
        assert_eq!(
            serde_json::to_value(TrackSource::Mweb).unwrap(),
            serde_json::json!("MWEB")
        );
    }
}
