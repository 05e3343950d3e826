use serde::{Deserialize, Serialize};

/// Kind of entry in a result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Video,
    Channel,
    Playlist,
    #[serde(other)]
    Other,
}

/// A list entry as served by the upstream API.
///
/// Only the fields title restoration reads or writes are typed; everything
/// else is kept in `extra` and serialized back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ItemKind,

    /// Set once the item went through title restoration, whatever the outcome.
    #[serde(rename = "_titleLangFixed", default, skip_serializing_if = "is_false")]
    pub title_lang_fixed: bool,
    /// Title shown before restoration replaced it.
    #[serde(rename = "_originalTitle", default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(rename = "_titleRestored", default, skip_serializing_if = "is_false")]
    pub title_restored: bool,
    #[serde(rename = "_isMultiAudio", default, skip_serializing_if = "is_false")]
    pub is_multi_audio: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl VideoItem {
    pub fn video(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: Some(video_id.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Mark as processed, leaving the title alone.
    pub fn into_fixed(mut self) -> Self {
        self.title_lang_fixed = true;
        self
    }

    /// Swap in a restored title, remembering the one it replaces.
    pub fn into_restored(mut self, title: String) -> Self {
        self.original_title = self.title.take();
        self.title = Some(title);
        self.title_restored = true;
        self.title_lang_fixed = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let json = r#"{
            "type": "video",
            "videoId": "abc123",
            "title": "Hello",
            "author": "Someone",
            "lengthSeconds": 42
        }"#;
        let item: VideoItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.video_id.as_deref(), Some("abc123"));
        assert_eq!(item.kind, ItemKind::Video);
        assert!(!item.title_lang_fixed);
        assert_eq!(item.extra["author"], "Someone");

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["lengthSeconds"], 42);
        assert!(back.get("_titleLangFixed").is_none());
    }

    #[test]
    fn test_pipeline_fields_use_underscore_names() {
        let item = VideoItem::video("abc", "Translated").into_restored("Original".into());
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["title"], "Original");
        assert_eq!(value["_originalTitle"], "Translated");
        assert_eq!(value["_titleRestored"], true);
        assert_eq!(value["_titleLangFixed"], true);
    }

    #[test]
    fn test_unknown_kind() {
        let item: VideoItem = serde_json::from_str(r#"{"type": "short"}"#).unwrap();
        assert_eq!(item.kind, ItemKind::Other);
    }
}
