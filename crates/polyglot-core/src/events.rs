use serde::Serialize;
use tokio::sync::broadcast;

/// Events consumed by UI layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PolyglotEvent {
    /// A UI layer asks for a track that may not be loaded yet.
    #[serde(rename_all = "camelCase")]
    AudioTrackSwitchRequested {
        audio_track_id: String,
        language: String,
    },
    /// Fire-and-forget user notice.
    Toast { message: String },
}

/// Broadcast bus for [`PolyglotEvent`]s. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PolyglotEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event, ignoring whether anyone is listening.
    pub fn publish(&self, event: PolyglotEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        tracing::trace!(delivered, "Event published");
    }

    pub fn toast(&self, message: impl Into<String>) {
        self.publish(PolyglotEvent::Toast {
            message: message.into(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PolyglotEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::default();
        bus.toast("nobody hears this");
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribers_receive_events() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(PolyglotEvent::AudioTrackSwitchRequested {
            audio_track_id: "DASH-251".into(),
            language: "de".into(),
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            PolyglotEvent::AudioTrackSwitchRequested {
                audio_track_id: "DASH-251".into(),
                language: "de".into(),
            }
        );
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(PolyglotEvent::AudioTrackSwitchRequested {
            audio_track_id: "x".into(),
            language: "en".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "audioTrackSwitchRequested");
        assert_eq!(json["audioTrackId"], "x");
    }
}
