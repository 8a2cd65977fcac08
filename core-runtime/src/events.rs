//! # Event Bus
//!
//! Broadcast of everything the session orchestrator decides, built on
//! `tokio::sync::broadcast`. Controllers, UIs and tests subscribe to observe
//! the session; nothing received here can mutate it.
//!
//! Events fall into three kinds:
//! - [`SessionEvent`]: activation, metadata and release of the media session
//! - [`PlaybackEvent`]: the playback state broadcast and playback failures
//! - [`ServiceEvent`]: foreground run-mode and notification visibility
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, EventKind, SessionEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut sessions = bus.stream(&[EventKind::Session]);
//!
//! bus.emit(CoreEvent::Session(SessionEvent::Activated {
//!     session: "session-1".to_string(),
//! }))
//! .ok();
//!
//! let event = sessions.recv().await.unwrap();
//! assert_eq!(event.description(), "Session activated");
//! # }
//! ```
//!
//! A receiver that falls behind by more than the bus capacity gets
//! `RecvError::Lagged(n)` and can keep receiving. `RecvError::Closed` means
//! the session and every clone of its bus are gone. Emitting without
//! subscribers fails; publishers ignore that.

use bridge_traits::PlaybackState;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Session(SessionEvent),
    Playback(PlaybackEvent),
    Service(ServiceEvent),
}

/// Category of a [`CoreEvent`], used to narrow an [`EventStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Session,
    Playback,
    Service,
}

impl CoreEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CoreEvent::Session(_) => EventKind::Session,
            CoreEvent::Playback(_) => EventKind::Playback,
            CoreEvent::Service(_) => EventKind::Service,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Service(e) => e.description(),
        }
    }

    /// How loudly a host should surface the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Service(ServiceEvent::EnteredForeground | ServiceEvent::StopRequested)
            | CoreEvent::Session(SessionEvent::Released { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Events about the media session itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// The session became active and accepts transport controls.
    Activated {
        /// Session token.
        session: String,
    },
    /// The session was deactivated (after a stop command).
    Deactivated { session: String },
    /// The prepared media changed.
    MetadataChanged {
        track_id: String,
        title: String,
        artist: Option<String>,
        album: Option<String>,
        duration_ms: Option<u64>,
    },
    /// The session was released; no further events follow.
    Released { session: String },
}

impl SessionEvent {
    fn description(&self) -> &'static str {
        match self {
            SessionEvent::Activated { .. } => "Session activated",
            SessionEvent::Deactivated { .. } => "Session deactivated",
            SessionEvent::MetadataChanged { .. } => "Session metadata changed",
            SessionEvent::Released { .. } => "Session released",
        }
    }
}

/// Session state broadcast consumed by connected controllers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Sent for every adapter report, including position-only refreshes.
    StateChanged {
        state: PlaybackState,
        position_ms: u64,
        track_id: Option<String>,
        title: Option<String>,
    },
    Error {
        track_id: Option<String>,
        message: String,
        /// Whether a later command may succeed.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &'static str {
        match self {
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

/// Run-mode and notification changes decided by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ServiceEvent {
    EnteredForeground,
    LeftForeground {
        /// Whether the notification stayed visible.
        notification_retained: bool,
    },
    /// A notification was posted or replaced.
    NotificationPosted { notification_id: u32, title: String },
    NotificationDismissed { notification_id: u32 },
    /// The host was told it may terminate the service.
    StopRequested,
}

impl ServiceEvent {
    fn description(&self) -> &'static str {
        match self {
            ServiceEvent::EnteredForeground => "Entered foreground run-mode",
            ServiceEvent::LeftForeground { .. } => "Left foreground run-mode",
            ServiceEvent::NotificationPosted { .. } => "Notification posted",
            ServiceEvent::NotificationDismissed { .. } => "Notification dismissed",
            ServiceEvent::StopRequested => "Service stop requested",
        }
    }
}

/// Cloneable publishing handle. Every subscriber sees every event emitted
/// after it subscribed, in emission order.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// # Panics
    ///
    /// Panics if `capacity` is zero; `SessionConfig::validate` rejects that.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns how many subscribers received the event.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Subscribe to the given kinds only. An empty slice means every kind.
    pub fn stream(&self, kinds: &[EventKind]) -> EventStream {
        EventStream::new(self.subscribe(), kinds)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Receiver narrowed to a set of [`EventKind`]s.
#[derive(Debug)]
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    kinds: Vec<EventKind>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>, kinds: &[EventKind]) -> Self {
        Self {
            receiver,
            kinds: kinds.to_vec(),
        }
    }

    fn wants(&self, event: &CoreEvent) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&event.kind())
    }

    /// Next event of a wanted kind.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.wants(&event) {
                return Ok(event);
            }
        }
    }

    /// Next buffered event of a wanted kind, or `None` when nothing is
    /// buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(missed)) => return Some(Err(RecvError::Lagged(missed))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            };
            if self.wants(&event) {
                return Some(Ok(event));
            }
        }
    }

    /// Every buffered event of a wanted kind. Lag is skipped over.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_changed(state: PlaybackState) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::StateChanged {
            state,
            position_ms: 0,
            track_id: Some("track_1".to_string()),
            title: Some("Jazz in Paris".to_string()),
        })
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_fails() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.emit(CoreEvent::Service(ServiceEvent::StopRequested)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let event = state_changed(PlaybackState::Playing);
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_stream_skips_other_kinds() {
        let bus = EventBus::new(10);
        let mut service = bus.stream(&[EventKind::Service]);

        bus.emit(state_changed(PlaybackState::Playing)).ok();
        bus.emit(CoreEvent::Service(ServiceEvent::EnteredForeground))
            .ok();

        assert_eq!(
            service.recv().await.unwrap(),
            CoreEvent::Service(ServiceEvent::EnteredForeground)
        );
    }

    #[test]
    fn test_drain_keeps_order_of_wanted_kinds() {
        let bus = EventBus::new(10);
        let mut playback = bus.stream(&[EventKind::Playback]);
        let mut everything = bus.stream(&[]);

        bus.emit(state_changed(PlaybackState::Preparing)).ok();
        bus.emit(CoreEvent::Service(ServiceEvent::StopRequested)).ok();
        bus.emit(state_changed(PlaybackState::Playing)).ok();

        assert_eq!(
            playback.drain(),
            vec![
                state_changed(PlaybackState::Preparing),
                state_changed(PlaybackState::Playing)
            ]
        );
        assert!(playback.try_recv().is_none());
        assert_eq!(everything.drain().len(), 3);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for _ in 0..5 {
            bus.emit(state_changed(PlaybackState::Playing)).ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity_and_description() {
        let error = CoreEvent::Playback(PlaybackEvent::Error {
            track_id: None,
            message: "unplayable".to_string(),
            recoverable: true,
        });
        assert_eq!(error.severity(), EventSeverity::Error);
        assert_eq!(error.description(), "Playback error");
        assert_eq!(error.kind(), EventKind::Playback);

        let foreground = CoreEvent::Service(ServiceEvent::EnteredForeground);
        assert_eq!(foreground.severity(), EventSeverity::Info);

        assert_eq!(
            state_changed(PlaybackState::Paused).severity(),
            EventSeverity::Debug
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = state_changed(PlaybackState::Error {
            message: "no source".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Playback\""));
        assert!(json.contains("no source"));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
