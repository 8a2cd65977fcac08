//! Playback bridge traits and supporting session types.
//!
//! The host owns the actual audio player (Android `MediaPlayer`, a desktop
//! audio stack, ...). The core only commands it through [`PlaybackAdapter`] and
//! observes it through the [`PlaybackSnapshot`] stream the adapter reports on.
//! Reports travel over an unbounded channel, so they are delivered in the order
//! the adapter produced them and never block the audio thread that emits them.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of a media session. Carried by notifications so the host can
/// route their actions back to the right session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Generate a new session token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct a token from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback lifecycle state as observed from the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Preparing,
    Playing,
    Paused,
    Stopped,
    Error {
        message: String,
    },
}

impl PlaybackState {
    /// Short human-readable label, used by notifications and logs.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::Preparing => "Preparing",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Error { .. } => "Error",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackState::Error { .. })
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Error { message } => write!(f, "Error({})", message),
            other => f.write_str(other.label()),
        }
    }
}

/// Metadata describing the media handed to an adapter. Hosts use it to
/// populate their media session and notification entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackMetadata {
    /// Catalog identifier of the media.
    pub media_id: String,
    /// Display title.
    pub title: String,
    /// Display artist string.
    pub artist: Option<String>,
    /// Album or collection name.
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Duration hint; the adapter may learn the real value once prepared.
    pub duration: Option<Duration>,
    /// Host-resolvable artwork reference (resource name, URI, ...).
    pub artwork_ref: Option<String>,
    /// Host-resolvable audio source. `None` means nothing can be played.
    pub media_uri: Option<String>,
    /// Arbitrary extra fields.
    pub extra: HashMap<String, String>,
}

impl PlaybackMetadata {
    pub fn new(media_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_artwork_ref(mut self, artwork_ref: impl Into<String>) -> Self {
        self.artwork_ref = Some(artwork_ref.into());
        self
    }

    pub fn with_media_uri(mut self, uri: impl Into<String>) -> Self {
        self.media_uri = Some(uri.into());
        self
    }
}

/// A single state report emitted by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    /// Playback position at `updated_at`.
    pub position: Duration,
    /// Media the adapter had loaded when the report was produced.
    pub media_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PlaybackSnapshot {
    pub fn new(state: PlaybackState, position: Duration) -> Self {
        Self {
            state,
            position,
            media_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_media_id(mut self, media_id: impl Into<String>) -> Self {
        self.media_id = Some(media_id.into());
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    pub fn position_ms(&self) -> u64 {
        duration_ms(self.position)
    }
}

/// Whole milliseconds of `duration`, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}

/// Receiving half of an adapter's report stream.
pub type PlaybackEventReceiver = mpsc::UnboundedReceiver<PlaybackSnapshot>;

/// Sending half handed to an adapter at construction time.
#[derive(Debug, Clone)]
pub struct PlaybackEventSender {
    inner: mpsc::UnboundedSender<PlaybackSnapshot>,
}

impl PlaybackEventSender {
    /// Report a state change. Returns `false` once nobody listens anymore,
    /// which adapters treat as "session released".
    pub fn report(&self, snapshot: PlaybackSnapshot) -> bool {
        self.inner.send(snapshot).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Create the report channel linking an adapter to its session.
pub fn playback_event_channel() -> (PlaybackEventSender, PlaybackEventReceiver) {
    let (inner, receiver) = mpsc::unbounded_channel();
    (PlaybackEventSender { inner }, receiver)
}

/// Trait for platform playback adapters wrapping a single native player.
///
/// Commands return as soon as the player accepted them; the resulting state
/// is only observable through the adapter's [`PlaybackEventSender`].
/// Implementations must tolerate commands that do not fit the current state,
/// either by ignoring them or by returning
/// [`BridgeError::CommandRejected`](crate::BridgeError::CommandRejected).
#[async_trait::async_trait]
pub trait PlaybackAdapter: Send + Sync {
    /// Load `media` (unless it is already loaded) and start playing it.
    /// Any work belonging to previously loaded media is discarded.
    async fn play_from_media(&self, media: PlaybackMetadata) -> Result<()>;

    /// Pause playback, keeping the loaded media.
    async fn pause(&self) -> Result<()>;

    /// Stop playback and release the native player.
    async fn stop(&self) -> Result<()>;

    /// Seek to an absolute position within the loaded media.
    async fn seek_to(&self, position: Duration) -> Result<()>;

    /// Media currently loaded into the player, if any.
    fn current_media(&self) -> Option<PlaybackMetadata>;

    /// Release every native resource. Called once when the session is destroyed.
    async fn release(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_is_unique() {
        let a = SessionToken::new();
        let b = SessionToken::new();
        assert_ne!(a, b);
        assert_eq!(a, SessionToken::from_uuid(*a.as_uuid()));
    }

    #[test]
    fn playback_state_labels() {
        assert_eq!(PlaybackState::default(), PlaybackState::Idle);
        assert_eq!(PlaybackState::Playing.to_string(), "Playing");
        let err = PlaybackState::Error {
            message: "unplayable".to_string(),
        };
        assert_eq!(err.label(), "Error");
        assert_eq!(err.to_string(), "Error(unplayable)");
        assert!(err.is_error());
    }

    #[test]
    fn playback_state_serializes_tagged() {
        let json = serde_json::to_string(&PlaybackState::Paused).unwrap();
        assert_eq!(json, r#"{"state":"paused"}"#);
    }

    #[test]
    fn snapshot_position_in_millis() {
        let snapshot = PlaybackSnapshot::new(PlaybackState::Playing, Duration::from_secs(3))
            .with_media_id("track_1");
        assert_eq!(snapshot.position_ms(), 3000);
        assert_eq!(snapshot.media_id.as_deref(), Some("track_1"));
    }

    #[test]
    fn duration_ms_saturates() {
        assert_eq!(duration_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn event_channel_preserves_order() {
        let (sender, mut receiver) = playback_event_channel();
        assert!(sender.report(PlaybackSnapshot::new(PlaybackState::Preparing, Duration::ZERO)));
        assert!(sender.report(PlaybackSnapshot::new(PlaybackState::Playing, Duration::ZERO)));

        assert_eq!(receiver.recv().await.unwrap().state, PlaybackState::Preparing);
        assert_eq!(receiver.recv().await.unwrap().state, PlaybackState::Playing);

        drop(receiver);
        assert!(!sender.report(PlaybackSnapshot::new(PlaybackState::Stopped, Duration::ZERO)));
        assert!(sender.is_closed());
    }
}
