//! The media session: the externally visible face of playback.
//!
//! Connected controllers (lock screen, headset buttons, companion apps) only
//! ever see what the session publishes: whether it is active, the metadata of
//! the prepared media and the current playback state. Every change is
//! broadcast on the [`EventBus`].

use bridge_traits::{duration_ms, PlaybackMetadata, PlaybackSnapshot, PlaybackState, SessionToken};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, SessionEvent};
use std::time::Duration;
use tracing::debug;

pub struct MediaSession {
    token: SessionToken,
    tag: String,
    active: bool,
    released: bool,
    metadata: Option<PlaybackMetadata>,
    playback: PlaybackSnapshot,
    events: EventBus,
}

impl MediaSession {
    pub fn new(tag: impl Into<String>, events: EventBus) -> Self {
        Self {
            token: SessionToken::new(),
            tag: tag.into(),
            active: false,
            released: false,
            metadata: None,
            playback: PlaybackSnapshot::new(PlaybackState::Idle, Duration::ZERO),
            events,
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn metadata(&self) -> Option<&PlaybackMetadata> {
        self.metadata.as_ref()
    }

    pub fn playback(&self) -> &PlaybackSnapshot {
        &self.playback
    }

    /// Mark the session as accepting transport controls. Only actual changes
    /// are broadcast.
    pub fn set_active(&mut self, active: bool) {
        if self.released || self.active == active {
            return;
        }

        self.active = active;
        let session = self.token.to_string();
        let event = if active {
            SessionEvent::Activated { session }
        } else {
            SessionEvent::Deactivated { session }
        };
        debug!(tag = %self.tag, active, "Session activity changed");
        self.emit(CoreEvent::Session(event));
    }

    pub fn set_metadata(&mut self, metadata: PlaybackMetadata) {
        if self.metadata.as_ref() == Some(&metadata) {
            return;
        }

        self.emit(CoreEvent::Session(SessionEvent::MetadataChanged {
            track_id: metadata.media_id.clone(),
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            album: metadata.album.clone(),
            duration_ms: metadata.duration.map(duration_ms),
        }));
        self.metadata = Some(metadata);
    }

    /// Publish the latest observed playback state. Always broadcast, even
    /// when only the position moved.
    pub fn set_playback_state(&mut self, snapshot: PlaybackSnapshot) {
        let (track_id, title) = match &self.metadata {
            Some(metadata) => (Some(metadata.media_id.clone()), Some(metadata.title.clone())),
            None => (snapshot.media_id.clone(), None),
        };

        self.emit(CoreEvent::Playback(PlaybackEvent::StateChanged {
            state: snapshot.state.clone(),
            position_ms: snapshot.position_ms(),
            track_id,
            title,
        }));
        self.playback = snapshot;
    }

    /// Deactivate the session for good. Later calls are no-ops.
    pub fn release(&mut self) {
        if self.released {
            return;
        }

        self.active = false;
        self.released = true;
        self.emit(CoreEvent::Session(SessionEvent::Released {
            session: self.token.to_string(),
        }));
    }

    fn emit(&self, event: CoreEvent) {
        // No subscriber is a valid situation for a session.
        self.events.emit(event).ok();
    }
}
