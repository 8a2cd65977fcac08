//! Simulated Playback Adapter Implementation
//!
//! An in-process player that follows the state machine of a native media
//! player without producing audio. Position advances with the injected
//! [`Clock`] while playing.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    playback::{
        PlaybackAdapter, PlaybackEventSender, PlaybackMetadata, PlaybackSnapshot, PlaybackState,
    },
    time::{Clock, SystemClock},
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Desktop stand-in for a platform media player.
pub struct SimulatedPlayer {
    events: PlaybackEventSender,
    clock: Arc<dyn Clock>,
    inner: Mutex<PlayerState>,
}

#[derive(Default)]
struct PlayerState {
    media: Option<PlaybackMetadata>,
    state: PlaybackState,
    /// Position at `playing_since`, or the frozen position when not playing.
    position: Duration,
    playing_since: Option<DateTime<Utc>>,
    released: bool,
}

impl PlayerState {
    fn position_at(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = self
            .playing_since
            .and_then(|since| (now - since).to_std().ok())
            .unwrap_or_default();
        let position = self.position + elapsed;

        match self.media.as_ref().and_then(|media| media.duration) {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    /// Fold elapsed play time into `position` and stop the clock.
    fn freeze(&mut self, now: DateTime<Utc>) {
        self.position = self.position_at(now);
        self.playing_since = None;
    }
}

impl SimulatedPlayer {
    /// Create a player reporting through `events`, using the system clock.
    pub fn new(events: PlaybackEventSender) -> Self {
        Self::with_clock(events, Arc::new(SystemClock))
    }

    pub fn with_clock(events: PlaybackEventSender, clock: Arc<dyn Clock>) -> Self {
        Self {
            events,
            clock,
            inner: Mutex::new(PlayerState::default()),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.lock().state.clone()
    }

    pub fn position(&self) -> Duration {
        let now = self.clock.now();
        self.inner.lock().position_at(now)
    }

    pub fn is_released(&self) -> bool {
        self.inner.lock().released
    }

    /// Simulate the end of the loaded track: the player rewinds and pauses,
    /// keeping the media loaded.
    pub fn complete(&self) -> Result<()> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        Self::ensure_usable(&inner)?;

        if inner.media.is_none() {
            return Err(BridgeError::CommandRejected(
                "No media loaded to complete".to_string(),
            ));
        }

        inner.playing_since = None;
        inner.position = Duration::ZERO;
        self.transition(&mut inner, PlaybackState::Paused, now);
        Ok(())
    }

    fn ensure_usable(inner: &PlayerState) -> Result<()> {
        if inner.released {
            return Err(BridgeError::NotAvailable("Player was released".to_string()));
        }
        Ok(())
    }

    /// Record `state` and report it. Called with the state lock held so
    /// reports leave in transition order.
    fn transition(&self, inner: &mut PlayerState, state: PlaybackState, now: DateTime<Utc>) {
        inner.state = state;
        self.report(inner, now);
    }

    fn report(&self, inner: &PlayerState, now: DateTime<Utc>) {
        let mut snapshot =
            PlaybackSnapshot::new(inner.state.clone(), inner.position_at(now)).with_updated_at(now);
        if let Some(media) = &inner.media {
            snapshot = snapshot.with_media_id(media.media_id.clone());
        }

        debug!(state = %snapshot.state, position_ms = snapshot.position_ms(), "Player report");
        if !self.events.report(snapshot) {
            warn!("Playback report dropped: no session is listening");
        }
    }
}

#[async_trait]
impl PlaybackAdapter for SimulatedPlayer {
    async fn play_from_media(&self, media: PlaybackMetadata) -> Result<()> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        Self::ensure_usable(&inner)?;

        if media.media_uri.is_none() {
            return Err(BridgeError::OperationFailed(format!(
                "No playable source for media '{}'",
                media.media_id
            )));
        }

        let same_media = inner
            .media
            .as_ref()
            .is_some_and(|loaded| loaded.media_id == media.media_id);

        if same_media {
            let current = inner.state.clone();
            match current {
                PlaybackState::Playing | PlaybackState::Preparing => {
                    debug!(media_id = %media.media_id, "Already playing requested media");
                    return Ok(());
                }
                PlaybackState::Paused => {
                    inner.playing_since = Some(now);
                    self.transition(&mut inner, PlaybackState::Playing, now);
                    return Ok(());
                }
                _ => {}
            }
        }

        // New media (or a restart after stop/error): discard the old source.
        inner.media = Some(media);
        inner.position = Duration::ZERO;
        inner.playing_since = None;
        self.transition(&mut inner, PlaybackState::Preparing, now);

        inner.playing_since = Some(now);
        self.transition(&mut inner, PlaybackState::Playing, now);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        Self::ensure_usable(&inner)?;

        if !inner.state.is_playing() {
            return Err(BridgeError::CommandRejected(format!(
                "Cannot pause while {}",
                inner.state
            )));
        }

        inner.freeze(now);
        self.transition(&mut inner, PlaybackState::Paused, now);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        Self::ensure_usable(&inner)?;

        if inner.media.is_none() {
            return Err(BridgeError::CommandRejected(
                "Nothing loaded to stop".to_string(),
            ));
        }

        inner.playing_since = None;
        inner.position = Duration::ZERO;
        self.transition(&mut inner, PlaybackState::Stopped, now);

        // Stopping releases the native player; the next play starts fresh.
        inner.media = None;
        Ok(())
    }

    async fn seek_to(&self, position: Duration) -> Result<()> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        Self::ensure_usable(&inner)?;

        let Some(media) = inner.media.as_ref() else {
            return Err(BridgeError::CommandRejected(
                "Cannot seek without loaded media".to_string(),
            ));
        };

        let target = match media.duration {
            Some(duration) => position.min(duration),
            None => position,
        };

        inner.position = target;
        if inner.playing_since.is_some() {
            inner.playing_since = Some(now);
        }
        self.report(&inner, now);
        Ok(())
    }

    fn current_media(&self) -> Option<PlaybackMetadata> {
        self.inner.lock().media.clone()
    }

    async fn release(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.released {
            return Ok(());
        }

        inner.media = None;
        inner.playing_since = None;
        inner.position = Duration::ZERO;
        inner.state = PlaybackState::Idle;
        inner.released = true;
        debug!("Simulated player released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::playback::playback_event_channel;
    use bridge_traits::time::FixedClock;

    fn track(id: &str) -> PlaybackMetadata {
        PlaybackMetadata::new(id, id).with_media_uri(format!("{id}.mp3"))
    }

    #[tokio::test]
    async fn test_new_media_reports_preparing_then_playing() {
        let (tx, mut rx) = playback_event_channel();
        let player = SimulatedPlayer::new(tx);

        player.play_from_media(track("track_1")).await.unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.state, PlaybackState::Preparing);
        assert_eq!(second.state, PlaybackState::Playing);
        assert_eq!(second.media_id.as_deref(), Some("track_1"));
    }

    #[tokio::test]
    async fn test_pause_rejected_unless_playing() {
        let (tx, _rx) = playback_event_channel();
        let player = SimulatedPlayer::new(tx);

        let err = player.pause().await.unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_unplayable_media_fails() {
        let (tx, mut rx) = playback_event_channel();
        let player = SimulatedPlayer::new(tx);

        let err = player
            .play_from_media(PlaybackMetadata::new("silent", "Silent"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::OperationFailed(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_released_player_is_unavailable() {
        let (tx, _rx) = playback_event_channel();
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let player = SimulatedPlayer::with_clock(tx, clock);

        player.release().await.unwrap();
        assert!(player.is_released());
        assert!(matches!(
            player.play_from_media(track("track_1")).await,
            Err(BridgeError::NotAvailable(_))
        ));
    }
}
