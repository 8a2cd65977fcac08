//! # Playback Controller
//!
//! Thin command layer over the platform [`PlaybackAdapter`]. It resolves
//! catalog ids into tracks and translates bridge failures into
//! [`PlaybackError`]s the session can act on:
//!
//! | Bridge error        | Playback error      | Session reaction        |
//! |---------------------|---------------------|-------------------------|
//! | `CommandRejected`   | `AdapterRejected`   | ignored (no-op)         |
//! | `OperationFailed`   | `PlaybackFailed`    | `Error` playback state  |
//! | anything else       | `Bridge`            | `Error` playback state  |
//!
//! The controller does not track playback state. State is only ever learned
//! from the adapter's report stream.

use crate::error::{PlaybackError, Result};
use bridge_traits::{PlaybackAdapter, PlaybackMetadata};
use core_library::{MusicLibrary, Track};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Issues commands to a single playback adapter.
#[derive(Clone)]
pub struct PlaybackController {
    adapter: Arc<dyn PlaybackAdapter>,
    library: Arc<MusicLibrary>,
}

impl PlaybackController {
    pub fn new(adapter: Arc<dyn PlaybackAdapter>, library: Arc<MusicLibrary>) -> Self {
        Self { adapter, library }
    }

    pub fn library(&self) -> &MusicLibrary {
        &self.library
    }

    /// Look up a catalog entry.
    pub fn resolve(&self, track_id: &str) -> Result<Track> {
        Ok(self.library.get(track_id)?.clone())
    }

    /// Load `track` into the adapter and start playing it.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn play(&self, track: &Track) -> Result<()> {
        debug!(title = %track.title, "Handing track to adapter");
        self.adapter.play_from_media(track.to_metadata()).await?;
        Ok(())
    }

    /// Play the prepared track, failing with [`PlaybackError::NoTrackPrepared`]
    /// when there is none.
    pub async fn resume(&self, prepared: Option<&Track>) -> Result<()> {
        match prepared {
            Some(track) => self.play(track).await,
            None => Err(PlaybackError::NoTrackPrepared),
        }
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) -> Result<()> {
        self.adapter.pause().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        self.adapter.stop().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(position_ms = bridge_traits::duration_ms(position)))]
    pub async fn seek(&self, position: Duration) -> Result<()> {
        self.adapter.seek_to(position).await?;
        Ok(())
    }

    /// Media the adapter currently has loaded.
    pub fn current_media(&self) -> Option<PlaybackMetadata> {
        self.adapter.current_media()
    }

    /// Release the adapter's native resources.
    pub async fn release(&self) -> Result<()> {
        self.adapter.release().await?;
        Ok(())
    }
}
