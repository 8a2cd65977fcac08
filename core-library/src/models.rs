//! Domain models for the track catalog

use bridge_traits::PlaybackMetadata;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A catalog entry. Tracks are built once with the catalog and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier used by transport commands (`play_from_id`)
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    /// Duration advertised before the player has inspected the media
    pub duration_hint: Duration,
    /// Host-resolvable artwork reference
    pub artwork_ref: String,
    /// Host-resolvable audio source; `None` for entries that cannot be played
    pub media_uri: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: String::new(),
            album: String::new(),
            genre: String::new(),
            duration_hint: Duration::ZERO,
            artwork_ref: String::new(),
            media_uri: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_duration_hint(mut self, duration: Duration) -> Self {
        self.duration_hint = duration;
        self
    }

    pub fn with_artwork_ref(mut self, artwork_ref: impl Into<String>) -> Self {
        self.artwork_ref = artwork_ref.into();
        self
    }

    pub fn with_media_uri(mut self, uri: impl Into<String>) -> Self {
        self.media_uri = Some(uri.into());
        self
    }

    /// Validate track data
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Track id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Track title cannot be empty".to_string());
        }

        Ok(())
    }

    /// Subtitle shown under the title in lists ("artist · album").
    pub fn subtitle(&self) -> String {
        match (self.artist.is_empty(), self.album.is_empty()) {
            (false, false) => format!("{} · {}", self.artist, self.album),
            (false, true) => self.artist.clone(),
            (true, false) => self.album.clone(),
            (true, true) => String::new(),
        }
    }

    /// Metadata handed to the playback adapter and the media session.
    pub fn to_metadata(&self) -> PlaybackMetadata {
        fn non_empty(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }

        PlaybackMetadata {
            media_id: self.id.clone(),
            title: self.title.clone(),
            artist: non_empty(&self.artist),
            album: non_empty(&self.album),
            genre: non_empty(&self.genre),
            duration: (!self.duration_hint.is_zero()).then_some(self.duration_hint),
            artwork_ref: non_empty(&self.artwork_ref),
            media_uri: self.media_uri.clone(),
            extra: Default::default(),
        }
    }
}

/// Browsable description of a playable catalog entry, as exposed to
/// connected media browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub media_id: String,
    pub title: String,
    pub subtitle: String,
    pub artwork_ref: Option<String>,
    pub playable: bool,
}

impl From<&Track> for MediaItem {
    fn from(track: &Track) -> Self {
        Self {
            media_id: track.id.clone(),
            title: track.title.clone(),
            subtitle: track.subtitle(),
            artwork_ref: (!track.artwork_ref.is_empty()).then(|| track.artwork_ref.clone()),
            playable: track.media_uri.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Track {
        Track::new("track_1", "Jazz in Paris")
            .with_artist("Media Right Productions")
            .with_album("Jazz & Blues")
            .with_genre("Jazz")
            .with_duration_hint(Duration::from_secs(103))
            .with_artwork_ref("album_jazz_blues")
            .with_media_uri("jazz_in_paris.mp3")
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(sample().validate().is_ok());
        assert!(Track::new("", "Title").validate().is_err());
        assert!(Track::new("id", "  ").validate().is_err());
    }

    #[test]
    fn test_to_metadata_maps_every_field() {
        let metadata = sample().to_metadata();
        assert_eq!(metadata.media_id, "track_1");
        assert_eq!(metadata.title, "Jazz in Paris");
        assert_eq!(metadata.artist.as_deref(), Some("Media Right Productions"));
        assert_eq!(metadata.duration, Some(Duration::from_secs(103)));
        assert_eq!(metadata.media_uri.as_deref(), Some("jazz_in_paris.mp3"));
    }

    #[test]
    fn test_to_metadata_drops_empty_fields() {
        let metadata = Track::new("bare", "Bare").to_metadata();
        assert!(metadata.artist.is_none());
        assert!(metadata.duration.is_none());
        assert!(metadata.artwork_ref.is_none());
        assert!(metadata.media_uri.is_none());
    }

    #[test]
    fn test_subtitle_variants() {
        assert_eq!(sample().subtitle(), "Media Right Productions · Jazz & Blues");
        assert_eq!(Track::new("a", "A").with_album("Only").subtitle(), "Only");
        assert_eq!(Track::new("a", "A").subtitle(), "");
    }

    #[test]
    fn test_media_item_marks_unplayable_entries() {
        let item = MediaItem::from(&Track::new("silent", "Silence"));
        assert!(!item.playable);
        assert!(MediaItem::from(&sample()).playable);
    }
}
