//! Static in-memory track catalog.
//!
//! The catalog is assembled once, validated, and then only read. Order is
//! preserved so list views render entries in a stable sequence.

use crate::error::{LibraryError, Result};
use crate::models::{MediaItem, Track};
use bridge_traits::PlaybackMetadata;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Ordered, immutable collection of tracks.
#[derive(Debug, Clone)]
pub struct MusicLibrary {
    tracks: Vec<Track>,
    index: HashMap<String, usize>,
}

impl MusicLibrary {
    /// Build a catalog from `tracks`, rejecting invalid entries and duplicate ids.
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tracks.len());

        for (position, track) in tracks.iter().enumerate() {
            track
                .validate()
                .map_err(|message| LibraryError::InvalidTrack {
                    id: track.id.clone(),
                    message,
                })?;

            if index.insert(track.id.clone(), position).is_some() {
                return Err(LibraryError::DuplicateId(track.id.clone()));
            }
        }

        debug!(tracks = tracks.len(), "Catalog built");
        Ok(Self { tracks, index })
    }

    /// The catalog compiled into the application.
    pub fn builtin() -> Self {
        let tracks = vec![
            Track::new("track_1", "Jazz in Paris")
                .with_artist("Media Right Productions")
                .with_album("Jazz & Blues")
                .with_genre("Jazz")
                .with_duration_hint(Duration::from_secs(103))
                .with_artwork_ref("album_jazz_blues")
                .with_media_uri("jazz_in_paris.mp3"),
            Track::new("track_2", "The Coldest Shoulder")
                .with_artist("The 126ers")
                .with_album("Youtube Audio Library Rock 2")
                .with_genre("Rock")
                .with_duration_hint(Duration::from_secs(160))
                .with_artwork_ref("album_youtube_audio_library_rock_2")
                .with_media_uri("the_coldest_shoulder.mp3"),
        ];

        let mut index = HashMap::with_capacity(tracks.len());
        for (position, track) in tracks.iter().enumerate() {
            index.insert(track.id.clone(), position);
        }
        Self { tracks, index }
    }

    /// An empty catalog.
    pub fn empty() -> Self {
        Self {
            tracks: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in catalog order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn find(&self, id: &str) -> Option<&Track> {
        self.index.get(id).map(|&position| &self.tracks[position])
    }

    /// Look up a track, failing with [`LibraryError::TrackNotFound`].
    pub fn get(&self, id: &str) -> Result<&Track> {
        self.find(id)
            .ok_or_else(|| LibraryError::TrackNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Adapter/session metadata for `id`.
    pub fn metadata(&self, id: &str) -> Result<PlaybackMetadata> {
        self.get(id).map(Track::to_metadata)
    }

    /// Browsable items in catalog order.
    pub fn media_items(&self) -> Vec<MediaItem> {
        self.tracks.iter().map(MediaItem::from).collect()
    }
}

impl Default for MusicLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let library = MusicLibrary::builtin();
        let rebuilt = MusicLibrary::from_tracks(library.tracks().to_vec()).unwrap();
        assert_eq!(rebuilt.len(), library.len());
        assert!(library.len() >= 2);
    }

    #[test]
    fn test_lookup_by_id() {
        let library = MusicLibrary::builtin();
        assert_eq!(library.get("track_1").unwrap().title, "Jazz in Paris");
        assert!(library.contains("track_2"));
        assert_eq!(
            library.get("does-not-exist"),
            Err(LibraryError::TrackNotFound("does-not-exist".to_string()))
        );
    }

    #[test]
    fn test_order_is_stable() {
        let library = MusicLibrary::builtin();
        let ids: Vec<_> = library.media_items().into_iter().map(|i| i.media_id).collect();
        assert_eq!(ids, vec!["track_1", "track_2"]);
    }

    #[test]
    fn test_from_tracks_rejects_duplicates() {
        let result = MusicLibrary::from_tracks(vec![
            Track::new("a", "First"),
            Track::new("a", "Second"),
        ]);
        assert_eq!(result.unwrap_err(), LibraryError::DuplicateId("a".to_string()));
    }

    #[test]
    fn test_from_tracks_rejects_invalid_track() {
        let result = MusicLibrary::from_tracks(vec![Track::new("a", "")]);
        assert!(matches!(result, Err(LibraryError::InvalidTrack { .. })));
    }

    #[test]
    fn test_metadata_for_track() {
        let library = MusicLibrary::builtin();
        let metadata = library.metadata("track_2").unwrap();
        assert_eq!(metadata.title, "The Coldest Shoulder");
        assert!(library.metadata("missing").is_err());
        assert!(MusicLibrary::empty().is_empty());
    }
}
