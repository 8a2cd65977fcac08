//! List view-model for picking a track.
//!
//! Rows mirror the catalog order. Selecting a row sends exactly one
//! `PlayFromId` command; the list itself never tracks playback.

use crate::commands::{CommandSender, TransportCommand};
use crate::error::{CoreError, Result};
use core_library::{MusicLibrary, Track};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRow {
    pub id: String,
    pub title: String,
    pub subtitle: String,
}

impl From<&Track> for TrackRow {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            subtitle: track.subtitle(),
        }
    }
}

pub struct TrackList {
    library: Arc<MusicLibrary>,
    commands: CommandSender,
    rows: Vec<TrackRow>,
}

impl TrackList {
    pub fn new(library: Arc<MusicLibrary>, commands: CommandSender) -> Self {
        let rows = Self::build_rows(&library);
        Self {
            library,
            commands,
            rows,
        }
    }

    pub fn rows(&self) -> &[TrackRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&TrackRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Re-read the catalog.
    pub fn refresh(&mut self) {
        self.rows = Self::build_rows(&self.library);
    }

    /// Select the row at `index`.
    pub fn select(&self, index: usize) -> Result<()> {
        let row = self
            .rows
            .get(index)
            .ok_or_else(|| CoreError::NotFound(format!("row {index}")))?;
        self.send_play(&row.id)
    }

    /// Select the row showing `id`.
    pub fn select_id(&self, id: &str) -> Result<()> {
        if !self.rows.iter().any(|row| row.id == id) {
            return Err(CoreError::NotFound(id.to_string()));
        }
        self.send_play(id)
    }

    fn send_play(&self, id: &str) -> Result<()> {
        debug!(track_id = id, "Track selected");
        self.commands.send(TransportCommand::play_from_id(id))
    }

    fn build_rows(library: &MusicLibrary) -> Vec<TrackRow> {
        library.tracks().iter().map(TrackRow::from).collect()
    }
}
