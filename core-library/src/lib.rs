//! # Track Catalog
//!
//! Immutable, compiled-in catalog of playable tracks.
//!
//! ## Overview
//!
//! - [`Track`](models::Track): a catalog entry, convertible into the
//!   [`PlaybackMetadata`](bridge_traits::PlaybackMetadata) handed to adapters
//! - [`MusicLibrary`](catalog::MusicLibrary): ordered lookup by id, browsable
//!   [`MediaItem`](models::MediaItem)s for list views and media browsers
//!
//! There is no persistence and no mutation: the catalog is built once at
//! startup and shared read-only.

pub mod catalog;
pub mod error;
pub mod models;

pub use catalog::MusicLibrary;
pub use error::{LibraryError, Result};
pub use models::{MediaItem, Track};
