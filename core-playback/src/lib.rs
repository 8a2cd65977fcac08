//! # Playback Module
//!
//! Playback-side building blocks of the media session.
//!
//! ## Overview
//!
//! This module handles:
//! - Issuing transport commands to the platform adapter and classifying its
//!   failures ([`PlaybackController`])
//! - Building media notification descriptors with change detection
//!   ([`NotificationPresenter`])
//!
//! Audio decoding and output stay behind the host's
//! [`PlaybackAdapter`](bridge_traits::PlaybackAdapter).

pub mod controller;
pub mod error;
pub mod notification;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use notification::NotificationPresenter;
