//! # Desktop Bridge Implementations
//!
//! In-process implementations of the host bridge traits, used on desktop
//! platforms (macOS, Windows, Linux), in tests and in the demo.
//!
//! ## Overview
//!
//! - `PlaybackAdapter` as [`SimulatedPlayer`]: native-player state machine
//!   without audio output
//! - `ServiceHost` as [`InProcessServiceHost`]: records run-mode requests;
//!   desktop processes are never reclaimed
//! - `NotificationSurface` as [`RecordingNotificationSurface`]: keeps posted
//!   notifications in memory
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{InProcessServiceHost, RecordingNotificationSurface, SimulatedPlayer};
//! use bridge_traits::playback_event_channel;
//! use std::sync::Arc;
//!
//! let (events_tx, events_rx) = playback_event_channel();
//! let player = Arc::new(SimulatedPlayer::new(events_tx));
//! let surface = Arc::new(RecordingNotificationSurface::new());
//! let host = Arc::new(InProcessServiceHost::with_surface(surface.clone()));
//! // Hand player/host/surface to the session and `events_rx` to its event loop.
//! ```

mod notification;
mod playback;
mod service;

pub use notification::{RecordingNotificationSurface, SurfaceEvent};
pub use playback::SimulatedPlayer;
pub use service::{HostCall, HostState, InProcessServiceHost};
