//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host must implement for the media
//! session core.
//!
//! ## Overview
//!
//! This crate defines the contract between the session core and the
//! platform. Every trait represents a capability the core needs but that is
//! implemented differently per platform (Android, iOS, desktop).
//!
//! ## Traits
//!
//! ### Playback
//! - [`PlaybackAdapter`](playback::PlaybackAdapter) - Commands a single native player
//!   and reports state through a [`PlaybackEventSender`](playback::PlaybackEventSender)
//!
//! ### Process & Presentation
//! - [`ServiceHost`](service::ServiceHost) - Foreground run-mode and self-stop
//! - [`NotificationSurface`](notification::NotificationSurface) - Posts and cancels
//!   media notifications
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for playback snapshots
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ In-process shims |
//! | Android  | TBD                 | 📋 Planned |
//! | iOS      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Adapters signal
//! "command does not fit the current state" with
//! [`BridgeError::CommandRejected`], which the core treats as a no-op; every
//! other error is a real failure.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`: adapter reports may arrive from the
//! platform's own media thread while commands are issued from the session loop.

pub mod error;
pub mod notification;
pub mod playback;
pub mod service;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use notification::{NotificationAction, NotificationDescriptor, NotificationSurface};
pub use playback::{
    duration_ms, playback_event_channel, PlaybackAdapter, PlaybackEventReceiver, PlaybackEventSender,
    PlaybackMetadata, PlaybackSnapshot, PlaybackState, SessionToken,
};
pub use service::ServiceHost;
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
