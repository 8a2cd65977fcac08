//! # Session Configuration
//!
//! Configuration for the media session core.
//!
//! ## Overview
//!
//! `SessionConfig` holds the tunables of a session: its tag, the notification
//! channel it posts on, the fallback track for a bare `play` command and what
//! happens to the prepared media on stop. Instances are built with
//! [`SessionConfigBuilder`] or loaded from JSON; both paths run
//! [`SessionConfig::validate`] so an invalid configuration never reaches the
//! orchestrator.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::{SessionConfig, StopBehavior};
//!
//! let config = SessionConfig::builder()
//!     .session_tag("MusicService")
//!     .default_track_id("track_1")
//!     .stop_behavior(StopBehavior::ClearPreparedMedia)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.default_track_id.as_deref(), Some("track_1"));
//! ```
//!
//! ### Loading from JSON
//!
//! Missing fields fall back to their defaults:
//!
//! ```
//! use core_runtime::config::SessionConfig;
//!
//! let config = SessionConfig::from_json_str(r#"{ "default_track_id": "track_2" }"#).unwrap();
//! assert_eq!(config.notification.notification_id, 412);
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use serde::{Deserialize, Serialize};

/// Notification id used when none is configured. Hosts such as Android reject
/// a foreground notification with id 0.
pub const DEFAULT_NOTIFICATION_ID: u32 = 412;

/// What happens to the prepared media when the session is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBehavior {
    /// Keep the prepared media; a later bare `play` resumes the previous track.
    #[default]
    RetainPreparedMedia,
    /// Forget the prepared media; a later bare `play` needs an explicit
    /// selection (or falls back to the default track).
    ClearPreparedMedia,
}

/// Notification channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Identifier of the single media notification.
    #[serde(default = "default_notification_id")]
    pub notification_id: u32,

    /// Host channel the notification is posted on.
    #[serde(default = "default_channel_id")]
    pub channel_id: String,

    /// User-visible channel name.
    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// Title shown when no media is prepared.
    #[serde(default = "default_placeholder_title")]
    pub placeholder_title: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            notification_id: default_notification_id(),
            channel_id: default_channel_id(),
            channel_name: default_channel_name(),
            placeholder_title: default_placeholder_title(),
        }
    }
}

fn default_notification_id() -> u32 {
    DEFAULT_NOTIFICATION_ID
}

fn default_channel_id() -> String {
    "media_session.playback".to_string()
}

fn default_channel_name() -> String {
    "Media playback".to_string()
}

fn default_placeholder_title() -> String {
    "Nothing playing".to_string()
}

fn default_session_tag() -> String {
    "MusicService".to_string()
}

fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}

/// Media session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Tag identifying the session in logs and on the host.
    #[serde(default = "default_session_tag")]
    pub session_tag: String,

    /// Track used by a bare `play` when nothing was prepared or played before.
    #[serde(default)]
    pub default_track_id: Option<String>,

    #[serde(default)]
    pub stop_behavior: StopBehavior,

    #[serde(default)]
    pub notification: NotificationConfig,

    /// Per-subscriber buffer of the session event bus.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_tag: default_session_tag(),
            default_track_id: None,
            stop_behavior: StopBehavior::default(),
            notification: NotificationConfig::default(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl SessionConfig {
    /// Creates a new builder for constructing a `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Session tag is not empty
    /// - Default track id, when set, is not empty
    /// - Notification id is non-zero and the channel id is not empty
    /// - Event buffer size is within `1..=10_000`
    pub fn validate(&self) -> Result<()> {
        if self.session_tag.trim().is_empty() {
            return Err(Error::Config("Session tag cannot be empty".to_string()));
        }

        if let Some(track_id) = &self.default_track_id {
            if track_id.trim().is_empty() {
                return Err(Error::Config(
                    "Default track id cannot be empty. Omit it to disable the fallback."
                        .to_string(),
                ));
            }
        }

        if self.notification.notification_id == 0 {
            return Err(Error::Config(
                "Notification id must be non-zero; hosts reject foreground notifications with id 0"
                    .to_string(),
            ));
        }

        if self.notification.channel_id.trim().is_empty() {
            return Err(Error::Config(
                "Notification channel id cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > 10_000 {
            return Err(Error::Config(
                "Event buffer size exceeds maximum of 10,000 events".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`SessionConfig`] instances.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    session_tag: Option<String>,
    default_track_id: Option<String>,
    stop_behavior: Option<StopBehavior>,
    notification: Option<NotificationConfig>,
    event_buffer_size: Option<usize>,
}

impl SessionConfigBuilder {
    pub fn session_tag(mut self, tag: impl Into<String>) -> Self {
        self.session_tag = Some(tag.into());
        self
    }

    /// Sets the fallback track for a bare `play`.
    pub fn default_track_id(mut self, track_id: impl Into<String>) -> Self {
        self.default_track_id = Some(track_id.into());
        self
    }

    pub fn stop_behavior(mut self, behavior: StopBehavior) -> Self {
        self.stop_behavior = Some(behavior);
        self
    }

    pub fn notification(mut self, notification: NotificationConfig) -> Self {
        self.notification = Some(notification);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds and validates the final `SessionConfig`.
    pub fn build(self) -> Result<SessionConfig> {
        let defaults = SessionConfig::default();
        let config = SessionConfig {
            session_tag: self.session_tag.unwrap_or(defaults.session_tag),
            default_track_id: self.default_track_id,
            stop_behavior: self.stop_behavior.unwrap_or(defaults.stop_behavior),
            notification: self.notification.unwrap_or(defaults.notification),
            event_buffer_size: self.event_buffer_size.unwrap_or(defaults.event_buffer_size),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_tag, "MusicService");
        assert_eq!(config.stop_behavior, StopBehavior::RetainPreparedMedia);
        assert!(config.default_track_id.is_none());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = SessionConfig::builder()
            .session_tag("Player")
            .default_track_id("track_2")
            .stop_behavior(StopBehavior::ClearPreparedMedia)
            .event_buffer_size(8)
            .build()
            .unwrap();

        assert_eq!(config.session_tag, "Player");
        assert_eq!(config.default_track_id.as_deref(), Some("track_2"));
        assert_eq!(config.stop_behavior, StopBehavior::ClearPreparedMedia);
        assert_eq!(config.event_buffer_size, 8);
    }

    #[test]
    fn test_validate_rejects_zero_notification_id() {
        let notification = NotificationConfig {
            notification_id: 0,
            ..Default::default()
        };
        let result = SessionConfig::builder().notification(notification).build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("non-zero")));
    }

    #[test]
    fn test_validate_rejects_blank_default_track() {
        let result = SessionConfig::builder().default_track_id("  ").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_buffer_size() {
        assert!(SessionConfig::builder().event_buffer_size(0).build().is_err());
        assert!(SessionConfig::builder()
            .event_buffer_size(10_001)
            .build()
            .is_err());
    }

    #[test]
    fn test_from_json_uses_defaults() {
        let config = SessionConfig::from_json_str(
            r#"{ "stop_behavior": "clear_prepared_media", "notification": { "channel_id": "music" } }"#,
        )
        .unwrap();

        assert_eq!(config.stop_behavior, StopBehavior::ClearPreparedMedia);
        assert_eq!(config.notification.channel_id, "music");
        assert_eq!(config.notification.notification_id, DEFAULT_NOTIFICATION_ID);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let result = SessionConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_from_json_validates() {
        let result = SessionConfig::from_json_str(r#"{ "session_tag": "" }"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
