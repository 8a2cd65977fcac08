//! Notification surface abstraction.
//!
//! The core never renders notifications. It produces a
//! [`NotificationDescriptor`] and hands it to the host, which maps it onto the
//! platform notification system (Android `NotificationManager`, a desktop
//! notification daemon, a tray icon, ...).

use crate::{error::Result, playback::SessionToken};
use serde::{Deserialize, Serialize};

/// Transport action exposed as a notification button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    Play,
    Pause,
    Stop,
}

impl NotificationAction {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationAction::Play => "Play",
            NotificationAction::Pause => "Pause",
            NotificationAction::Stop => "Stop",
        }
    }
}

/// Renderable description of a media notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDescriptor {
    /// Stable notification identifier; re-posting with the same id replaces
    /// the previous notification.
    pub id: u32,
    /// Host channel the notification is posted on.
    pub channel_id: String,
    pub title: String,
    pub text: Option<String>,
    pub sub_text: Option<String>,
    pub artwork_ref: Option<String>,
    /// Label of the playback state the notification was built for.
    pub state_label: String,
    pub actions: Vec<NotificationAction>,
    /// Ongoing notifications cannot be swiped away by the user.
    pub ongoing: bool,
    pub dismissible: bool,
    pub session_token: SessionToken,
}

/// Host notification system.
#[async_trait::async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Make sure the channel exists before the first post. Hosts without
    /// channels can rely on the default no-op.
    async fn ensure_channel(&self, _channel_id: &str, _channel_name: &str) -> Result<()> {
        Ok(())
    }

    /// Post or replace the notification with `descriptor.id`.
    async fn notify(&self, descriptor: NotificationDescriptor) -> Result<()>;

    /// Remove the notification with the given id. Unknown ids are ignored.
    async fn cancel(&self, id: u32) -> Result<()>;
}
