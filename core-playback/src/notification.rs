//! # Notification Presenter
//!
//! Turns the session's current track and playback snapshot into a
//! [`NotificationDescriptor`] the host can render.
//!
//! Building is deterministic: the same track, state and session token always
//! produce the same descriptor. The presenter remembers the last descriptor it
//! handed out so the orchestrator can skip re-posting an identical
//! notification when the adapter repeats a report (position updates, resumed
//! playback of the same track).
//!
//! ```text
//! (Track?, PlaybackSnapshot, SessionToken) ──build──> NotificationDescriptor
//!                                          └─build_if_changed──> Some(new) | None
//! ```

use bridge_traits::{NotificationAction, NotificationDescriptor, PlaybackSnapshot, SessionToken};
use core_library::Track;
use core_runtime::config::NotificationConfig;
use parking_lot::Mutex;
use tracing::trace;

/// Builds media notification descriptors and caches the last one built.
pub struct NotificationPresenter {
    config: NotificationConfig,
    last_built: Mutex<Option<NotificationDescriptor>>,
}

impl NotificationPresenter {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            last_built: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Identifier every descriptor from this presenter carries.
    pub fn notification_id(&self) -> u32 {
        self.config.notification_id
    }

    /// Build the descriptor for the given state and remember it.
    pub fn build(
        &self,
        track: Option<&Track>,
        snapshot: &PlaybackSnapshot,
        session_token: &SessionToken,
    ) -> NotificationDescriptor {
        let descriptor = self.describe(track, snapshot, session_token);
        *self.last_built.lock() = Some(descriptor.clone());
        descriptor
    }

    /// Build the descriptor, returning `None` when it equals the last one built.
    pub fn build_if_changed(
        &self,
        track: Option<&Track>,
        snapshot: &PlaybackSnapshot,
        session_token: &SessionToken,
    ) -> Option<NotificationDescriptor> {
        let descriptor = self.describe(track, snapshot, session_token);
        let mut last = self.last_built.lock();

        if last.as_ref() == Some(&descriptor) {
            trace!(state = %descriptor.state_label, "Notification unchanged");
            return None;
        }

        *last = Some(descriptor.clone());
        Some(descriptor)
    }

    pub fn last_built(&self) -> Option<NotificationDescriptor> {
        self.last_built.lock().clone()
    }

    /// Forget the cached descriptor; the next `build_if_changed` always
    /// returns a descriptor. Called after the notification was removed or a
    /// host post failed.
    pub fn reset(&self) {
        self.last_built.lock().take();
    }

    fn describe(
        &self,
        track: Option<&Track>,
        snapshot: &PlaybackSnapshot,
        session_token: &SessionToken,
    ) -> NotificationDescriptor {
        let playing = snapshot.state.is_playing();

        let actions = if playing {
            vec![NotificationAction::Pause, NotificationAction::Stop]
        } else {
            vec![NotificationAction::Play, NotificationAction::Stop]
        };

        let (title, text, sub_text, artwork_ref) = match track {
            Some(track) => (
                track.title.clone(),
                non_empty(&track.artist),
                non_empty(&track.album),
                non_empty(&track.artwork_ref),
            ),
            None => (self.config.placeholder_title.clone(), None, None, None),
        };

        NotificationDescriptor {
            id: self.config.notification_id,
            channel_id: self.config.channel_id.clone(),
            title,
            text,
            sub_text,
            artwork_ref,
            state_label: snapshot.state.label().to_string(),
            actions,
            ongoing: playing,
            dismissible: !playing,
            session_token: *session_token,
        }
    }
}

impl Default for NotificationPresenter {
    fn default() -> Self {
        Self::new(NotificationConfig::default())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
