//! Transport commands and the handle used to submit them.
//!
//! UI components, notification buttons and media-button handlers never call
//! the orchestrator directly; they hold a [`CommandSender`] and the session's
//! event loop applies commands one at a time, in submission order.

use crate::error::{CoreError, Result};
use bridge_traits::NotificationAction;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Inbound transport control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TransportCommand {
    /// Prepare the catalog entry `id` and play it.
    PlayFromId { id: String },
    /// Play (or resume) the prepared media.
    Play,
    Pause,
    Stop,
    SeekTo { position_ms: u64 },
}

impl TransportCommand {
    pub fn play_from_id(id: impl Into<String>) -> Self {
        TransportCommand::PlayFromId { id: id.into() }
    }

    pub fn seek_to(position: Duration) -> Self {
        TransportCommand::SeekTo {
            position_ms: bridge_traits::duration_ms(position),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransportCommand::PlayFromId { .. } => "play_from_id",
            TransportCommand::Play => "play",
            TransportCommand::Pause => "pause",
            TransportCommand::Stop => "stop",
            TransportCommand::SeekTo { .. } => "seek_to",
        }
    }
}

impl From<NotificationAction> for TransportCommand {
    fn from(action: NotificationAction) -> Self {
        match action {
            NotificationAction::Play => TransportCommand::Play,
            NotificationAction::Pause => TransportCommand::Pause,
            NotificationAction::Stop => TransportCommand::Stop,
        }
    }
}

pub(crate) type CommandReceiver = mpsc::UnboundedReceiver<TransportCommand>;

/// Cloneable, fire-and-forget handle to a session's command queue.
#[derive(Debug, Clone)]
pub struct CommandSender {
    inner: mpsc::UnboundedSender<TransportCommand>,
}

impl CommandSender {
    /// Queue `command`. Fails with [`CoreError::ChannelClosed`] once the
    /// session has been destroyed.
    pub fn send(&self, command: TransportCommand) -> Result<()> {
        self.inner
            .send(command)
            .map_err(|_| CoreError::ChannelClosed)
    }

    pub fn play_from_id(&self, id: impl Into<String>) -> Result<()> {
        self.send(TransportCommand::play_from_id(id))
    }

    pub fn play(&self) -> Result<()> {
        self.send(TransportCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(TransportCommand::Pause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(TransportCommand::Stop)
    }

    pub fn seek_to(&self, position: Duration) -> Result<()> {
        self.send(TransportCommand::seek_to(position))
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Create a command queue. The receiving half belongs to the session's
/// event loop.
pub(crate) fn command_channel() -> (CommandSender, CommandReceiver) {
    let (inner, receiver) = mpsc::unbounded_channel();
    (CommandSender { inner }, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_serialize_tagged() {
        let json = serde_json::to_string(&TransportCommand::play_from_id("track_1")).unwrap();
        assert_eq!(json, r#"{"command":"play_from_id","id":"track_1"}"#);

        let seek: TransportCommand =
            serde_json::from_str(r#"{"command":"seek_to","position_ms":1500}"#).unwrap();
        assert_eq!(seek, TransportCommand::seek_to(Duration::from_millis(1500)));

        let pause: TransportCommand = serde_json::from_str(r#"{"command":"pause"}"#).unwrap();
        assert_eq!(pause, TransportCommand::Pause);
    }

    #[test]
    fn test_notification_actions_map_to_commands() {
        assert_eq!(
            TransportCommand::from(NotificationAction::Pause),
            TransportCommand::Pause
        );
        assert_eq!(TransportCommand::from(NotificationAction::Play).name(), "play");
    }

    #[tokio::test]
    async fn test_sender_preserves_order_and_detects_close() {
        let (sender, mut receiver) = command_channel();

        sender.play_from_id("track_2").unwrap();
        sender.pause().unwrap();
        sender.stop().unwrap();

        assert_eq!(
            receiver.recv().await,
            Some(TransportCommand::play_from_id("track_2"))
        );
        assert_eq!(receiver.recv().await, Some(TransportCommand::Pause));
        assert_eq!(receiver.recv().await, Some(TransportCommand::Stop));

        drop(receiver);
        assert!(sender.is_closed());
        assert!(matches!(sender.play(), Err(CoreError::ChannelClosed)));
    }
}
