//! In-process notification surface.
//!
//! Keeps posted notifications in memory instead of handing them to a desktop
//! notification daemon, and records every post/cancel in order.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    notification::{NotificationDescriptor, NotificationSurface},
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// A single call observed by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Posted(NotificationDescriptor),
    Cancelled(u32),
}

/// Notification surface that remembers what is currently shown.
#[derive(Default)]
pub struct RecordingNotificationSurface {
    visible: Mutex<BTreeMap<u32, NotificationDescriptor>>,
    channels: Mutex<HashMap<String, String>>,
    history: Mutex<Vec<SurfaceEvent>>,
    unavailable: AtomicBool,
}

impl RecordingNotificationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`BridgeError::NotAvailable`],
    /// as a host without notification permission would.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Notification currently shown under `id`.
    pub fn visible(&self, id: u32) -> Option<NotificationDescriptor> {
        self.visible.lock().get(&id).cloned()
    }

    pub fn is_visible(&self, id: u32) -> bool {
        self.visible.lock().contains_key(&id)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.lock().len()
    }

    pub fn post_count(&self) -> usize {
        self.history
            .lock()
            .iter()
            .filter(|event| matches!(event, SurfaceEvent::Posted(_)))
            .count()
    }

    pub fn history(&self) -> Vec<SurfaceEvent> {
        self.history.lock().clone()
    }

    pub fn channel_name(&self, channel_id: &str) -> Option<String> {
        self.channels.lock().get(channel_id).cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BridgeError::NotAvailable(
                "Notification surface unavailable".to_string(),
            ));
        }
        Ok(())
    }

    /// Shared with [`InProcessServiceHost`](crate::InProcessServiceHost),
    /// whose foreground notification lives on the same surface.
    pub(crate) fn show(&self, descriptor: NotificationDescriptor) {
        debug!(id = descriptor.id, title = %descriptor.title, state = %descriptor.state_label, "Notification posted");
        self.visible.lock().insert(descriptor.id, descriptor.clone());
        self.history.lock().push(SurfaceEvent::Posted(descriptor));
    }

    pub(crate) fn remove(&self, id: u32) {
        if self.visible.lock().remove(&id).is_some() {
            debug!(id, "Notification removed");
        }
        self.history.lock().push(SurfaceEvent::Cancelled(id));
    }

    pub(crate) fn make_dismissible(&self, id: u32) {
        if let Some(descriptor) = self.visible.lock().get_mut(&id) {
            descriptor.ongoing = false;
            descriptor.dismissible = true;
        }
    }
}

#[async_trait]
impl NotificationSurface for RecordingNotificationSurface {
    async fn ensure_channel(&self, channel_id: &str, channel_name: &str) -> Result<()> {
        self.check_available()?;
        let mut channels = self.channels.lock();
        if !channels.contains_key(channel_id) {
            info!(channel_id, channel_name, "Notification channel created");
            channels.insert(channel_id.to_string(), channel_name.to_string());
        }
        Ok(())
    }

    async fn notify(&self, descriptor: NotificationDescriptor) -> Result<()> {
        self.check_available()?;
        self.show(descriptor);
        Ok(())
    }

    async fn cancel(&self, id: u32) -> Result<()> {
        self.check_available()?;
        self.remove(id);
        Ok(())
    }
}
