//! In-process service host.
//!
//! Desktop processes are never reclaimed by the OS, so the host only tracks
//! the run-mode requests it receives. When linked to a
//! [`RecordingNotificationSurface`] the foreground notification is shown on
//! that surface, mirroring how a foreground service's notification is a
//! regular notification on Android.

use crate::notification::RecordingNotificationSurface;
use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    notification::NotificationDescriptor,
    service::ServiceHost,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A call received by the host, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    StartService,
    StartForeground { notification_id: u32 },
    StopForeground { remove_notification: bool },
    StopSelf,
}

/// Snapshot of the host's view of the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostState {
    pub service_running: bool,
    pub in_foreground: bool,
    /// Number of transitions into foreground run-mode.
    pub foreground_entries: u32,
    pub stop_requests: u32,
    pub foreground_notification: Option<NotificationDescriptor>,
}

#[derive(Default)]
pub struct InProcessServiceHost {
    state: Mutex<HostState>,
    calls: Mutex<Vec<HostCall>>,
    surface: Option<Arc<RecordingNotificationSurface>>,
    unavailable: AtomicBool,
}

impl InProcessServiceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose foreground notification is shown on `surface`.
    pub fn with_surface(surface: Arc<RecordingNotificationSurface>) -> Self {
        Self {
            surface: Some(surface),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail with [`BridgeError::NotAvailable`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn state(&self) -> HostState {
        self.state.lock().clone()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn is_in_foreground(&self) -> bool {
        self.state.lock().in_foreground
    }

    pub fn foreground_entries(&self) -> u32 {
        self.state.lock().foreground_entries
    }

    pub fn stop_requests(&self) -> u32 {
        self.state.lock().stop_requests
    }

    fn record(&self, call: HostCall) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BridgeError::NotAvailable(
                "Service host unavailable".to_string(),
            ));
        }
        debug!(?call, "Service host call");
        self.calls.lock().push(call);
        Ok(())
    }
}

#[async_trait]
impl ServiceHost for InProcessServiceHost {
    async fn start_service(&self) -> Result<()> {
        self.record(HostCall::StartService)?;
        self.state.lock().service_running = true;
        Ok(())
    }

    async fn start_foreground(&self, notification: NotificationDescriptor) -> Result<()> {
        self.record(HostCall::StartForeground {
            notification_id: notification.id,
        })?;

        {
            let mut state = self.state.lock();
            if !state.in_foreground {
                state.in_foreground = true;
                state.foreground_entries += 1;
                info!(entries = state.foreground_entries, "Service entered foreground");
            }
            state.service_running = true;
            state.foreground_notification = Some(notification.clone());
        }

        if let Some(surface) = &self.surface {
            surface.show(notification);
        }
        Ok(())
    }

    async fn stop_foreground(&self, remove_notification: bool) -> Result<()> {
        self.record(HostCall::StopForeground {
            remove_notification,
        })?;

        let notification = {
            let mut state = self.state.lock();
            state.in_foreground = false;
            state.foreground_notification.take()
        };

        if let (Some(surface), Some(notification)) = (&self.surface, notification) {
            if remove_notification {
                surface.remove(notification.id);
            } else {
                surface.make_dismissible(notification.id);
            }
        }
        Ok(())
    }

    async fn stop_self(&self) -> Result<()> {
        self.record(HostCall::StopSelf)?;
        let mut state = self.state.lock();
        state.stop_requests += 1;
        // A bound client keeps the process alive; only the started state ends.
        state.service_running = false;
        info!(requests = state.stop_requests, "Service stop requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{NotificationAction, SessionToken};

    fn descriptor(id: u32) -> NotificationDescriptor {
        NotificationDescriptor {
            id,
            channel_id: "media".to_string(),
            title: "Jazz in Paris".to_string(),
            text: None,
            sub_text: None,
            artwork_ref: None,
            state_label: "Playing".to_string(),
            actions: vec![NotificationAction::Pause, NotificationAction::Stop],
            ongoing: true,
            dismissible: false,
            session_token: SessionToken::new(),
        }
    }

    #[tokio::test]
    async fn test_foreground_entry_counted_once() {
        let host = InProcessServiceHost::new();
        host.start_foreground(descriptor(7)).await.unwrap();
        host.start_foreground(descriptor(7)).await.unwrap();

        assert!(host.is_in_foreground());
        assert_eq!(host.foreground_entries(), 1);
        assert_eq!(host.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_stop_foreground_keeps_notification_dismissible() {
        let surface = Arc::new(RecordingNotificationSurface::new());
        let host = InProcessServiceHost::with_surface(surface.clone());

        host.start_foreground(descriptor(7)).await.unwrap();
        assert!(surface.is_visible(7));

        host.stop_foreground(false).await.unwrap();
        let shown = surface.visible(7).expect("notification retained");
        assert!(shown.dismissible);
        assert!(!shown.ongoing);
        assert!(!host.is_in_foreground());
    }

    #[tokio::test]
    async fn test_stop_foreground_can_remove_notification() {
        let surface = Arc::new(RecordingNotificationSurface::new());
        let host = InProcessServiceHost::with_surface(surface.clone());

        host.start_foreground(descriptor(7)).await.unwrap();
        host.stop_foreground(true).await.unwrap();
        host.stop_self().await.unwrap();

        assert!(!surface.is_visible(7));
        assert_eq!(host.stop_requests(), 1);
        assert!(!host.state().service_running);
    }

    #[tokio::test]
    async fn test_unavailable_host_records_nothing() {
        let host = InProcessServiceHost::new();
        host.set_available(false);

        assert!(host.start_service().await.is_err());
        assert!(host.calls().is_empty());
        assert!(!host.state().service_running);
    }
}
