//! Media session service façade.
//!
//! This crate wires host-provided bridge implementations (playback adapter,
//! service host, notification surface) into the session core. Desktop apps and
//! tests typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) to get in-process bridges; mobile hosts inject their own.
//!
//! ```ignore
//! use core_runtime::config::SessionConfig;
//! use core_service::{DesktopBridges, SessionOrchestrator};
//!
//! let mut bridges = DesktopBridges::new();
//! let orchestrator = SessionOrchestrator::new(bridges.dependencies(), SessionConfig::default())?;
//! if let Some(adapter_events) = bridges.take_adapter_events() {
//!     orchestrator.start(adapter_events)?;
//! }
//! orchestrator.command_sender().play_from_id("track_1")?;
//! ```

pub mod commands;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod track_list;

pub use commands::{CommandSender, TransportCommand};
pub use error::{CoreError, Result};
pub use orchestrator::SessionOrchestrator;
pub use session::MediaSession;
pub use track_list::{TrackList, TrackRow};

use std::sync::Arc;

use bridge_traits::{NotificationSurface, PlaybackAdapter, ServiceHost};
use core_library::MusicLibrary;

/// Aggregated handle to all bridge dependencies a session requires.
#[derive(Clone)]
pub struct SessionDependencies {
    pub adapter: Arc<dyn PlaybackAdapter>,
    pub service_host: Arc<dyn ServiceHost>,
    pub notification_surface: Arc<dyn NotificationSurface>,
    pub library: Arc<MusicLibrary>,
}

impl SessionDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        adapter: Arc<dyn PlaybackAdapter>,
        service_host: Arc<dyn ServiceHost>,
        notification_surface: Arc<dyn NotificationSurface>,
        library: Arc<MusicLibrary>,
    ) -> Self {
        Self {
            adapter,
            service_host,
            notification_surface,
            library,
        }
    }

    pub fn builder() -> SessionDependenciesBuilder {
        SessionDependenciesBuilder::default()
    }
}

/// Builder for [`SessionDependencies`] that reports missing capabilities
/// instead of failing later at first use.
#[derive(Default)]
pub struct SessionDependenciesBuilder {
    adapter: Option<Arc<dyn PlaybackAdapter>>,
    service_host: Option<Arc<dyn ServiceHost>>,
    notification_surface: Option<Arc<dyn NotificationSurface>>,
    library: Option<Arc<MusicLibrary>>,
}

impl SessionDependenciesBuilder {
    pub fn adapter(mut self, adapter: Arc<dyn PlaybackAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Sets the service host.
    ///
    /// If not provided, the in-process host is used when the `desktop-shims`
    /// feature is enabled.
    pub fn service_host(mut self, host: Arc<dyn ServiceHost>) -> Self {
        self.service_host = Some(host);
        self
    }

    /// Sets the notification surface.
    ///
    /// If not provided, the recording surface is used when the
    /// `desktop-shims` feature is enabled.
    pub fn notification_surface(mut self, surface: Arc<dyn NotificationSurface>) -> Self {
        self.notification_surface = Some(surface);
        self
    }

    /// Sets the catalog. Defaults to [`MusicLibrary::builtin`].
    pub fn library(mut self, library: Arc<MusicLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn build(self) -> Result<SessionDependencies> {
        let adapter = self.adapter.ok_or_else(|| {
            capability_missing(
                "PlaybackAdapter",
                "A PlaybackAdapter is required to play media. \
                 Desktop: use bridge_desktop::SimulatedPlayer. \
                 Mobile: wrap the platform media player.",
            )
        })?;

        let service_host = match self.service_host {
            Some(host) => host,
            None => provide_default_service_host()?,
        };

        let notification_surface = match self.notification_surface {
            Some(surface) => surface,
            None => provide_default_notification_surface()?,
        };

        Ok(SessionDependencies {
            adapter,
            service_host,
            notification_surface,
            library: self
                .library
                .unwrap_or_else(|| Arc::new(MusicLibrary::builtin())),
        })
    }
}

fn capability_missing(capability: &str, message: &str) -> CoreError {
    CoreError::Runtime(core_runtime::Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_service_host() -> Result<Arc<dyn ServiceHost>> {
    let host: Arc<dyn ServiceHost> = Arc::new(bridge_desktop::InProcessServiceHost::new());
    Ok(host)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_service_host() -> Result<Arc<dyn ServiceHost>> {
    Err(capability_missing(
        "ServiceHost",
        "ServiceHost implementation is required to control the service run-mode. \
         Desktop: enable the 'desktop-shims' feature to use the in-process host. \
         Android: wrap startForeground/stopForeground/stopSelf.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_notification_surface() -> Result<Arc<dyn NotificationSurface>> {
    let surface: Arc<dyn NotificationSurface> =
        Arc::new(bridge_desktop::RecordingNotificationSurface::new());
    Ok(surface)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_notification_surface() -> Result<Arc<dyn NotificationSurface>> {
    Err(capability_missing(
        "NotificationSurface",
        "NotificationSurface implementation is required to show the media notification. \
         Desktop: enable the 'desktop-shims' feature to use the recording surface. \
         Android: wrap NotificationManager.",
    ))
}

#[cfg(feature = "desktop-shims")]
pub use desktop::DesktopBridges;

#[cfg(feature = "desktop-shims")]
mod desktop {
    use super::SessionDependencies;
    use bridge_desktop::{InProcessServiceHost, RecordingNotificationSurface, SimulatedPlayer};
    use bridge_traits::{playback_event_channel, PlaybackEventReceiver};
    use core_library::MusicLibrary;
    use std::sync::Arc;

    /// Complete set of in-process bridges, sharing one notification surface
    /// between the service host and the session.
    pub struct DesktopBridges {
        pub player: Arc<SimulatedPlayer>,
        pub host: Arc<InProcessServiceHost>,
        pub surface: Arc<RecordingNotificationSurface>,
        adapter_events: Option<PlaybackEventReceiver>,
    }

    impl DesktopBridges {
        pub fn new() -> Self {
            let (sender, adapter_events) = playback_event_channel();
            let surface = Arc::new(RecordingNotificationSurface::new());
            Self {
                player: Arc::new(SimulatedPlayer::new(sender)),
                host: Arc::new(InProcessServiceHost::with_surface(surface.clone())),
                surface,
                adapter_events: Some(adapter_events),
            }
        }

        /// Dependency bundle for a session over the built-in catalog.
        pub fn dependencies(&self) -> SessionDependencies {
            SessionDependencies::new(
                self.player.clone(),
                self.host.clone(),
                self.surface.clone(),
                Arc::new(MusicLibrary::builtin()),
            )
        }

        /// The player's report stream, for `SessionOrchestrator::start`.
        /// Available once.
        pub fn take_adapter_events(&mut self) -> Option<PlaybackEventReceiver> {
            self.adapter_events.take()
        }
    }

    impl Default for DesktopBridges {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_adapter_is_reported() {
        let result = SessionDependencies::builder().build();
        match result {
            Err(CoreError::Runtime(core_runtime::Error::CapabilityMissing { capability, .. })) => {
                assert_eq!(capability, "PlaybackAdapter");
            }
            other => panic!("expected missing capability, got {:?}", other.err()),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_defaults_fill_host_bridges() {
        let bridges = DesktopBridges::new();
        let deps = SessionDependencies::builder()
            .adapter(bridges.player.clone())
            .build()
            .unwrap();
        assert_eq!(deps.library.len(), 2);
    }
}
