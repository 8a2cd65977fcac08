//! Hosting-process run-mode control.
//!
//! Abstracts the platform calls that decide whether the process hosting the
//! session may be reclaimed:
//! - **Android**: `startForegroundService` / `startForeground` /
//!   `stopForeground` / `stopSelf`
//! - **Desktop**: usually a no-op or an inhibit lock against suspend
//! - **iOS**: audio background mode activation

use crate::{error::Result, notification::NotificationDescriptor};

/// Host controls for the process running the media session.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::service::ServiceHost;
///
/// async fn go_foreground(host: &dyn ServiceHost, n: NotificationDescriptor) -> Result<()> {
///     host.start_service().await?;
///     host.start_foreground(n).await
/// }
/// ```
#[async_trait::async_trait]
pub trait ServiceHost: Send + Sync {
    /// Ask the host to keep the service running independently of any bound
    /// client. Called once before the first foreground entry.
    async fn start_service(&self) -> Result<()>;

    /// Enter foreground run-mode, showing `notification` while active.
    async fn start_foreground(&self, notification: NotificationDescriptor) -> Result<()>;

    /// Leave foreground run-mode. When `remove_notification` is `false` the
    /// notification stays visible and becomes dismissible.
    async fn stop_foreground(&self, remove_notification: bool) -> Result<()>;

    /// Allow the host to terminate the service once no client is bound.
    async fn stop_self(&self) -> Result<()>;
}
