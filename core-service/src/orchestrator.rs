//! # Session Orchestrator
//!
//! Single authority that turns transport commands and playback adapter reports
//! into adapter commands, session broadcasts, notification updates and
//! run-mode changes of the hosting process.
//!
//! ## Run-mode rules
//!
//! | Observed state            | Run-mode and notification                                   |
//! |---------------------------|-------------------------------------------------------------|
//! | `Playing`                 | enter foreground once with the "now playing" notification   |
//! | `Paused`                  | leave foreground, keep a dismissible notification           |
//! | `Stopped`                 | leave foreground, remove the notification, request self-stop |
//! | `Idle`/`Preparing`/`Error`| no run-mode change, refresh a visible notification          |
//!
//! Repeated reports of the same state never repeat a side effect; only the
//! session broadcast is refreshed.
//!
//! ## Concurrency
//!
//! Every handler runs under one `tokio::sync::Mutex`, so a handler invoked
//! directly never interleaves with one driven by the event loop. The loop
//! started by [`SessionOrchestrator::start`] multiplexes the command queue and
//! the adapter's report channel, preferring reports.

use crate::commands::{command_channel, CommandReceiver, CommandSender, TransportCommand};
use crate::error::{CoreError, Result};
use crate::session::MediaSession;
use crate::SessionDependencies;
use bridge_traits::{
    NotificationDescriptor, NotificationSurface, PlaybackEventReceiver, PlaybackSnapshot,
    PlaybackState, ServiceHost, SessionToken,
};
use core_library::Track;
use core_playback::{NotificationPresenter, PlaybackController, PlaybackError};
use core_runtime::config::{SessionConfig, StopBehavior};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, Receiver, ServiceEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Mutable session state. Only the orchestrator writes it.
struct SessionState {
    session: MediaSession,
    snapshot: PlaybackSnapshot,
    in_foreground: bool,
    notification_visible: bool,
    service_started: bool,
    channel_ready: bool,
    prepared: Option<Track>,
}

/// What an adapter command amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandOutcome {
    /// The adapter accepted it; a state report follows unless the player
    /// already was in the requested state.
    Issued,
    /// Nothing reached the adapter, or the adapter rejected it. No report
    /// follows.
    Ignored,
}

struct Inner {
    config: SessionConfig,
    controller: PlaybackController,
    host: Arc<dyn ServiceHost>,
    notifications: Arc<dyn NotificationSurface>,
    presenter: NotificationPresenter,
    events: EventBus,
    token: SessionToken,
    state: Mutex<SessionState>,
}

struct EventLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns one media session and keeps the host in sync with its playback.
pub struct SessionOrchestrator {
    inner: Arc<Inner>,
    commands: CommandSender,
    pending_commands: parking_lot::Mutex<Option<CommandReceiver>>,
    event_loop: parking_lot::Mutex<Option<EventLoop>>,
}

impl SessionOrchestrator {
    /// Create the session: token, flags, presenter and command queue. Nothing
    /// is sent to the host until the first playback report.
    pub fn new(deps: SessionDependencies, config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer_size);
        let session = MediaSession::new(config.session_tag.clone(), events.clone());
        let token = session.token();
        let snapshot = session.playback().clone();
        let (commands, receiver) = command_channel();

        info!(session = %token, tag = %config.session_tag, "Media session created");

        let inner = Inner {
            controller: PlaybackController::new(deps.adapter, deps.library),
            host: deps.service_host,
            notifications: deps.notification_surface,
            presenter: NotificationPresenter::new(config.notification.clone()),
            events,
            token,
            state: Mutex::new(SessionState {
                session,
                snapshot,
                in_foreground: false,
                notification_visible: false,
                service_started: false,
                channel_ready: false,
                prepared: None,
            }),
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
            commands,
            pending_commands: parking_lot::Mutex::new(Some(receiver)),
            event_loop: parking_lot::Mutex::new(None),
        })
    }

    /// Spawn the event loop consuming queued commands and `adapter_events`.
    ///
    /// Must be called from within a tokio runtime. A session runs at most one
    /// loop; a second call fails with [`CoreError::AlreadyStarted`].
    pub fn start(&self, adapter_events: PlaybackEventReceiver) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|err| {
            CoreError::Runtime(core_runtime::Error::Internal(format!(
                "Session event loop needs a tokio runtime: {err}"
            )))
        })?;

        let commands = self
            .pending_commands
            .lock()
            .take()
            .ok_or(CoreError::AlreadyStarted)?;

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_event_loop(
            Arc::clone(&self.inner),
            commands,
            adapter_events,
            cancel.clone(),
        ));

        *self.event_loop.lock() = Some(EventLoop { cancel, handle });
        info!(session = %self.inner.token, "Session event loop started");
        Ok(())
    }

    /// Destroy the session: stop the event loop, remove any notification,
    /// stop and release the adapter and release the session. Idempotent.
    pub async fn stop(&self) -> Result<()> {
        let event_loop = self.event_loop.lock().take();
        if let Some(EventLoop { cancel, handle }) = event_loop {
            cancel.cancel();
            if let Err(err) = handle.await {
                warn!(error = %err, "Session event loop ended abnormally");
            }
        }
        // A session that was never started can still be destroyed.
        self.pending_commands.lock().take();

        self.inner.destroy().await;
        Ok(())
    }

    /// The user removed the app's task; the host may terminate the service.
    pub async fn on_task_removed(&self) -> Result<()> {
        self.inner.on_task_removed().await
    }

    /// The host (re)started the service, optionally on behalf of a media
    /// button press. The service enters foreground right away, then the
    /// command is applied.
    pub async fn on_start_command(&self, command: Option<TransportCommand>) -> Result<()> {
        self.inner.on_start_command(command).await
    }

    pub async fn on_play_from_id(&self, id: &str) -> Result<()> {
        self.inner.on_play_from_id(id).await.map(drop)
    }

    pub async fn on_play(&self) -> Result<()> {
        self.inner.on_play().await.map(drop)
    }

    pub async fn on_pause(&self) -> Result<()> {
        self.inner.on_pause().await.map(drop)
    }

    pub async fn on_stop(&self) -> Result<()> {
        self.inner.on_stop().await.map(drop)
    }

    pub async fn on_seek(&self, position: Duration) -> Result<()> {
        self.inner.on_seek(position).await.map(drop)
    }

    /// Apply one adapter report.
    pub async fn on_adapter_state_changed(&self, snapshot: PlaybackSnapshot) {
        self.inner.on_adapter_state_changed(snapshot).await
    }

    /// Apply `command` immediately, bypassing the queue.
    pub async fn dispatch(&self, command: TransportCommand) -> Result<()> {
        self.inner.dispatch(command).await.map(drop)
    }

    /// Handle for submitting commands through the event loop.
    pub fn command_sender(&self) -> CommandSender {
        self.commands.clone()
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.inner.events.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn session_token(&self) -> SessionToken {
        self.inner.token
    }

    pub fn is_running(&self) -> bool {
        self.event_loop
            .lock()
            .as_ref()
            .is_some_and(|event_loop| !event_loop.handle.is_finished())
    }

    pub async fn playback_state(&self) -> PlaybackState {
        self.inner.state.lock().await.snapshot.state.clone()
    }

    pub async fn playback_snapshot(&self) -> PlaybackSnapshot {
        self.inner.state.lock().await.snapshot.clone()
    }

    pub async fn is_started_in_foreground(&self) -> bool {
        self.inner.state.lock().await.in_foreground
    }

    pub async fn is_notification_visible(&self) -> bool {
        self.inner.state.lock().await.notification_visible
    }

    pub async fn prepared_media(&self) -> Option<Track> {
        self.inner.state.lock().await.prepared.clone()
    }

    pub async fn is_session_active(&self) -> bool {
        self.inner.state.lock().await.session.is_active()
    }
}

async fn run_event_loop(
    inner: Arc<Inner>,
    mut commands: CommandReceiver,
    mut reports: PlaybackEventReceiver,
    cancel: CancellationToken,
) {
    let mut reports_open = true;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            report = reports.recv(), if reports_open => match report {
                Some(snapshot) => inner.on_adapter_state_changed(snapshot).await,
                None => {
                    warn!("Playback adapter report channel closed");
                    reports_open = false;
                }
            },

            command = commands.recv() => match command {
                Some(command) => {
                    let name = command.name();
                    if let Err(err) = inner.dispatch(command).await {
                        debug!(command = name, error = %err, "Transport command failed");
                    }
                }
                None => break,
            },
        }
    }

    debug!("Session event loop stopped");
}

impl Inner {
    async fn dispatch(&self, command: TransportCommand) -> Result<CommandOutcome> {
        match command {
            TransportCommand::PlayFromId { id } => self.on_play_from_id(&id).await,
            TransportCommand::Play => self.on_play().await,
            TransportCommand::Pause => self.on_pause().await,
            TransportCommand::Stop => self.on_stop().await,
            TransportCommand::SeekTo { position_ms } => {
                self.on_seek(Duration::from_millis(position_ms)).await
            }
        }
    }

    #[instrument(skip(self), fields(session = %self.token))]
    async fn on_play_from_id(&self, id: &str) -> Result<CommandOutcome> {
        let mut st = self.state.lock().await;
        ensure_live(&st)?;

        let track = match self.controller.resolve(id) {
            Ok(track) => track,
            Err(err) => {
                warn!(track_id = id, "Ignoring play request for unknown track");
                return Err(err.into());
            }
        };

        st.session.set_metadata(track.to_metadata());
        st.prepared = Some(track.clone());
        self.play_prepared(&mut st, Some(track)).await
    }

    #[instrument(skip(self), fields(session = %self.token))]
    async fn on_play(&self) -> Result<CommandOutcome> {
        let mut st = self.state.lock().await;
        ensure_live(&st)?;

        if st.prepared.is_none() {
            let default_track = self
                .config
                .default_track_id
                .as_deref()
                .and_then(|id| self.controller.resolve(id).ok());

            if let Some(track) = default_track {
                debug!(track_id = %track.id, "Implicitly preparing track");
                st.session.set_metadata(track.to_metadata());
                st.prepared = Some(track);
            }
        }

        let prepared = st.prepared.clone();
        self.play_prepared(&mut st, prepared).await
    }

    #[instrument(skip(self), fields(session = %self.token))]
    async fn on_pause(&self) -> Result<CommandOutcome> {
        let mut st = self.state.lock().await;
        ensure_live(&st)?;

        let result = self.controller.pause().await;
        self.settle_command(&mut st, "pause", result).await
    }

    #[instrument(skip(self), fields(session = %self.token))]
    async fn on_stop(&self) -> Result<CommandOutcome> {
        let mut st = self.state.lock().await;
        ensure_live(&st)?;

        let result = self.controller.stop().await;
        st.session.set_active(false);
        if self.config.stop_behavior == StopBehavior::ClearPreparedMedia {
            st.prepared = None;
        }
        self.settle_command(&mut st, "stop", result).await
    }

    #[instrument(skip(self), fields(session = %self.token, position_ms = bridge_traits::duration_ms(position)))]
    async fn on_seek(&self, position: Duration) -> Result<CommandOutcome> {
        let mut st = self.state.lock().await;
        ensure_live(&st)?;

        let result = self.controller.seek(position).await;
        self.settle_command(&mut st, "seek", result).await
    }

    async fn on_adapter_state_changed(&self, snapshot: PlaybackSnapshot) {
        let mut st = self.state.lock().await;
        if st.session.is_released() {
            debug!(state = %snapshot.state, "Ignoring report for released session");
            return;
        }
        self.apply_snapshot(&mut st, snapshot).await;
    }

    #[instrument(skip(self), fields(session = %self.token))]
    async fn on_task_removed(&self) -> Result<()> {
        let mut st = self.state.lock().await;
        info!("Task removed, requesting service stop");
        self.request_stop_self(&mut st).await;
        Ok(())
    }

    #[instrument(skip(self, command), fields(session = %self.token))]
    async fn on_start_command(&self, command: Option<TransportCommand>) -> Result<()> {
        {
            let mut st = self.state.lock().await;
            ensure_live(&st)?;

            if !st.in_foreground {
                let descriptor =
                    self.presenter
                        .build(st.prepared.as_ref(), &st.snapshot, &self.token);
                self.enter_foreground(&mut st, descriptor).await;
            }
        }

        let result = match command {
            Some(command) => self.dispatch(command).await,
            None => Ok(CommandOutcome::Ignored),
        };

        // An issued command is followed by an adapter report that settles
        // the run-mode. Anything else leaves it to be settled here.
        if !matches!(result, Ok(CommandOutcome::Issued)) {
            let mut st = self.state.lock().await;
            if !st.session.is_released() {
                self.settle_run_mode(&mut st).await;
            }
        }

        result.map(drop)
    }

    /// Bring run-mode and notification in line with the observed state
    /// without waiting for a report.
    async fn settle_run_mode(&self, st: &mut SessionState) {
        let state = st.snapshot.state.clone();
        match state {
            PlaybackState::Playing => {}
            PlaybackState::Stopped => self.on_stopped(st).await,
            _ => self.leave_foreground(st, false).await,
        }
    }

    async fn destroy(&self) {
        let mut st = self.state.lock().await;
        if st.session.is_released() {
            return;
        }

        if st.in_foreground {
            self.leave_foreground(&mut st, true).await;
        }
        if st.notification_visible {
            self.dismiss_notification(&mut st).await;
        }

        if let Err(err) = self.controller.stop().await {
            debug!(error = %err, "Adapter stop during destroy");
        }
        if let Err(err) = self.controller.release().await {
            error!(error = %err, "Failed to release playback adapter");
        }

        st.session.release();
        info!(session = %self.token, "Media session released");
    }

    /// Hand the prepared track to the adapter and activate the session.
    async fn play_prepared(
        &self,
        st: &mut SessionState,
        track: Option<Track>,
    ) -> Result<CommandOutcome> {
        match self.controller.resume(track.as_ref()).await {
            Ok(()) => {
                st.session.set_active(true);
                Ok(CommandOutcome::Issued)
            }
            Err(PlaybackError::NoTrackPrepared) => {
                debug!("Nothing prepared to play");
                Ok(CommandOutcome::Ignored)
            }
            Err(err) => self.settle_command(st, "play", Err(err)).await,
        }
    }

    /// Classify the outcome of an adapter command: rejections are no-ops,
    /// failures become an `Error` state.
    async fn settle_command(
        &self,
        st: &mut SessionState,
        command: &str,
        result: core_playback::Result<()>,
    ) -> Result<CommandOutcome> {
        match result {
            Ok(()) => Ok(CommandOutcome::Issued),
            Err(err) if err.is_rejection() => {
                debug!(command, reason = %err, "Adapter rejected command");
                Ok(CommandOutcome::Ignored)
            }
            Err(err) => {
                let track_id = st.prepared.as_ref().map(|track| track.id.clone());
                error!(command, error = %err, "Playback command failed");

                self.events
                    .emit(CoreEvent::Playback(PlaybackEvent::Error {
                        track_id: track_id.clone(),
                        message: err.to_string(),
                        recoverable: true,
                    }))
                    .ok();

                let mut snapshot = PlaybackSnapshot::new(
                    PlaybackState::Error {
                        message: err.to_string(),
                    },
                    st.snapshot.position,
                );
                if let Some(id) = track_id {
                    snapshot = snapshot.with_media_id(id);
                }
                self.apply_snapshot(st, snapshot).await;

                Err(err.into())
            }
        }
    }

    /// The transition function.
    async fn apply_snapshot(&self, st: &mut SessionState, snapshot: PlaybackSnapshot) {
        let previous = st.snapshot.state.clone();
        let changed = previous != snapshot.state;

        if changed {
            info!(from = %previous, to = %snapshot.state, position_ms = snapshot.position_ms(), "Playback state changed");
        } else {
            debug!(state = %snapshot.state, position_ms = snapshot.position_ms(), "Playback state refreshed");
        }

        let state = snapshot.state.clone();
        st.snapshot = snapshot.clone();
        st.session.set_playback_state(snapshot);

        match state {
            PlaybackState::Playing => self.on_playing(st).await,
            PlaybackState::Paused => self.on_paused(st).await,
            PlaybackState::Stopped => {
                if changed {
                    self.on_stopped(st).await;
                }
            }
            PlaybackState::Idle | PlaybackState::Preparing | PlaybackState::Error { .. } => {
                self.refresh_notification(st).await;
            }
        }
    }

    async fn on_playing(&self, st: &mut SessionState) {
        if st.in_foreground {
            // Already foreground: only a changed notification is re-posted.
            if let Some(descriptor) =
                self.presenter
                    .build_if_changed(st.prepared.as_ref(), &st.snapshot, &self.token)
            {
                self.post_notification(st, descriptor).await;
            }
            return;
        }

        let descriptor = self
            .presenter
            .build(st.prepared.as_ref(), &st.snapshot, &self.token);
        self.enter_foreground(st, descriptor).await;
    }

    async fn on_paused(&self, st: &mut SessionState) {
        self.leave_foreground(st, false).await;

        if let Some(descriptor) =
            self.presenter
                .build_if_changed(st.prepared.as_ref(), &st.snapshot, &self.token)
        {
            self.post_notification(st, descriptor).await;
        }
    }

    async fn on_stopped(&self, st: &mut SessionState) {
        if st.in_foreground {
            self.leave_foreground(st, true).await;
        }
        if st.notification_visible {
            self.dismiss_notification(st).await;
        }
        self.request_stop_self(st).await;
    }

    async fn refresh_notification(&self, st: &mut SessionState) {
        if !st.notification_visible {
            return;
        }

        if let Some(descriptor) =
            self.presenter
                .build_if_changed(st.prepared.as_ref(), &st.snapshot, &self.token)
        {
            self.post_notification(st, descriptor).await;
        }
    }

    async fn enter_foreground(&self, st: &mut SessionState, descriptor: NotificationDescriptor) {
        self.ensure_channel(st).await;

        if !st.service_started {
            match self.host.start_service().await {
                Ok(()) => st.service_started = true,
                Err(err) => error!(error = %err, "Failed to start service"),
            }
        }

        let notification_id = descriptor.id;
        let title = descriptor.title.clone();
        match self.host.start_foreground(descriptor).await {
            Ok(()) => {
                st.in_foreground = true;
                st.notification_visible = true;
                info!(notification_id, "Service entered foreground");
                self.emit_service(ServiceEvent::EnteredForeground);
                self.emit_service(ServiceEvent::NotificationPosted {
                    notification_id,
                    title,
                });
            }
            Err(err) => {
                error!(error = %err, "Failed to enter foreground");
                self.presenter.reset();
            }
        }
    }

    /// Leave foreground if currently there. With `remove_notification` the
    /// foreground notification goes away with it.
    async fn leave_foreground(&self, st: &mut SessionState, remove_notification: bool) {
        if !st.in_foreground {
            return;
        }

        match self.host.stop_foreground(remove_notification).await {
            Ok(()) => {
                st.in_foreground = false;
                info!(remove_notification, "Service left foreground");
                self.emit_service(ServiceEvent::LeftForeground {
                    notification_retained: !remove_notification,
                });
                if remove_notification {
                    st.notification_visible = false;
                    self.presenter.reset();
                    self.emit_service(ServiceEvent::NotificationDismissed {
                        notification_id: self.presenter.notification_id(),
                    });
                }
            }
            Err(err) => error!(error = %err, "Failed to leave foreground"),
        }
    }

    async fn post_notification(&self, st: &mut SessionState, descriptor: NotificationDescriptor) {
        self.ensure_channel(st).await;

        let notification_id = descriptor.id;
        let title = descriptor.title.clone();
        match self.notifications.notify(descriptor).await {
            Ok(()) => {
                st.notification_visible = true;
                debug!(notification_id, "Notification updated");
                self.emit_service(ServiceEvent::NotificationPosted {
                    notification_id,
                    title,
                });
            }
            Err(err) => {
                error!(error = %err, "Failed to post notification");
                self.presenter.reset();
            }
        }
    }

    async fn dismiss_notification(&self, st: &mut SessionState) {
        let notification_id = self.presenter.notification_id();
        match self.notifications.cancel(notification_id).await {
            Ok(()) => {
                st.notification_visible = false;
                self.presenter.reset();
                self.emit_service(ServiceEvent::NotificationDismissed { notification_id });
            }
            Err(err) => error!(error = %err, "Failed to dismiss notification"),
        }
    }

    async fn request_stop_self(&self, st: &mut SessionState) {
        match self.host.stop_self().await {
            Ok(()) => {
                st.service_started = false;
                self.emit_service(ServiceEvent::StopRequested);
            }
            Err(err) => error!(error = %err, "Failed to request service stop"),
        }
    }

    async fn ensure_channel(&self, st: &mut SessionState) {
        if st.channel_ready {
            return;
        }

        let notification = self.presenter.config();
        match self
            .notifications
            .ensure_channel(&notification.channel_id, &notification.channel_name)
            .await
        {
            Ok(()) => st.channel_ready = true,
            Err(err) => error!(error = %err, "Failed to create notification channel"),
        }
    }

    fn emit_service(&self, event: ServiceEvent) {
        self.events.emit(CoreEvent::Service(event)).ok();
    }
}

fn ensure_live(st: &SessionState) -> Result<()> {
    if st.session.is_released() {
        return Err(CoreError::NotStarted);
    }
    Ok(())
}
