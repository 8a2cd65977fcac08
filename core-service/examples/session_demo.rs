//! Media session walkthrough against the in-process desktop bridges.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example session_demo
//!
//! # Trace everything the orchestrator does
//! cargo run -p core-service --example session_demo -- "core_service=trace"
//! ```

use bridge_traits::time::LogLevel;
use core_runtime::config::{SessionConfig, DEFAULT_NOTIFICATION_ID};
use core_runtime::events::{CoreEvent, EventKind, SessionEvent};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{DesktopBridges, SessionOrchestrator, TrackList};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut logging = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Info);
    if let Some(filter) = env::args().nth(1) {
        logging = logging.with_filter(filter);
    }
    init_logging(logging)?;

    let mut bridges = DesktopBridges::new();
    let deps = bridges.dependencies();
    let library = Arc::clone(&deps.library);
    let orchestrator = SessionOrchestrator::new(deps, SessionConfig::default())?;

    // State changes are printed by `report`; show the rest as it happens.
    let mut events = orchestrator
        .event_bus()
        .stream(&[EventKind::Session, EventKind::Service]);
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            print_event(&event);
            if matches!(event, CoreEvent::Session(SessionEvent::Released { .. })) {
                break;
            }
        }
    });

    let adapter_events = bridges
        .take_adapter_events()
        .ok_or_else(|| anyhow::anyhow!("adapter events already taken"))?;
    orchestrator.start(adapter_events)?;

    let list = TrackList::new(library, orchestrator.command_sender());
    for (index, row) in list.rows().iter().enumerate() {
        println!("  [{index}] {} ({})", row.title, row.subtitle);
    }

    info!("Selecting the first track");
    list.select(0)?;
    settle().await;
    report(&orchestrator, &bridges).await;

    info!("Pausing");
    orchestrator.command_sender().pause()?;
    settle().await;
    report(&orchestrator, &bridges).await;

    info!("Resuming and seeking");
    let commands = orchestrator.command_sender();
    commands.play()?;
    commands.seek_to(Duration::from_secs(42))?;
    settle().await;
    report(&orchestrator, &bridges).await;

    info!("Stopping");
    commands.stop()?;
    settle().await;
    report(&orchestrator, &bridges).await;

    orchestrator.stop().await?;
    printer.await?;

    println!("Host calls:");
    for call in bridges.host.calls() {
        println!("  {call:?}");
    }
    Ok(())
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

async fn report(orchestrator: &SessionOrchestrator, bridges: &DesktopBridges) {
    let snapshot = orchestrator.playback_snapshot().await;
    let notification = bridges
        .surface
        .visible(DEFAULT_NOTIFICATION_ID)
        .map(|n| format!("\"{}\" ({})", n.title, n.state_label))
        .unwrap_or_else(|| "none".to_string());
    println!(
        "state={} position={}ms foreground={} notification={}",
        snapshot.state.label(),
        snapshot.position_ms(),
        orchestrator.is_started_in_foreground().await,
        notification,
    );
}

fn print_event(event: &CoreEvent) {
    println!("  event: {} [{:?}]", event.description(), event.severity());
}
