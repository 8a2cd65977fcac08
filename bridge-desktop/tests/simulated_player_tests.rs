//! Behavioural tests for the simulated player
//!
//! A manually advanced clock makes position tracking deterministic.

use bridge_desktop::SimulatedPlayer;
use bridge_traits::{
    playback_event_channel, BridgeError, Clock, PlaybackAdapter, PlaybackEventReceiver,
    PlaybackMetadata, PlaybackSnapshot, PlaybackState,
};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

fn track(id: &str) -> PlaybackMetadata {
    PlaybackMetadata::new(id, id)
        .with_duration(Duration::from_secs(100))
        .with_media_uri(format!("{id}.mp3"))
}

fn setup() -> (SimulatedPlayer, PlaybackEventReceiver, Arc<ManualClock>) {
    let (tx, rx) = playback_event_channel();
    let clock = Arc::new(ManualClock::new());
    (SimulatedPlayer::with_clock(tx, clock.clone()), rx, clock)
}

fn drain(rx: &mut PlaybackEventReceiver) -> Vec<PlaybackSnapshot> {
    let mut out = Vec::new();
    while let Ok(snapshot) = rx.try_recv() {
        out.push(snapshot);
    }
    out
}

fn states(reports: &[PlaybackSnapshot]) -> Vec<PlaybackState> {
    reports.iter().map(|s| s.state.clone()).collect()
}

#[tokio::test]
async fn test_play_pause_stop_sequence() {
    let (player, mut rx, clock) = setup();

    player.play_from_media(track("track_1")).await.unwrap();
    clock.advance(Duration::from_secs(5));
    player.pause().await.unwrap();
    player.stop().await.unwrap();

    let reports = drain(&mut rx);
    assert_eq!(
        states(&reports),
        vec![
            PlaybackState::Preparing,
            PlaybackState::Playing,
            PlaybackState::Paused,
            PlaybackState::Stopped,
        ]
    );
    assert_eq!(reports[2].position, Duration::from_secs(5));
    assert_eq!(reports[3].media_id.as_deref(), Some("track_1"));
    assert!(player.current_media().is_none());
}

#[tokio::test]
async fn test_same_media_resumes_without_preparing() {
    let (player, mut rx, clock) = setup();

    player.play_from_media(track("track_1")).await.unwrap();
    clock.advance(Duration::from_secs(3));
    player.pause().await.unwrap();
    drain(&mut rx);

    player.play_from_media(track("track_1")).await.unwrap();
    let reports = drain(&mut rx);
    assert_eq!(states(&reports), vec![PlaybackState::Playing]);
    assert_eq!(reports[0].position, Duration::from_secs(3));

    // Playing the same media again is a no-op.
    player.play_from_media(track("track_1")).await.unwrap();
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_switching_media_restarts_from_zero() {
    let (player, mut rx, clock) = setup();

    player.play_from_media(track("track_1")).await.unwrap();
    clock.advance(Duration::from_secs(10));
    player.play_from_media(track("track_2")).await.unwrap();

    let reports = drain(&mut rx);
    let last = reports.last().unwrap();
    assert_eq!(last.state, PlaybackState::Playing);
    assert_eq!(last.media_id.as_deref(), Some("track_2"));
    assert_eq!(last.position, Duration::ZERO);
    assert_eq!(player.current_media().unwrap().media_id, "track_2");
}

#[tokio::test]
async fn test_seek_while_paused_reports_new_position() {
    let (player, mut rx, _clock) = setup();

    player.play_from_media(track("track_1")).await.unwrap();
    player.pause().await.unwrap();
    drain(&mut rx);

    player.seek_to(Duration::from_secs(42)).await.unwrap();
    let reports = drain(&mut rx);
    assert_eq!(states(&reports), vec![PlaybackState::Paused]);
    assert_eq!(reports[0].position, Duration::from_secs(42));
    assert_eq!(player.position(), Duration::from_secs(42));

    // Seeking past the end clamps to the duration.
    player.seek_to(Duration::from_secs(500)).await.unwrap();
    assert_eq!(player.position(), Duration::from_secs(100));
}

#[tokio::test]
async fn test_complete_rewinds_and_pauses() {
    let (player, mut rx, clock) = setup();

    player.play_from_media(track("track_1")).await.unwrap();
    clock.advance(Duration::from_secs(100));
    player.complete().unwrap();

    let reports = drain(&mut rx);
    let last = reports.last().unwrap();
    assert_eq!(last.state, PlaybackState::Paused);
    assert_eq!(last.position, Duration::ZERO);
    assert!(player.current_media().is_some());
}

#[tokio::test]
async fn test_commands_without_media_are_rejected() {
    let (player, _rx, _clock) = setup();

    assert!(matches!(player.stop().await, Err(BridgeError::CommandRejected(_))));
    assert!(matches!(
        player.seek_to(Duration::from_secs(1)).await,
        Err(BridgeError::CommandRejected(_))
    ));
    assert!(player.complete().is_err());
    assert_eq!(player.state(), PlaybackState::Idle);
}

#[tokio::test]
async fn test_position_advances_while_playing() {
    let (player, _rx, clock) = setup();

    player.play_from_media(track("track_1")).await.unwrap();
    clock.advance(Duration::from_secs(7));
    assert_eq!(player.position(), Duration::from_secs(7));

    clock.advance(Duration::from_secs(500));
    assert_eq!(player.position(), Duration::from_secs(100));
}
