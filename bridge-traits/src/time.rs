//! Time and Logging Abstractions
//!
//! Injectable time source for playback snapshots and a logging sink that
//! mirrors core logs into the host pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

/// Time source.
///
/// Playback snapshots are stamped with the clock's time so controllers can
/// extrapolate the position of a playing track.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn unix_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant, for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Severity of a forwarded log entry, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Android `Log` priority for this level (VERBOSE = 2 .. ERROR = 6).
    pub fn android_priority(self) -> i32 {
        match self {
            LogLevel::Trace => 2,
            LogLevel::Debug => 3,
            LogLevel::Info => 4,
            LogLevel::Warn => 5,
            LogLevel::Error => 6,
        }
    }

    /// Single-letter priority as printed by `logcat` (`V`, `D`, `I`, `W`, `E`).
    pub fn letter(self) -> char {
        match self {
            LogLevel::Trace => 'V',
            LogLevel::Debug => 'D',
            LogLevel::Info => 'I',
            LogLevel::Warn => 'W',
            LogLevel::Error => 'E',
        }
    }
}

/// One log record handed to the host.
///
/// `fields` holds the event's structured fields merged over those of the
/// enclosing spans, so a record emitted inside a session handler carries the
/// session token even when the event itself does not name it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Emitting module path.
    pub target: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
    /// Enclosing spans from the outermost, joined with `>`.
    pub span_path: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span_path: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span_path(mut self, path: impl Into<String>) -> Self {
        self.span_path = Some(path.into());
        self
    }

    /// Logcat tag: the crate name of the target (`core_service::orchestrator`
    /// becomes `core_service`).
    pub fn tag(&self) -> &str {
        self.target.split("::").next().unwrap_or(&self.target)
    }
}

impl fmt::Display for LogEntry {
    /// `I/core_service: [on_play] Playback state changed {session=.., to=Playing}`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: ", self.level.letter(), self.tag())?;
        if let Some(path) = &self.span_path {
            write!(f, "[{path}] ")?;
        }
        f.write_str(&self.message)?;

        if !self.fields.is_empty() {
            let rendered: Vec<String> = self
                .fields
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            write!(f, " {{{}}}", rendered.join(", "))?;
        }
        Ok(())
    }
}

/// Logger sink trait
///
/// Forwards structured logs from the core to host logging pipelines:
/// - **Android**: Logcat
/// - **iOS**: OSLog
/// - **Desktop**: stderr
#[async_trait::async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Entries below this level are dropped before reaching the sink.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Development sink printing Logcat-style lines to stderr.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

#[async_trait::async_trait]
impl LoggerSink for ConsoleLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            eprintln!("{} {}", entry.timestamp.format("%m-%d %H:%M:%S%.3f"), entry);
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.unix_timestamp_millis(), instant.timestamp_millis());
    }

    #[test]
    fn test_android_priorities_follow_level_order() {
        assert_eq!(LogLevel::Trace.android_priority(), 2);
        assert_eq!(LogLevel::Error.android_priority(), 6);
        assert_eq!(LogLevel::Warn.letter(), 'W');
        assert!(LogLevel::Warn > LogLevel::Info);
    }

    #[test]
    fn test_entry_renders_like_logcat() {
        let entry = LogEntry::new(LogLevel::Info, "core_service::orchestrator", "Session created")
            .with_field("tag", "MusicService")
            .with_field("session", "abc")
            .with_span_path("on_play");

        assert_eq!(entry.tag(), "core_service");
        assert_eq!(
            entry.to_string(),
            "I/core_service: [on_play] Session created {session=abc, tag=MusicService}"
        );
    }

    #[test]
    fn test_level_parses_from_lowercase() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
    }
}
