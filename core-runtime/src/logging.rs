//! # Logging & Tracing Infrastructure
//!
//! Structured logging for the session core, built on `tracing`:
//! - Pretty, JSON and compact console output
//! - Per-crate filtering through `EnvFilter`
//! - Mirroring into the host logger (Logcat, OSLog) via `LoggerSink`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::time::{ConsoleLogger, LogLevel};
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use std::sync::Arc;
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_level(LogLevel::Debug)
//!     .with_logger_sink(Arc::new(ConsoleLogger::default()));
//!
//! init_logging(config)?;
//! tracing::info!("Session host started");
//! ```
//!
//! ## Host sink
//!
//! Every event that passes the filter and the sink's own minimum level becomes
//! a [`LogEntry`]. The entry carries the fields recorded on the enclosing
//! spans (outermost first) overlaid with the event's own fields, plus the span
//! names as `span_path`. Handlers instrumented with a `session` field therefore
//! tag every host log line with the session token.
//!
//! Inside a Tokio runtime delivery is spawned, so the emitting task never
//! waits on the host logger.

use crate::error::{Error, Result};

use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Crates whose events are governed by [`LoggingConfig::level`]. Everything
/// else is held at `warn`.
const WORKSPACE_CRATES: &[&str] = &[
    "bridge_traits",
    "bridge_desktop",
    "core_runtime",
    "core_library",
    "core_playback",
    "core_service",
    "media_session_workspace",
];

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored
    Pretty,
    /// One JSON object per line
    Json,
    /// Single-line text
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level applied to the workspace crates.
    pub level: LogLevel,
    /// Full `EnvFilter` directive string; replaces the level-derived filter.
    pub filter: Option<String>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Span enter/exit lines (pretty) or span lists (JSON).
    pub enable_spans: bool,
    pub display_target: bool,
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            logger_sink: None,
            enable_spans: true,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("logger_sink", &self.logger_sink.is_some())
            .field("enable_spans", &self.enable_spans)
            .field("display_target", &self.display_target)
            .field("display_thread_info", &self.display_thread_info)
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }
}

/// Install the global subscriber.
///
/// Only one global subscriber can exist per process; a second call fails with
/// [`Error::Config`].
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    // Exactly one of these is `Some`; a `None` layer is inert.
    let (pretty, json, compact) = match config.format {
        LogFormat::Pretty => (
            Some(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_span_events(if config.enable_spans {
                        FmtSpan::ACTIVE
                    } else {
                        FmtSpan::NONE
                    })
                    .with_writer(io::stdout),
            ),
            None,
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(config.enable_spans)
                    .with_span_list(config.enable_spans)
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_writer(io::stdout),
            ),
            None,
        ),
        LogFormat::Compact => (
            None,
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_writer(io::stdout),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(HostSinkLayer::new(config.logger_sink.clone()))
        .with(pretty)
        .with(json)
        .with(compact)
        .try_init()
        .map_err(|err| Error::Config(format!("Failed to initialize logging: {err}")))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Some(directives) = &config.filter {
        return EnvFilter::try_new(directives)
            .map_err(|err| Error::Config(format!("Invalid log filter '{directives}': {err}")));
    }

    let level = level_filter(config.level);
    let mut filter = EnvFilter::new(LevelFilter::WARN.to_string());
    for krate in WORKSPACE_CRATES {
        let directive = format!("{krate}={level}")
            .parse()
            .map_err(|err| Error::Config(format!("Invalid log directive for {krate}: {err}")))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

fn log_level(level: &tracing::Level) -> LogLevel {
    match *level {
        tracing::Level::TRACE => LogLevel::Trace,
        tracing::Level::DEBUG => LogLevel::Debug,
        tracing::Level::INFO => LogLevel::Info,
        tracing::Level::WARN => LogLevel::Warn,
        tracing::Level::ERROR => LogLevel::Error,
    }
}

/// Fields recorded on a span, stored in the span's extensions.
struct SpanFields(BTreeMap<String, String>);

/// Forwards events, with their span context, to a [`LoggerSink`].
struct HostSinkLayer {
    sink: Option<Arc<dyn LoggerSink>>,
}

impl HostSinkLayer {
    fn new(sink: Option<Arc<dyn LoggerSink>>) -> Self {
        Self { sink }
    }
}

impl<S> Layer<S> for HostSinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if self.sink.is_none() {
            return;
        }
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = FieldCollector::default();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields(visitor.fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            let mut visitor = FieldCollector::default();
            values.record(&mut visitor);
            fields.extend(visitor.fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };

        let metadata = event.metadata();
        let level = log_level(metadata.level());
        if level < sink.min_level() {
            return;
        }

        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);
        let message = visitor
            .message
            .take()
            .unwrap_or_else(|| metadata.name().to_string());

        let mut entry = LogEntry::new(level, metadata.target(), message);
        if let Some(scope) = ctx.event_scope(event) {
            let mut path = Vec::new();
            for span in scope.from_root() {
                path.push(span.name());
                if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                    for (key, value) in fields {
                        entry.fields.insert(key.clone(), value.clone());
                    }
                }
            }
            if !path.is_empty() {
                entry.span_path = Some(path.join(">"));
            }
        }
        entry.fields.extend(visitor.fields);

        deliver(Arc::clone(sink), entry);
    }
}

fn deliver(sink: Arc<dyn LoggerSink>, entry: LogEntry) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(err) = sink.log(entry).await {
                    eprintln!("LoggerSink error: {err}");
                }
            });
        }
        Err(_) => {
            if let Err(err) = futures::executor::block_on(sink.log(entry)) {
                eprintln!("LoggerSink error: {err}");
            }
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: BTreeMap<String, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }
}

/// Strip a media path or URI down to its last segment before logging it.
///
/// ```
/// use core_runtime::logging::strip_path;
///
/// assert_eq!(strip_path("/sdcard/Music/jazz_in_paris.mp3"), "jazz_in_paris.mp3");
/// assert_eq!(strip_path("asset:///the_coldest_shoulder.mp3"), "the_coldest_shoulder.mp3");
/// ```
pub fn strip_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as SinkResult;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingSink {
        entries: Mutex<Vec<LogEntry>>,
    }

    #[async_trait]
    impl LoggerSink for CapturingSink {
        async fn log(&self, entry: LogEntry) -> SinkResult<()> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }

        fn min_level(&self) -> LogLevel {
            LogLevel::Debug
        }
    }

    fn capture<F: FnOnce()>(emit: F) -> Vec<LogEntry> {
        let sink = Arc::new(CapturingSink::default());
        let trait_sink: Arc<dyn LoggerSink> = sink.clone();
        let subscriber =
            tracing_subscriber::registry().with(HostSinkLayer::new(Some(trait_sink)));
        tracing::subscriber::with_default(subscriber, emit);
        let entries = sink.entries.lock().unwrap().clone();
        entries
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_level(LogLevel::Debug)
            .with_filter("core_service=trace")
            .with_spans(false)
            .with_target(true)
            .with_thread_info(true);

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.filter.as_deref(), Some("core_service=trace"));
        assert!(!config.enable_spans);
        assert!(config.display_target);
        assert!(config.display_thread_info);
    }

    #[test]
    fn test_strip_path() {
        assert_eq!(strip_path("/home/user/music/song.mp3"), "song.mp3");
        assert_eq!(strip_path("C:\\Users\\John\\Music\\song.mp3"), "song.mp3");
        assert_eq!(strip_path("song.mp3"), "song.mp3");
        assert_eq!(strip_path("/var/log/"), "");
    }

    #[test]
    fn test_default_filter_covers_workspace_crates() {
        let config = LoggingConfig::default().with_level(LogLevel::Debug);
        let filter = build_filter(&config).unwrap().to_string();
        assert!(filter.contains("core_service=debug"));
        assert!(filter.contains("bridge_desktop=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn test_custom_filter_replaces_levels() {
        let config = LoggingConfig::default().with_filter("core_service=trace");
        let filter = build_filter(&config).unwrap().to_string();
        assert!(filter.contains("core_service=trace"));
        assert!(!filter.contains("bridge_desktop"));
    }

    #[test]
    fn test_invalid_filter_is_a_config_error() {
        let config = LoggingConfig::default().with_filter("core_service=loud");
        assert!(matches!(build_filter(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_event_fields_reach_sink() {
        let entries = capture(|| {
            tracing::info!(target: "core_service", track_id = "track_1", "Now playing");
            tracing::trace!(target: "core_service", "below the sink level");
        });

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.target, "core_service");
        assert_eq!(entry.message, "Now playing");
        assert_eq!(entry.fields.get("track_id").map(String::as_str), Some("track_1"));
        assert!(entry.span_path.is_none());
    }

    #[test]
    fn test_span_fields_are_inherited() {
        let entries = capture(|| {
            let session = tracing::info_span!("session", session = "abc", state = tracing::field::Empty);
            let _outer = session.enter();
            session.record("state", "Playing");

            let handler = tracing::debug_span!("on_pause");
            let _inner = handler.enter();
            tracing::warn!(state = "Paused", "Adapter rejected command");
        });

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.span_path.as_deref(), Some("session>on_pause"));
        assert_eq!(entry.fields.get("session").map(String::as_str), Some("abc"));
        // The event's own value wins over the span's.
        assert_eq!(entry.fields.get("state").map(String::as_str), Some("Paused"));
    }
}
