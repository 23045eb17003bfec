//! The GELF log-event entity.
//!
//! A [`LogEvent`] holds the data of one log occurrence: the required wire
//! fields (`version`, `host`, `timestamp`), the syslog severity, the
//! optional free-text fields, and caller-supplied additional fields. It
//! performs no I/O; [`LogEvent::to_map`] produces the canonical mapping an
//! external encoder turns into wire bytes.

use crate::models::level::{InvalidLevel, LogLevel};
use chrono::{DateTime, TimeZone};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// The GELF wire-format version emitted by this crate.
pub const GELF_VERSION: &str = "1.0";

/// Errors that can occur while building or reading a log event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A level value outside 0-7 or an unrecognized level name.
    #[error(transparent)]
    InvalidLevel(#[from] InvalidLevel),

    /// An empty additional-field key, or a lookup of a key that was
    /// never set.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A timestamp in seconds since the Unix epoch, as carried on the wire.
///
/// Construction is lenient by design: the level and the additional-field
/// keys determine protocol correctness and fail loudly, while a malformed
/// timestamp merely mis-orders events and must not block delivery. Inputs
/// that cannot be read as a number coerce to 0.
///
/// Accepted input forms:
/// - `f64` / `i64` / `u64` / `i32` — used as-is; a float keeps its
///   fractional part
/// - `&str` / `String` — parsed as a decimal number, then truncated toward
///   zero (`"1.23"` becomes 1); unparseable input becomes 0
/// - [`chrono::DateTime`] — whole-second epoch value only
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp(f64);

impl Timestamp {
    /// The current time, with fractional seconds.
    #[must_use]
    pub fn now() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |elapsed| elapsed.as_secs_f64());
        Self(seconds)
    }

    /// Returns the seconds since the Unix epoch.
    #[must_use]
    pub const fn seconds(self) -> f64 {
        self.0
    }
}

impl From<f64> for Timestamp {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self(value)
        } else {
            Self(0.0)
        }
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self(value as f64)
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self(value as f64)
    }
}

impl From<i32> for Timestamp {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl From<&str> for Timestamp {
    /// Numeric strings truncate toward zero; anything else coerces to 0.
    fn from(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Self(parsed.trunc()),
            _ => Self(0.0),
        }
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    /// A date-time contributes only its whole-second epoch value.
    fn from(value: DateTime<Tz>) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self(value.timestamp() as f64)
    }
}

/// A log event to be shipped to a remote GELF collector.
///
/// Constructed with defaults (local hostname, current time, severity 1),
/// mutated through fluent `with_*` setters, and serialized zero or more
/// times via [`LogEvent::to_map`]. The entity is owned exclusively by its
/// creator; it holds no connection and performs no I/O.
///
/// # Example
///
/// ```
/// use gelf_client::models::{EventError, LogEvent, LogLevel};
///
/// fn build() -> Result<LogEvent, EventError> {
///     Ok(LogEvent::new()
///         .with_level("warn".parse()?)
///         .with_short_message("disk nearly full")
///         .with_additional("mount", "/var")?)
/// }
///
/// let event = build().unwrap();
/// assert_eq!(event.syslog_level(), 4);
/// assert_eq!(event.to_map()["_mount"], "/var");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    host: String,
    timestamp: Timestamp,
    level: LogLevel,
    short_message: Option<String>,
    full_message: Option<String>,
    facility: Option<String>,
    file: Option<String>,
    line: Option<u64>,
    additionals: Map<String, Value>,
}

/// Queries the execution environment's configured hostname.
///
/// Falls back to `"localhost"` when the lookup fails.
fn local_host() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}

impl LogEvent {
    /// Creates a log event with default values: the local hostname, the
    /// current time, and severity 1 (alert).
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: local_host(),
            timestamp: Timestamp::now(),
            level: LogLevel::default(),
            short_message: None,
            full_message: None,
            facility: None,
            file: None,
            line: None,
            additionals: Map::new(),
        }
    }

    /// Returns the fixed wire-format version.
    #[must_use]
    pub fn version(&self) -> &'static str {
        GELF_VERSION
    }

    /// Returns the originating host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sets the originating host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Returns the event timestamp in seconds since the Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> f64 {
        self.timestamp.seconds()
    }

    /// Sets the event timestamp.
    ///
    /// Accepts any input form [`Timestamp`] converts from; coercion never
    /// fails (see the leniency rules on [`Timestamp`]).
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<Timestamp>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Returns the level in the standard named convention.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns the raw syslog severity (0-7).
    #[must_use]
    pub fn syslog_level(&self) -> u8 {
        self.level.severity()
    }

    /// Sets the severity level.
    ///
    /// Callers holding a raw integer or a level name validate it first via
    /// [`LogLevel::from_severity`] or [`str::parse`], both of which fail
    /// with [`InvalidLevel`] for unrecognized input.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Returns the short message, if set.
    #[must_use]
    pub fn short_message(&self) -> Option<&str> {
        self.short_message.as_deref()
    }

    /// Sets the short message.
    #[must_use]
    pub fn with_short_message(mut self, message: impl Into<String>) -> Self {
        self.short_message = Some(message.into());
        self
    }

    /// Returns the full message, if set.
    #[must_use]
    pub fn full_message(&self) -> Option<&str> {
        self.full_message.as_deref()
    }

    /// Sets the full message.
    #[must_use]
    pub fn with_full_message(mut self, message: impl Into<String>) -> Self {
        self.full_message = Some(message.into());
        self
    }

    /// Returns the facility, if set.
    #[must_use]
    pub fn facility(&self) -> Option<&str> {
        self.facility.as_deref()
    }

    /// Sets the facility.
    #[must_use]
    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.facility = Some(facility.into());
        self
    }

    /// Returns the source file reference, if set.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Sets the source file reference.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Returns the source line reference, if set.
    #[must_use]
    pub fn line(&self) -> Option<u64> {
        self.line
    }

    /// Sets the source line reference.
    #[must_use]
    pub fn with_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    /// Adds an additional field to the event.
    ///
    /// A repeated key overwrites the prior value (last write wins). The
    /// insertion order of first-seen keys is kept for enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidArgument`] when `key` is empty.
    pub fn with_additional(
        mut self,
        key: impl Into<String>,
        value: impl Serialize,
    ) -> Result<Self, EventError> {
        let key = key.into();
        if key.is_empty() {
            return Err(EventError::InvalidArgument(
                "additional field key must not be empty".to_string(),
            ));
        }
        self.additionals.insert(
            key,
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
        Ok(self)
    }

    /// Returns the value of an additional field.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidArgument`] when `key` was never set.
    pub fn additional(&self, key: &str) -> Result<&Value, EventError> {
        self.additionals.get(key).ok_or_else(|| {
            EventError::InvalidArgument(format!("additional field not set: {key}"))
        })
    }

    /// Returns all additional fields, with their unprefixed keys.
    ///
    /// Never null: an event without additional fields yields an empty map.
    #[must_use]
    pub fn additionals(&self) -> &Map<String, Value> {
        &self.additionals
    }

    /// Produces the canonical serializable form of the event.
    ///
    /// `version`, `host`, and `timestamp` are always present. The optional
    /// fields and the severity appear only when non-empty: unset values,
    /// empty strings, `line` 0, and severity 0 are omitted from the mapping
    /// entirely, matching the wire behavior collectors expect. Every
    /// additional field is emitted under its key prefixed with an
    /// underscore, regardless of its value.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("version".to_string(), Value::from(GELF_VERSION));
        map.insert("host".to_string(), Value::from(self.host.clone()));
        map.insert("timestamp".to_string(), Value::from(self.timestamp.seconds()));

        if let Some(message) = non_empty(self.short_message.as_deref()) {
            map.insert("short_message".to_string(), Value::from(message));
        }
        if let Some(message) = non_empty(self.full_message.as_deref()) {
            map.insert("full_message".to_string(), Value::from(message));
        }
        if self.level.severity() != 0 {
            map.insert("level".to_string(), Value::from(self.level.severity()));
        }
        if let Some(facility) = non_empty(self.facility.as_deref()) {
            map.insert("facility".to_string(), Value::from(facility));
        }
        if let Some(file) = non_empty(self.file.as_deref()) {
            map.insert("file".to_string(), Value::from(file));
        }
        if let Some(line) = self.line.filter(|&line| line != 0) {
            map.insert("line".to_string(), Value::from(line));
        }

        for (key, value) in &self.additionals {
            map.insert(format!("_{key}"), value.clone());
        }

        map
    }
}

impl Default for LogEvent {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for LogEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn epoch_now() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs_f64()
    }

    #[test]
    fn defaults() {
        let event = LogEvent::new();

        assert_eq!(event.version(), "1.0");
        assert_eq!(event.host(), local_host());
        assert_eq!(event.level(), LogLevel::Alert);
        assert_eq!(event.syslog_level(), 1);
        assert!(event.short_message().is_none());
        assert!(event.full_message().is_none());
        assert!(event.facility().is_none());
        assert!(event.file().is_none());
        assert!(event.line().is_none());
        assert!(event.additionals().is_empty());
    }

    #[test]
    fn default_timestamp_is_recent() {
        let event = LogEvent::new();
        assert!(event.timestamp() > 0.0);
        assert!(event.timestamp() <= epoch_now());
    }

    #[test]
    fn timestamp_from_number_keeps_fraction() {
        let event = LogEvent::new().with_timestamp(123.456);
        assert!((event.timestamp() - 123.456).abs() < f64::EPSILON);

        let event = LogEvent::new().with_timestamp(123i64);
        assert!((event.timestamp() - 123.0).abs() < f64::EPSILON);
    }

    #[test]
    fn timestamp_from_string_truncates_toward_zero() {
        assert!((Timestamp::from("1.23").seconds() - 1.0).abs() < f64::EPSILON);
        assert!((Timestamp::from("-1.9").seconds() - -1.0).abs() < f64::EPSILON);
        assert!((Timestamp::from("42").seconds() - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn timestamp_from_garbage_coerces_to_zero() {
        assert!(Timestamp::from("abc").seconds().abs() < f64::EPSILON);
        assert!(Timestamp::from("").seconds().abs() < f64::EPSILON);
        assert!(Timestamp::from(f64::NAN).seconds().abs() < f64::EPSILON);
        assert!(Timestamp::from(f64::INFINITY).seconds().abs() < f64::EPSILON);
    }

    #[test]
    fn timestamp_from_datetime_is_whole_seconds() {
        let instant = Utc::now();
        let event = LogEvent::new().with_timestamp(instant);

        #[allow(clippy::cast_precision_loss)]
        let expected = instant.timestamp() as f64;
        assert!((event.timestamp() - expected).abs() < f64::EPSILON);
        assert!((event.timestamp().fract()).abs() < f64::EPSILON);
    }

    #[test]
    fn optional_field_accessors() {
        let event = LogEvent::new()
            .with_short_message("short")
            .with_full_message("full")
            .with_facility("daemon")
            .with_file("main.rs")
            .with_line(42);

        assert_eq!(event.short_message(), Some("short"));
        assert_eq!(event.full_message(), Some("full"));
        assert_eq!(event.facility(), Some("daemon"));
        assert_eq!(event.file(), Some("main.rs"));
        assert_eq!(event.line(), Some(42));
    }

    #[test]
    fn additionals_last_write_wins() {
        let event = LogEvent::new().with_additional("foo", "bar").unwrap();
        assert_eq!(event.additional("foo").unwrap(), &json!("bar"));
        assert_eq!(event.additionals().len(), 1);

        let event = event.with_additional("foo", "buk").unwrap();
        assert_eq!(event.additional("foo").unwrap(), &json!("buk"));
        assert_eq!(event.additionals().len(), 1);
    }

    #[test]
    fn additional_empty_key_fails() {
        let err = LogEvent::new().with_additional("", "test").unwrap_err();
        assert!(matches!(err, EventError::InvalidArgument(_)));
    }

    #[test]
    fn additional_unset_key_fails() {
        let event = LogEvent::new();
        let err = event.additional("missing").unwrap_err();
        assert!(matches!(err, EventError::InvalidArgument(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn additionals_keep_insertion_order() {
        let event = LogEvent::new()
            .with_additional("zebra", 1)
            .unwrap()
            .with_additional("apple", 2)
            .unwrap();

        let keys: Vec<&String> = event.additionals().keys().collect();
        assert_eq!(keys, ["zebra", "apple"]);
    }

    #[test]
    fn to_map_minimal_event() {
        let event = LogEvent::new().with_additional("foo", "bar").unwrap();
        let map = event.to_map();

        assert_eq!(map["version"], "1.0");
        assert_eq!(map["host"], event.host());
        assert!(map["timestamp"].is_number());
        assert_eq!(map["_foo"], "bar");
        // default severity 1 is non-empty and therefore present
        assert_eq!(map["level"], 1);

        for absent in ["short_message", "full_message", "facility", "file", "line"] {
            assert!(!map.contains_key(absent), "{absent} should be omitted");
        }
    }

    #[test]
    fn to_map_includes_set_fields() {
        let event = LogEvent::new()
            .with_level(LogLevel::Error)
            .with_short_message("short")
            .with_full_message("full")
            .with_facility("daemon")
            .with_file("main.rs")
            .with_line(42);
        let map = event.to_map();

        assert_eq!(map["short_message"], "short");
        assert_eq!(map["full_message"], "full");
        assert_eq!(map["level"], 3);
        assert_eq!(map["facility"], "daemon");
        assert_eq!(map["file"], "main.rs");
        assert_eq!(map["line"], 42);
    }

    #[test]
    fn to_map_omits_empty_and_zero_equivalent_values() {
        let event = LogEvent::new()
            .with_level(LogLevel::Emergency)
            .with_short_message("")
            .with_file("")
            .with_line(0);
        let map = event.to_map();

        assert!(!map.contains_key("short_message"));
        assert!(!map.contains_key("file"));
        assert!(!map.contains_key("line"));
        assert!(!map.contains_key("level"));
    }

    #[test]
    fn to_map_prefixes_every_additional() {
        let event = LogEvent::new()
            .with_additional("empty", "")
            .unwrap()
            .with_additional("zero", 0)
            .unwrap();
        let map = event.to_map();

        assert_eq!(map["_empty"], "");
        assert_eq!(map["_zero"], 0);
    }

    #[test]
    fn serialize_delegates_to_map() {
        let event = LogEvent::new()
            .with_host("example.local")
            .with_timestamp(123)
            .with_additional("foo", "bar")
            .unwrap();

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, Value::Object(event.to_map()));
        assert_eq!(value["host"], "example.local");
        assert_eq!(value["_foo"], "bar");
    }

    #[test]
    fn fluent_chaining() {
        let event = LogEvent::new()
            .with_timestamp(Utc::now())
            .with_additional("test", "value")
            .unwrap()
            .with_facility("test")
            .with_host("test")
            .with_file("test")
            .with_full_message("testtest")
            .with_short_message("test")
            .with_level("ERROR".parse().unwrap())
            .with_line(1);

        assert_eq!(event.syslog_level(), 3);
        assert_eq!(event.host(), "test");
    }
}
