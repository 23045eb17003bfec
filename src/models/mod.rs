//! Data model for GELF log events.
//!
//! This module contains the core structures a producer fills in before an
//! event is encoded and shipped: the event entity itself, syslog-style
//! severity levels, and the lenient timestamp coercion rules.

pub mod event;
pub mod level;

pub use event::{EventError, LogEvent, Timestamp, GELF_VERSION};
pub use level::{InvalidLevel, LogLevel};
