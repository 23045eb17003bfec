//! GELF Client Core
//!
//! This crate contains the client-side building blocks for shipping
//! structured log events to a remote GELF collector: the log-event entity
//! with its validation and canonical serialization, and a lazily-connecting
//! blocking stream transport with an atomic write contract.
//!
//! # Modules
//!
//! - [`models`] - The [`LogEvent`](models::LogEvent) entity, severity levels,
//!   and timestamp coercion
//! - [`transport`] - The [`StreamTransport`](transport::StreamTransport)
//!   connection wrapper over TCP, UDP, or TLS
//!
//! Encoding the serialized event mapping into wire bytes, chunked-UDP
//! fragmentation, and publish/retry orchestration are left to surrounding
//! code: it consumes [`LogEvent::to_map`](models::LogEvent::to_map) and
//! [`StreamTransport::write`](transport::StreamTransport::write).
//!
//! # Example
//!
//! ```
//! use gelf_client::models::{LogEvent, LogLevel};
//!
//! let event = LogEvent::new()
//!     .with_level(LogLevel::Error)
//!     .with_short_message("database connection failed")
//!     .with_additional("retry_count", 3)?;
//!
//! let map = event.to_map();
//! assert_eq!(map["_retry_count"], 3);
//! assert_eq!(map["version"], "1.0");
//! # Ok::<(), gelf_client::models::EventError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod models;
pub mod transport;

pub use models::{EventError, InvalidLevel, LogEvent, LogLevel, Timestamp};
pub use transport::{Scheme, StreamTransport, TransportError};

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde_json;
