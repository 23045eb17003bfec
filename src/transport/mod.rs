//! Byte-stream transports for delivering encoded events.
//!
//! This module provides the lazily-connecting [`StreamTransport`] over TCP,
//! UDP, or a TLS-wrapped stream. The transport knows nothing about log
//! semantics; it exposes a single atomic write operation to an external
//! publisher.

pub mod stream;

pub use stream::{Connection, Scheme, StreamTransport, TransportError, CONNECT_TIMEOUT};
