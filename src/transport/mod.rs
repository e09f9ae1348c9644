//! Transport layer abstraction.
//!
//! Provides the `Transport` trait and implementations for UDP and TCP, plus a
//! scripted mock for tests.

mod tcp;
mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use tcp::*;
pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Largest reply a transport will accept.
pub const MAX_MESSAGE_SIZE: usize = 65535;

/// Client-side transport abstraction.
///
/// # Clone Requirement
///
/// Walk streams own a clone of the session and thus of the transport. All
/// implementations use `Arc` internally, making clone cheap.
pub trait Transport: Send + Sync + Clone {
    /// Send request data to the target.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive one reply, waiting at most `timeout`.
    ///
    /// `request_id` only appears in the timeout error; correlation is done by
    /// the session.
    ///
    /// Returns (response_data, actual_source_address)
    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// The peer address for this transport.
    fn peer_addr(&self) -> SocketAddr;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;

    /// Whether this is a stream transport (TCP).
    ///
    /// When true, the session skips retries (stream guarantees delivery or failure).
    /// When false (UDP), the session retries on timeout.
    fn is_stream(&self) -> bool;
}
