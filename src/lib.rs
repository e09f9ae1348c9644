//! Async SNMP manager.
//!
//! `snmpc` talks SNMPv1 and SNMPv2c to a single agent: GET, GETNEXT and
//! GETBULK requests, subtree walks and TRAPv2 notifications. It is the
//! library behind the `snmp` command-line tool.
//!
//! # Example
//!
//! ```rust,no_run
//! use snmpc::{Session, SessionConfig, UdpTransport, mib};
//!
//! # async fn run() -> snmpc::Result<()> {
//! let transport = UdpTransport::connect("192.0.2.1:161".parse().unwrap()).await?;
//! let session = Session::new(transport, SessionConfig::default());
//!
//! let response = session.get(&[mib::resolve("sysDescr.0")?]).await?;
//! for vb in response.check()? {
//!     println!("{} = {}", vb.oid, vb.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Walking
//!
//! [`Session::walk`] returns a [`Walk`], a `futures_core::Stream` of
//! bindings. It stops at the end of the subtree, at an exception value, or
//! when the agent repeats an OID; an agent that goes backwards is reported
//! as [`Error::NonIncreasingOid`].

pub mod agent;
pub mod ber;
pub mod config;
pub mod error;
pub mod message;
pub mod mib;
pub mod notation;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;
pub mod trap;
pub mod value;
pub mod varbind;
pub mod version;
pub mod walk;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, ErrorCategory, ErrorStatus, Result};
pub use notation::{ValueType, parse_value};
pub use oid::Oid;
pub use request::Request;
pub use response::Response;
pub use session::{Session, SessionConfig};
pub use transport::{MAX_MESSAGE_SIZE, TcpTransport, Transport, UdpTransport};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
pub use walk::{BulkParams, Walk, WalkOptions};

#[cfg(any(test, feature = "testing"))]
pub use transport::{MockTransport, ResponseBuilder};
