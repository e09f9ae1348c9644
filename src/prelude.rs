//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use snmpc::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Session`], [`Oid`], [`Value`], [`VarBind`]
//! - Walking: [`Walk`], [`WalkOptions`]
//! - Error handling: [`Error`], [`Result`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::error::{Error, Result};
pub use crate::oid::Oid;
pub use crate::session::{Session, SessionConfig};
pub use crate::transport::Transport;
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;
pub use crate::walk::{Walk, WalkOptions};

#[doc(no_inline)]
pub use crate::oid;
