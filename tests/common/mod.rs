//! Shared test utilities for snmpc integration tests.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

mod agent;
mod fixtures;
mod stream;

pub use agent::{FakeAgent, fake_session};
pub use fixtures::*;
pub use stream::{collect_stream, collect_walk};
