//! Common test utilities for cohort evaluation
//!
//! - A small clinic fixture loaded into an in-memory store
//! - Mock providers that count, fail or never answer

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
