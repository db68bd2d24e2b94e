//! Common test utilities for the HIV library and reports
//!
//! - An HIV clinic fixture at Neno and Lisungwi
//! - Providers that fail

#![allow(dead_code)]

pub mod clinic;
pub mod mocks;

pub use clinic::*;
pub use mocks::*;
