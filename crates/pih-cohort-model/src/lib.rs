//! Cohort data model providers
//!
//! This crate provides:
//! - Provider traits through which the engine reads state history, encounters,
//!   observations, identifiers and demographics
//! - `DataSources`, the bundle of providers built once at startup
//! - An in-memory store implementing every provider

pub mod provider;
pub mod sources;
pub mod store;

pub use provider::*;
pub use sources::DataSources;
pub use store::InMemoryStore;
