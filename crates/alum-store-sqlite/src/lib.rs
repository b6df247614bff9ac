//! Local platform backend for alum.
//!
//! Implements every `alum_core::platform` trait on top of one SQLite file
//! (accounts, profiles, presence) plus a directory on disk (headshots) and a
//! plain-text allowlist. Wraps [`tokio_rusqlite`] so all database access runs
//! on a dedicated thread without blocking the async runtime.

mod auth;
mod encode;
mod feeds;
mod files;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqlitePlatform, StoreOptions};

#[cfg(test)]
mod tests;
