//! Core types and trait definitions for the alum alumni directory.
//!
//! This crate holds the member and presence model, the allowlist, the pure
//! directory filter, and the traits through which the client reaches its
//! platform (accounts, documents, blobs). It knows nothing about SQLite or
//! terminals.

pub mod allowlist;
pub mod directory;
pub mod error;
pub mod member;
pub mod platform;
pub mod presence;

pub use error::{Error, Result};
