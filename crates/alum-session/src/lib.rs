//! Session and presence orchestration for the alum client.
//!
//! [`SessionPresenceController`] mirrors the platform's auth state, keeps at
//! most one directory and one presence subscription alive, writes the
//! online/offline heartbeat, and holds the [`view::View`] the renderer draws.

mod actions;
mod controller;

pub mod view;

pub use controller::{FeedEvent, SessionPresenceController};

#[cfg(test)]
mod fake;
