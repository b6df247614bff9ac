//! The platform traits and supporting types.
//!
//! Everything the client persists or authenticates goes through these traits.
//! Backends (e.g. `alum-store-sqlite`) implement them; the session controller
//! depends on the abstraction only.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::{
  member::{MemberProfile, ProfilePatch, UserId},
  presence::{PresenceRecord, PresenceStatus},
};

// ─── Session ─────────────────────────────────────────────────────────────────

/// The identity carried by a session-changed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
  pub user_id: UserId,
  pub email:   String,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failure reported by the platform.
#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("An account already exists for this email.")]
  AlreadyRegistered,

  #[error("Incorrect email or password.")]
  InvalidCredentials,

  #[error("Password must be at least {0} characters.")]
  WeakPassword(usize),

  #[error("Permission denied.")]
  PermissionDenied,

  #[error("{0}")]
  Unavailable(String),

  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

// ─── Feeds ───────────────────────────────────────────────────────────────────

/// One delivery on a subscription: a full snapshot, or the reason none could
/// be produced.
pub type FeedUpdate<T> = PlatformResult<T>;

/// The receiving end of a real-time subscription.
///
/// Dropping the feed is how a subscription is stopped; the producer observes
/// the closed channel and exits.
#[derive(Debug)]
pub struct Feed<T> {
  rx: mpsc::Receiver<FeedUpdate<T>>,
}

/// The producing end of a [`Feed`], held by the backend.
#[derive(Debug)]
pub struct FeedSender<T> {
  tx: mpsc::Sender<FeedUpdate<T>>,
}

impl<T> Clone for FeedSender<T> {
  fn clone(&self) -> Self { Self { tx: self.tx.clone() } }
}

impl<T> Feed<T> {
  /// A connected sender/feed pair with room for `capacity` queued updates.
  pub fn channel(capacity: usize) -> (FeedSender<T>, Feed<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (FeedSender { tx }, Feed { rx })
  }

  /// Wait for the next update. `None` once the producer is gone.
  pub async fn recv(&mut self) -> Option<FeedUpdate<T>> { self.rx.recv().await }

  /// Take an update if one is already queued.
  pub fn try_recv(&mut self) -> Option<FeedUpdate<T>> { self.rx.try_recv().ok() }
}

impl<T> FeedSender<T> {
  /// Deliver an update. Returns `false` once the subscriber has gone away.
  pub async fn send(&self, update: FeedUpdate<T>) -> bool {
    self.tx.send(update).await.is_ok()
  }

  /// Deliver an update without waiting for queue space. Returns `false` if
  /// the queue is full or the subscriber has gone away.
  pub fn try_send(&self, update: FeedUpdate<T>) -> bool {
    self.tx.try_send(update).is_ok()
  }

  pub fn is_closed(&self) -> bool { self.tx.is_closed() }

  /// Resolves when the subscriber drops its [`Feed`].
  pub async fn closed(&self) { self.tx.closed().await }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Source of the raw registration allowlist text.
pub trait AllowlistSource: Send + Sync {
  fn fetch_allowlist(&self) -> impl Future<Output = PlatformResult<String>> + Send;
}

/// Account management and the current session.
pub trait AuthProvider: Send + Sync {
  /// Create an account and sign it in. Fails with
  /// [`PlatformError::AlreadyRegistered`] if the email is taken.
  fn register(
    &self,
    email: &str,
    password: &str,
  ) -> impl Future<Output = PlatformResult<AuthUser>> + Send;

  fn sign_in(
    &self,
    email: &str,
    password: &str,
  ) -> impl Future<Output = PlatformResult<AuthUser>> + Send;

  fn sign_out(&self) -> impl Future<Output = PlatformResult<()>> + Send;

  /// The signed-in user at this instant, if any.
  fn current_user(&self) -> Option<AuthUser>;

  /// Session-changed notifications. The current value is the session at the
  /// time of the call.
  fn session_changes(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// Profile and presence documents, with real-time subscriptions.
pub trait DocumentStore: Send + Sync {
  /// Read a profile once. `None` if it has never been written.
  fn get_profile(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = PlatformResult<Option<MemberProfile>>> + Send;

  /// Write the initial profile for a freshly registered account.
  fn create_profile(
    &self,
    profile: &MemberProfile,
  ) -> impl Future<Output = PlatformResult<()>> + Send;

  /// Merge-write the owner's profile, creating it if missing.
  fn merge_profile(
    &self,
    user_id: UserId,
    patch: &ProfilePatch,
  ) -> impl Future<Output = PlatformResult<()>> + Send;

  /// Merge-write a presence record. The platform assigns `last_seen`.
  fn set_presence(
    &self,
    user: &AuthUser,
    status: PresenceStatus,
  ) -> impl Future<Output = PlatformResult<()>> + Send;

  /// Every member profile, re-delivered in full on every change.
  fn subscribe_directory(&self) -> Feed<Vec<MemberProfile>>;

  /// Every presence record ordered by email, re-delivered on every change.
  fn subscribe_presence(&self) -> Feed<Vec<PresenceRecord>>;
}

/// Binary object storage for headshots.
pub trait BlobStore: Send + Sync {
  /// Store the image under the user's key and return a retrievable URL.
  fn upload_headshot(
    &self,
    user_id: UserId,
    bytes: &[u8],
    media_type: &str,
  ) -> impl Future<Output = PlatformResult<String>> + Send;
}

/// Everything the session controller needs from a platform.
pub trait Platform:
  AllowlistSource + AuthProvider + DocumentStore + BlobStore + 'static
{
}

impl<T> Platform for T where
  T: AllowlistSource + AuthProvider + DocumentStore + BlobStore + 'static
{
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn dropping_the_feed_closes_the_sender() {
    let (tx, mut feed) = Feed::<u32>::channel(4);
    assert!(tx.send(Ok(7)).await);
    assert!(matches!(feed.recv().await, Some(Ok(7))));
    assert!(!tx.is_closed());

    drop(feed);
    assert!(tx.is_closed());
    tx.closed().await;
    assert!(!tx.send(Ok(8)).await);
  }

  #[tokio::test]
  async fn feed_ends_when_producer_is_gone() {
    let (tx, mut feed) = Feed::<u32>::channel(1);
    drop(tx);
    assert!(feed.recv().await.is_none());
  }
}
