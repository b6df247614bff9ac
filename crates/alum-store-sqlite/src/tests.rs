//! Integration tests for `SqlitePlatform` against an in-memory database.

use std::time::Duration;

use alum_core::{
  member::{MemberProfile, ProfilePatch, UserId},
  platform::{
    AllowlistSource, AuthProvider, BlobStore, DocumentStore, Feed, FeedUpdate, PlatformError,
  },
  presence::PresenceStatus,
};
use tempfile::TempDir;

use crate::{SqlitePlatform, StoreOptions};

async fn platform() -> (SqlitePlatform, TempDir) {
  let dir = tempfile::tempdir().expect("temp dir");
  let allowlist = dir.path().join("allowlist.txt");
  std::fs::write(&allowlist, "Ada@Example.com\ngrace@example.com\n").expect("allowlist");
  let options = StoreOptions { blob_dir: dir.path().join("blobs"), allowlist_path: allowlist };
  let platform = SqlitePlatform::open_in_memory(options).await.expect("in-memory store");
  (platform, dir)
}

async fn next<T>(feed: &mut Feed<T>) -> FeedUpdate<T> {
  tokio::time::timeout(Duration::from_secs(5), feed.recv())
    .await
    .expect("feed delivery timed out")
    .expect("feed closed")
}

fn patch(email: &str, name: &str) -> ProfilePatch {
  ProfilePatch {
    email:        email.to_owned(),
    name:         name.to_owned(),
    grad_year:    Some(2020),
    industries:   vec!["Engineering".to_owned()],
    bio:          String::new(),
    headshot_url: None,
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_signs_in_and_publishes_session() {
  let (p, _dir) = platform().await;
  let mut changes = p.session_changes();
  assert!(changes.borrow().is_none());

  let user = p.register("Ada@Example.com ", "hunter22").await.unwrap();
  assert_eq!(user.email, "ada@example.com");
  assert_eq!(p.current_user(), Some(user.clone()));

  changes.changed().await.unwrap();
  assert_eq!(*changes.borrow(), Some(user));
}

#[tokio::test]
async fn register_twice_is_rejected() {
  let (p, _dir) = platform().await;
  p.register("ada@example.com", "hunter22").await.unwrap();
  let err = p.register("ADA@example.com", "another1").await.unwrap_err();
  assert!(matches!(err, PlatformError::AlreadyRegistered));
}

#[tokio::test]
async fn short_password_is_rejected() {
  let (p, _dir) = platform().await;
  let err = p.register("ada@example.com", "abc").await.unwrap_err();
  assert!(matches!(err, PlatformError::WeakPassword(6)));
  assert!(p.current_user().is_none());
}

#[tokio::test]
async fn sign_in_checks_password() {
  let (p, _dir) = platform().await;
  let registered = p.register("ada@example.com", "hunter22").await.unwrap();
  p.sign_out().await.unwrap();
  assert!(p.current_user().is_none());

  let err = p.sign_in("ada@example.com", "wrong-pass").await.unwrap_err();
  assert!(matches!(err, PlatformError::InvalidCredentials));
  let err = p.sign_in("nobody@example.com", "hunter22").await.unwrap_err();
  assert!(matches!(err, PlatformError::InvalidCredentials));

  let user = p.sign_in("ada@example.com", "hunter22").await.unwrap();
  assert_eq!(user, registered);
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_writes_require_the_owner() {
  let (p, _dir) = platform().await;
  let stranger = MemberProfile::new(UserId::new(), "eve@example.com");
  let err = p.create_profile(&stranger).await.unwrap_err();
  assert!(matches!(err, PlatformError::PermissionDenied));

  let user = p.register("ada@example.com", "hunter22").await.unwrap();
  let err = p.merge_profile(stranger.user_id, &patch("eve@example.com", "Eve")).await;
  assert!(matches!(err, Err(PlatformError::PermissionDenied)));

  p.create_profile(&MemberProfile::new(user.user_id, &user.email)).await.unwrap();
}

#[tokio::test]
async fn merge_profile_creates_then_updates() {
  let (p, _dir) = platform().await;
  let user = p.register("ada@example.com", "hunter22").await.unwrap();
  assert!(p.get_profile(user.user_id).await.unwrap().is_none());

  p.merge_profile(user.user_id, &patch(&user.email, "Ada")).await.unwrap();
  let stored = p.get_profile(user.user_id).await.unwrap().unwrap();
  assert_eq!(stored.name, "Ada");
  assert_eq!(stored.grad_year, Some(2020));
  assert_eq!(stored.industries, vec!["Engineering".to_owned()]);

  p.merge_profile(user.user_id, &patch(&user.email, "Ada Lovelace")).await.unwrap();
  let stored = p.get_profile(user.user_id).await.unwrap().unwrap();
  assert_eq!(stored.name, "Ada Lovelace");
}

#[tokio::test]
async fn merge_without_headshot_keeps_stored_url() {
  let (p, _dir) = platform().await;
  let user = p.register("ada@example.com", "hunter22").await.unwrap();

  let mut with_url = patch(&user.email, "Ada");
  with_url.headshot_url = Some("file:///tmp/ada.png?v=1".to_owned());
  p.merge_profile(user.user_id, &with_url).await.unwrap();
  p.merge_profile(user.user_id, &patch(&user.email, "Ada")).await.unwrap();

  let stored = p.get_profile(user.user_id).await.unwrap().unwrap();
  assert_eq!(stored.headshot_url.as_deref(), Some("file:///tmp/ada.png?v=1"));
}

// ─── Presence ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn presence_is_last_write_wins() {
  let (p, _dir) = platform().await;
  let user = p.register("ada@example.com", "hunter22").await.unwrap();

  p.set_presence(&user, PresenceStatus::Online).await.unwrap();
  p.set_presence(&user, PresenceStatus::Offline).await.unwrap();

  let records = p.list_presence().await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].status, PresenceStatus::Offline);
  assert!(records[0].last_seen.is_some());
}

#[tokio::test]
async fn presence_write_after_sign_out_is_denied() {
  let (p, _dir) = platform().await;
  let user = p.register("ada@example.com", "hunter22").await.unwrap();
  p.sign_out().await.unwrap();
  let err = p.set_presence(&user, PresenceStatus::Offline).await.unwrap_err();
  assert!(matches!(err, PlatformError::PermissionDenied));
}

// ─── Feeds ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn directory_feed_redelivers_after_writes() {
  let (p, _dir) = platform().await;
  let mut feed = p.subscribe_directory();
  assert!(next(&mut feed).await.unwrap().is_empty());

  let user = p.register("ada@example.com", "hunter22").await.unwrap();
  p.create_profile(&MemberProfile::new(user.user_id, &user.email)).await.unwrap();

  let members = next(&mut feed).await.unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].email, "ada@example.com");
}

#[tokio::test]
async fn presence_feed_is_ordered_by_email() {
  let (p, _dir) = platform().await;
  let grace = p.register("grace@example.com", "hunter22").await.unwrap();
  p.set_presence(&grace, PresenceStatus::Online).await.unwrap();
  let ada = p.register("ada@example.com", "hunter22").await.unwrap();
  p.set_presence(&ada, PresenceStatus::Online).await.unwrap();

  let mut feed = p.subscribe_presence();
  let records = next(&mut feed).await.unwrap();
  let emails: Vec<_> = records.iter().map(|r| r.email.as_str()).collect();
  assert_eq!(emails, ["ada@example.com", "grace@example.com"]);
}

#[tokio::test]
async fn dropped_feed_stops_its_task() {
  let (p, _dir) = platform().await;
  let mut feed = p.subscribe_presence();
  next(&mut feed).await.unwrap();
  drop(feed);

  // Give the producer a chance to observe the closed channel.
  for _ in 0..50 {
    if p.changes.receiver_count() == 0 {
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  assert_eq!(p.changes.receiver_count(), 0);
}

// ─── Files ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn allowlist_is_read_from_disk() {
  let (p, _dir) = platform().await;
  let text = p.fetch_allowlist().await.unwrap();
  assert!(text.contains("grace@example.com"));
}

#[tokio::test]
async fn missing_allowlist_is_unavailable() {
  let dir = tempfile::tempdir().unwrap();
  let options = StoreOptions {
    blob_dir:       dir.path().join("blobs"),
    allowlist_path: dir.path().join("missing.txt"),
  };
  let p = SqlitePlatform::open_in_memory(options).await.unwrap();
  let err = p.fetch_allowlist().await.unwrap_err();
  assert!(matches!(err, PlatformError::Unavailable(_)));
}

#[tokio::test]
async fn headshot_upload_replaces_previous_file() {
  let (p, dir) = platform().await;
  let user = p.register("ada@example.com", "hunter22").await.unwrap();

  let first = p.upload_headshot(user.user_id, b"png bytes", "image/png").await.unwrap();
  let second = p.upload_headshot(user.user_id, b"jpeg bytes", "image/jpeg").await.unwrap();
  assert!(first.starts_with("file://"));
  assert_ne!(first, second);

  let files: Vec<_> = std::fs::read_dir(dir.path().join("blobs/headshots"))
    .unwrap()
    .map(|e| e.unwrap().file_name().into_string().unwrap())
    .collect();
  assert_eq!(files, vec![format!("{}.jpg", user.user_id)]);
}

#[tokio::test]
async fn headshot_upload_requires_the_owner() {
  let (p, _dir) = platform().await;
  let err = p.upload_headshot(UserId::new(), b"png", "image/png").await.unwrap_err();
  assert!(matches!(err, PlatformError::PermissionDenied));
}
