//! In-process platform used by the controller tests.
//!
//! Feeds are delivered synchronously on subscribe and after every write, so a
//! test can call `drain_feed_events` right after an action.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard},
};

use alum_core::{
  member::{MemberProfile, ProfilePatch, UserId},
  platform::{
    AllowlistSource, AuthProvider, AuthUser, BlobStore, DocumentStore, Feed, FeedSender,
    PlatformError, PlatformResult,
  },
  presence::{PresenceRecord, PresenceStatus},
};
use chrono::Utc;
use tokio::sync::watch;

const FEED_CAPACITY: usize = 32;

#[derive(Default)]
pub struct State {
  pub accounts:        HashMap<String, (AuthUser, String)>,
  pub profiles:        Vec<MemberProfile>,
  pub presence:        HashMap<UserId, PresenceRecord>,
  pub directory_feeds: Vec<FeedSender<Vec<MemberProfile>>>,
  pub presence_feeds:  Vec<FeedSender<Vec<PresenceRecord>>>,
  /// Ordered log of platform calls, e.g. `"presence:offline"`, `"sign_out"`.
  pub calls:           Vec<String>,
  pub uploads:         Vec<(UserId, usize)>,
  pub fail_allowlist:  bool,
  pub fail_presence:   bool,
  pub fail_upload:     bool,
}

pub struct FakePlatform {
  allowlist: String,
  state:     Mutex<State>,
  session:   watch::Sender<Option<AuthUser>>,
}

impl FakePlatform {
  pub fn new(allowlist: &str) -> Self {
    let (session, _) = watch::channel(None);
    Self { allowlist: allowlist.to_owned(), state: Mutex::new(State::default()), session }
  }

  pub fn state(&self) -> MutexGuard<'_, State> {
    self.state.lock().expect("fake state poisoned")
  }

  pub fn calls(&self) -> Vec<String> { self.state().calls.clone() }

  pub fn count_calls(&self, name: &str) -> usize {
    self.state().calls.iter().filter(|c| *c == name).count()
  }

  pub fn live_directory_feeds(&self) -> usize {
    self.state().directory_feeds.iter().filter(|f| !f.is_closed()).count()
  }

  pub fn live_presence_feeds(&self) -> usize {
    self.state().presence_feeds.iter().filter(|f| !f.is_closed()).count()
  }

  pub fn profile(&self, id: UserId) -> Option<MemberProfile> {
    self.state().profiles.iter().find(|p| p.user_id == id).cloned()
  }

  pub fn presence_of(&self, id: UserId) -> Option<PresenceStatus> {
    self.state().presence.get(&id).map(|r| r.status)
  }

  /// Seed a member without going through registration.
  pub fn insert_profile(&self, profile: MemberProfile) {
    let mut state = self.state();
    state.profiles.push(profile);
    publish_directory(&mut state);
  }

  /// Push an error to every open directory feed.
  pub fn fail_directory_feeds(&self, message: &str) {
    let state = self.state();
    for feed in &state.directory_feeds {
      feed.try_send(Err(PlatformError::Unavailable(message.to_owned())));
    }
  }

  /// Push an error to every open presence feed.
  pub fn fail_presence_feeds(&self, message: &str) {
    let state = self.state();
    for feed in &state.presence_feeds {
      feed.try_send(Err(PlatformError::Unavailable(message.to_owned())));
    }
  }

  fn require_owner(&self, user_id: UserId) -> PlatformResult<()> {
    match &*self.session.borrow() {
      Some(current) if current.user_id == user_id => Ok(()),
      _ => Err(PlatformError::PermissionDenied),
    }
  }
}

fn directory_snapshot(state: &State) -> Vec<MemberProfile> {
  let mut members = state.profiles.clone();
  members.sort_by(|a, b| a.email.cmp(&b.email));
  members
}

fn presence_snapshot(state: &State) -> Vec<PresenceRecord> {
  let mut records: Vec<_> = state.presence.values().cloned().collect();
  records.sort_by(|a, b| a.email.cmp(&b.email));
  records
}

fn publish_directory(state: &mut State) {
  let snapshot = directory_snapshot(state);
  state.directory_feeds.retain(|f| !f.is_closed());
  for feed in &state.directory_feeds {
    feed.try_send(Ok(snapshot.clone()));
  }
}

fn publish_presence(state: &mut State) {
  let snapshot = presence_snapshot(state);
  state.presence_feeds.retain(|f| !f.is_closed());
  for feed in &state.presence_feeds {
    feed.try_send(Ok(snapshot.clone()));
  }
}

impl AllowlistSource for FakePlatform {
  async fn fetch_allowlist(&self) -> PlatformResult<String> {
    let mut state = self.state();
    state.calls.push("allowlist".into());
    if state.fail_allowlist {
      return Err(PlatformError::Unavailable("allowlist offline".into()));
    }
    Ok(self.allowlist.clone())
  }
}

impl AuthProvider for FakePlatform {
  async fn register(&self, email: &str, password: &str) -> PlatformResult<AuthUser> {
    let user = {
      let mut state = self.state();
      state.calls.push("register".into());
      if state.accounts.contains_key(email) {
        return Err(PlatformError::AlreadyRegistered);
      }
      if password.len() < 6 {
        return Err(PlatformError::WeakPassword(6));
      }
      let user = AuthUser { user_id: UserId::new(), email: email.to_owned() };
      state.accounts.insert(email.to_owned(), (user.clone(), password.to_owned()));
      user
    };
    self.session.send_replace(Some(user.clone()));
    Ok(user)
  }

  async fn sign_in(&self, email: &str, password: &str) -> PlatformResult<AuthUser> {
    let user = {
      let mut state = self.state();
      state.calls.push("sign_in".into());
      match state.accounts.get(email) {
        Some((user, stored)) if stored == password => user.clone(),
        _ => return Err(PlatformError::InvalidCredentials),
      }
    };
    self.session.send_replace(Some(user.clone()));
    Ok(user)
  }

  async fn sign_out(&self) -> PlatformResult<()> {
    self.state().calls.push("sign_out".into());
    self.session.send_replace(None);
    Ok(())
  }

  fn current_user(&self) -> Option<AuthUser> { self.session.borrow().clone() }

  fn session_changes(&self) -> watch::Receiver<Option<AuthUser>> { self.session.subscribe() }
}

impl DocumentStore for FakePlatform {
  async fn get_profile(&self, user_id: UserId) -> PlatformResult<Option<MemberProfile>> {
    self.state().calls.push("get_profile".into());
    Ok(self.profile(user_id))
  }

  async fn create_profile(&self, profile: &MemberProfile) -> PlatformResult<()> {
    self.require_owner(profile.user_id)?;
    let mut state = self.state();
    state.calls.push("create_profile".into());
    state.profiles.retain(|p| p.user_id != profile.user_id);
    state.profiles.push(profile.clone());
    publish_directory(&mut state);
    Ok(())
  }

  async fn merge_profile(&self, user_id: UserId, patch: &ProfilePatch) -> PlatformResult<()> {
    self.require_owner(user_id)?;
    let mut state = self.state();
    state.calls.push("merge_profile".into());
    match state.profiles.iter_mut().find(|p| p.user_id == user_id) {
      Some(existing) => existing.merge(patch),
      None => {
        let mut profile = MemberProfile::new(user_id, &patch.email);
        profile.merge(patch);
        state.profiles.push(profile);
      }
    }
    publish_directory(&mut state);
    Ok(())
  }

  async fn set_presence(&self, user: &AuthUser, status: PresenceStatus) -> PlatformResult<()> {
    let owner = self.require_owner(user.user_id);
    let mut state = self.state();
    state.calls.push(format!("presence:{status}"));
    if state.fail_presence {
      return Err(PlatformError::Unavailable("presence write rejected".into()));
    }
    owner?;
    state.presence.insert(user.user_id, PresenceRecord {
      user_id:   user.user_id,
      email:     user.email.clone(),
      status,
      last_seen: Some(Utc::now()),
    });
    publish_presence(&mut state);
    Ok(())
  }

  fn subscribe_directory(&self) -> Feed<Vec<MemberProfile>> {
    let (tx, feed) = Feed::channel(FEED_CAPACITY);
    let mut state = self.state();
    tx.try_send(Ok(directory_snapshot(&state)));
    state.directory_feeds.push(tx);
    feed
  }

  fn subscribe_presence(&self) -> Feed<Vec<PresenceRecord>> {
    let (tx, feed) = Feed::channel(FEED_CAPACITY);
    let mut state = self.state();
    tx.try_send(Ok(presence_snapshot(&state)));
    state.presence_feeds.push(tx);
    feed
  }
}

impl BlobStore for FakePlatform {
  async fn upload_headshot(
    &self,
    user_id: UserId,
    bytes: &[u8],
    _media_type: &str,
  ) -> PlatformResult<String> {
    let mut state = self.state();
    state.calls.push("upload".into());
    if state.fail_upload {
      return Err(PlatformError::Unavailable("upload rejected".into()));
    }
    state.uploads.push((user_id, bytes.len()));
    Ok(format!("memory://headshots/{user_id}"))
  }
}
