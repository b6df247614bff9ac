//! [`SessionPresenceController`] reacts to session changes and owns the two
//! real-time subscriptions plus the presence heartbeat.
//!
//! The controller is driven from a single event loop. It never polls the
//! platform for auth state: the loop forwards each session-changed
//! notification to [`SessionPresenceController::handle_auth_change`], and
//! forwards subscription deliveries obtained from
//! [`SessionPresenceController::next_feed_event`].

use std::sync::Arc;

use alum_core::{
  allowlist::Allowlist,
  member::{MemberProfile, ProfileDraft},
  platform::{AuthUser, DocumentStore, Feed, FeedUpdate, Platform},
  presence::{PresenceRecord, PresenceStatus},
};
use tracing::{debug, info, warn};

use crate::view::{self, MessageKind, StatusMessage, View};

/// A delivery from one of the two subscriptions.
#[derive(Debug)]
pub enum FeedEvent {
  Directory(FeedUpdate<Vec<MemberProfile>>),
  Presence(FeedUpdate<Vec<PresenceRecord>>),
}

pub struct SessionPresenceController<P: Platform> {
  pub(crate) platform:  Arc<P>,
  /// Mirror of the platform session; `None` is the signed-out state.
  pub(crate) user:      Option<AuthUser>,
  pub(crate) allowlist: Option<Allowlist>,
  unload_hook:          bool,
  directory_feed:       Option<Feed<Vec<MemberProfile>>>,
  presence_feed:        Option<Feed<Vec<PresenceRecord>>>,
  pub(crate) view:      View,
}

impl<P: Platform> SessionPresenceController<P> {
  pub fn new(platform: Arc<P>) -> Self {
    Self {
      platform,
      user: None,
      allowlist: None,
      unload_hook: false,
      directory_feed: None,
      presence_feed: None,
      view: View::signed_out(),
    }
  }

  pub fn platform(&self) -> &Arc<P> { &self.platform }

  pub fn view(&self) -> &View { &self.view }

  pub fn current_user(&self) -> Option<&AuthUser> { self.user.as_ref() }

  pub fn is_signed_in(&self) -> bool { self.user.is_some() }

  /// Number of live subscriptions held (0, 1 or 2).
  pub fn active_subscriptions(&self) -> usize {
    usize::from(self.directory_feed.is_some()) + usize::from(self.presence_feed.is_some())
  }

  pub fn unload_hook_registered(&self) -> bool { self.unload_hook }

  // ── Status message ────────────────────────────────────────────────────────

  pub fn show_info(&mut self, text: impl Into<String>) {
    self.view.message = Some(StatusMessage { text: text.into(), kind: MessageKind::Info });
  }

  pub fn show_error(&mut self, text: impl Into<String>) {
    self.view.message = Some(StatusMessage { text: text.into(), kind: MessageKind::Error });
  }

  pub fn clear_message(&mut self) { self.view.message = None; }

  // ── Auth transitions ──────────────────────────────────────────────────────

  /// React to a session-changed notification.
  ///
  /// A repeated notification for the user already signed in is ignored.
  pub async fn handle_auth_change(&mut self, user: Option<AuthUser>) {
    match user {
      Some(user) if self.user.as_ref() == Some(&user) => {
        debug!(user_id = %user.user_id, "session notification for current user; ignoring");
      }
      Some(user) => self.on_signed_in(user).await,
      None => self.on_signed_out(),
    }
  }

  async fn on_signed_in(&mut self, user: AuthUser) {
    info!(user_id = %user.user_id, email = %user.email, "signed in");
    self.user = Some(user.clone());

    self.view.signed_in_as = Some(user.email.clone());
    self.show_info("Signed in.");

    if let Err(e) = self.platform.set_presence(&user, PresenceStatus::Online).await {
      warn!(error = %e, "failed to mark presence online");
      self.show_error(format!("Failed to update presence: {e}"));
    }

    self.register_unload_hook();

    self.start_directory_feed();
    self.start_presence_feed();

    self.load_own_profile(&user).await;
  }

  fn on_signed_out(&mut self) {
    if let Some(user) = self.user.take() {
      info!(user_id = %user.user_id, "signed out");
    }
    self.stop_subscriptions();

    self.view.directory.clear();
    self.view.directory.notice = Some(view::DIRECTORY_SIGNED_OUT.to_owned());
    self.view.presence.records.clear();
    self.view.presence.notice = Some(view::PRESENCE_SIGNED_OUT.to_owned());
    self.view.detail = None;
    self.view.profile_form = ProfileDraft::default();
    self.view.headshot_url = None;

    self.view.signed_in_as = None;
    self.clear_message();
  }

  /// Populate the profile form from the stored profile, read once.
  async fn load_own_profile(&mut self, user: &AuthUser) {
    match self.platform.get_profile(user.user_id).await {
      Ok(Some(profile)) => {
        self.view.profile_form = ProfileDraft::from_profile(&profile);
        self.view.headshot_url = profile.headshot_url;
      }
      Ok(None) => {
        debug!(user_id = %user.user_id, "no stored profile yet");
        self.view.profile_form = ProfileDraft::default();
        self.view.headshot_url = None;
      }
      Err(e) => {
        warn!(error = %e, "failed to load own profile");
        self.show_error(format!("Unable to load your profile: {e}"));
      }
    }
  }

  // ── Sign-out and unload ───────────────────────────────────────────────────

  /// User-initiated sign-out.
  ///
  /// The offline write is awaited before the platform sign-out because the
  /// platform refuses writes from a torn-down session. The signed-out
  /// transition runs here rather than waiting for the `None` notification,
  /// which the session channel may coalesce with a following sign-in.
  pub async fn sign_out(&mut self) {
    let Some(user) = self.platform.current_user() else {
      return;
    };
    self.clear_message();

    mark_offline(self.platform.as_ref(), &user).await;

    match self.platform.sign_out().await {
      Ok(()) => self.on_signed_out(),
      Err(e) => {
        warn!(error = %e, "sign-out failed");
        self.show_error(format!("Sign-out failed: {e}"));
      }
    }
  }

  fn register_unload_hook(&mut self) {
    if self.unload_hook {
      return;
    }
    debug!("unload hook registered");
    self.unload_hook = true;
  }

  /// Process teardown: fire-and-forget the offline write for whoever is
  /// signed in right now. Must be called from within a tokio runtime.
  pub fn page_unload(&self) {
    if !self.unload_hook {
      return;
    }
    let Some(user) = self.platform.current_user() else {
      return;
    };
    let platform = Arc::clone(&self.platform);
    tokio::spawn(async move {
      mark_offline(platform.as_ref(), &user).await;
    });
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  fn start_directory_feed(&mut self) {
    self.stop_directory_feed();
    self.view.directory.notice = Some(view::DIRECTORY_LOADING.to_owned());
    self.directory_feed = Some(self.platform.subscribe_directory());
    debug!("directory subscription started");
  }

  fn start_presence_feed(&mut self) {
    self.stop_presence_feed();
    self.view.presence.notice = Some(view::PRESENCE_LOADING.to_owned());
    self.presence_feed = Some(self.platform.subscribe_presence());
    debug!("presence subscription started");
  }

  fn stop_directory_feed(&mut self) {
    if self.directory_feed.take().is_some() {
      debug!("directory subscription stopped");
    }
  }

  fn stop_presence_feed(&mut self) {
    if self.presence_feed.take().is_some() {
      debug!("presence subscription stopped");
    }
  }

  /// Drop both subscriptions. Calling this with nothing active is a no-op.
  pub fn stop_subscriptions(&mut self) {
    self.stop_directory_feed();
    self.stop_presence_feed();
  }

  /// Wait for the next delivery on either subscription.
  ///
  /// Pends forever while no subscription is active. Cancel-safe, so it can sit
  /// in a `select!` next to other event sources.
  pub async fn next_feed_event(&mut self) -> FeedEvent {
    tokio::select! {
      Some(update) = recv_from(&mut self.directory_feed) => FeedEvent::Directory(update),
      Some(update) = recv_from(&mut self.presence_feed) => FeedEvent::Presence(update),
      else => std::future::pending().await,
    }
  }

  /// Apply every delivery already queued on the subscriptions. Returns how
  /// many were applied.
  pub fn drain_feed_events(&mut self) -> usize {
    let mut applied = 0;
    loop {
      let event = if let Some(update) = self.directory_feed.as_mut().and_then(Feed::try_recv) {
        FeedEvent::Directory(update)
      } else if let Some(update) = self.presence_feed.as_mut().and_then(Feed::try_recv) {
        FeedEvent::Presence(update)
      } else {
        return applied;
      };
      self.apply_feed_event(event);
      applied += 1;
    }
  }

  /// Re-render the affected pane from a subscription delivery.
  pub fn apply_feed_event(&mut self, event: FeedEvent) {
    if self.user.is_none() {
      debug!("dropping feed delivery received while signed out");
      return;
    }
    match event {
      FeedEvent::Directory(Ok(members)) => {
        debug!(count = members.len(), "directory snapshot");
        self.view.directory.notice =
          members.is_empty().then(|| view::DIRECTORY_EMPTY.to_owned());
        self.view.directory.replace(members);
      }
      FeedEvent::Directory(Err(e)) => {
        warn!(error = %e, "directory subscription failed");
        self.view.directory.notice = Some(view::DIRECTORY_ERROR.to_owned());
        self.show_error(format!("Registered users subscription failed: {e}"));
      }
      FeedEvent::Presence(Ok(records)) => {
        debug!(count = records.len(), "presence snapshot");
        self.view.presence.notice =
          records.is_empty().then(|| view::PRESENCE_EMPTY.to_owned());
        self.view.presence.records = records;
      }
      FeedEvent::Presence(Err(e)) => {
        warn!(error = %e, "presence subscription failed");
        self.view.presence.notice = Some(view::PRESENCE_ERROR.to_owned());
        self.show_error(format!("Presence subscription failed: {e}"));
      }
    }
  }
}

async fn recv_from<T>(feed: &mut Option<Feed<T>>) -> Option<FeedUpdate<T>> {
  match feed {
    Some(feed) => feed.recv().await,
    None => std::future::pending().await,
  }
}

/// Best-effort offline heartbeat; failures are logged and swallowed.
async fn mark_offline<P: DocumentStore>(platform: &P, user: &AuthUser) {
  if let Err(e) = platform.set_presence(user, PresenceStatus::Offline).await {
    debug!(user_id = %user.user_id, error = %e, "offline presence write failed");
  }
}
