//! View state maintained by the controller and read by the renderer.
//!
//! Nothing here draws anything; the terminal UI reads these fields each frame.

use alum_core::{
  directory::{DirectoryFilter, DirectorySnapshot},
  member::{MemberProfile, ProfileDraft, UserId},
  presence::PresenceRecord,
};

pub const DIRECTORY_SIGNED_OUT: &str = "Please log in to see registered users.";
pub const DIRECTORY_EMPTY: &str = "No registered users yet.";
pub const DIRECTORY_ERROR: &str = "Unable to load registered users.";
pub const DIRECTORY_LOADING: &str = "Loading registered users…";

pub const PRESENCE_SIGNED_OUT: &str = "Please log in to see online users.";
pub const PRESENCE_EMPTY: &str = "No users recorded yet.";
pub const PRESENCE_ERROR: &str = "Unable to load presence.";
pub const PRESENCE_LOADING: &str = "Loading presence…";

// ─── Status message ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
  Info,
  Error,
}

/// The single transient message region. A new message replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
  pub text: String,
  pub kind: MessageKind,
}

impl StatusMessage {
  pub fn is_error(&self) -> bool { self.kind == MessageKind::Error }
}

// ─── Directory pane ──────────────────────────────────────────────────────────

/// The member list: snapshot, the current search inputs, and the indices of
/// the snapshot entries that pass them.
#[derive(Debug, Clone, Default)]
pub struct DirectoryPane {
  snapshot: DirectorySnapshot,
  filter:   DirectoryFilter,
  matches:  Vec<usize>,
  /// Shown instead of the list when set.
  pub notice: Option<String>,
}

impl DirectoryPane {
  pub fn snapshot(&self) -> &DirectorySnapshot { &self.snapshot }

  pub fn filter(&self) -> &DirectoryFilter { &self.filter }

  /// Profiles passing the current filter, in snapshot order.
  pub fn visible(&self) -> Vec<&MemberProfile> {
    let members = self.snapshot.members();
    self.matches.iter().filter_map(|&i| members.get(i)).collect()
  }

  pub fn visible_len(&self) -> usize { self.matches.len() }

  pub(crate) fn replace(&mut self, members: Vec<MemberProfile>) {
    self.snapshot.replace(members);
    self.refilter();
  }

  pub(crate) fn clear(&mut self) {
    self.snapshot.clear();
    self.matches.clear();
  }

  pub(crate) fn set_filter(&mut self, filter: DirectoryFilter) {
    self.filter = filter;
    self.refilter();
  }

  pub(crate) fn refilter(&mut self) {
    let filter = &self.filter;
    self.matches = self
      .snapshot
      .members()
      .iter()
      .enumerate()
      .filter(|(_, m)| filter.matches(m))
      .map(|(i, _)| i)
      .collect();
  }
}

// ─── Presence pane ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PresencePane {
  pub records: Vec<PresenceRecord>,
  pub notice:  Option<String>,
}

// ─── View ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct View {
  /// Email shown in the authenticated header; `None` shows the anonymous UI.
  pub signed_in_as: Option<String>,
  pub message:      Option<StatusMessage>,
  pub directory:    DirectoryPane,
  pub presence:     PresencePane,
  /// The signed-in member's editable profile.
  pub profile_form: ProfileDraft,
  /// The signed-in member's stored headshot.
  pub headshot_url: Option<String>,
  /// Member shown in the detail view.
  pub detail:       Option<UserId>,
}

impl View {
  pub(crate) fn signed_out() -> Self {
    let mut view = Self::default();
    view.directory.notice = Some(DIRECTORY_SIGNED_OUT.to_owned());
    view.presence.notice = Some(PRESENCE_SIGNED_OUT.to_owned());
    view
  }

  pub fn is_signed_in(&self) -> bool { self.signed_in_as.is_some() }

  /// The profile currently open in the detail view, if it is still in the
  /// snapshot.
  pub fn detail_member(&self) -> Option<&MemberProfile> {
    self.detail.and_then(|id| self.directory.snapshot().get(id))
  }
}
