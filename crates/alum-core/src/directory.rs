//! The client-side directory: the cached snapshot and the pure filter over it.

use crate::member::{MemberProfile, UserId};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The full set of member profiles most recently delivered by the directory
/// subscription, in delivery order.
///
/// Replaced wholesale on every update; never patched in place.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
  members: Vec<MemberProfile>,
}

impl DirectorySnapshot {
  pub fn new(members: Vec<MemberProfile>) -> Self { Self { members } }

  pub fn replace(&mut self, members: Vec<MemberProfile>) { self.members = members; }

  pub fn clear(&mut self) { self.members.clear(); }

  pub fn members(&self) -> &[MemberProfile] { &self.members }

  pub fn get(&self, id: UserId) -> Option<&MemberProfile> {
    self.members.iter().find(|m| m.user_id == id)
  }

  pub fn len(&self) -> usize { self.members.len() }

  pub fn is_empty(&self) -> bool { self.members.is_empty() }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// The three search controls. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryFilter {
  /// Case-insensitive substring of the display name.
  pub name:      String,
  /// Compared as text against the stored graduation year.
  pub grad_year: String,
  /// Exact industry tag.
  pub industry:  String,
}

impl DirectoryFilter {
  pub fn is_empty(&self) -> bool {
    self.name.trim().is_empty()
      && self.grad_year.trim().is_empty()
      && self.industry.trim().is_empty()
  }

  pub fn matches(&self, member: &MemberProfile) -> bool {
    self.matches_name(member) && self.matches_year(member) && self.matches_industry(member)
  }

  /// The ordered subsequence of `members` that passes every predicate.
  pub fn apply<'a>(&self, members: &'a [MemberProfile]) -> Vec<&'a MemberProfile> {
    members.iter().filter(|m| self.matches(m)).collect()
  }

  /// Matches against the name as listed, so a nameless member is found by
  /// the email shown in its place.
  fn matches_name(&self, member: &MemberProfile) -> bool {
    let needle = self.name.trim().to_lowercase();
    needle.is_empty() || member.display_name().to_lowercase().contains(&needle)
  }

  fn matches_year(&self, member: &MemberProfile) -> bool {
    let wanted = self.grad_year.trim();
    if wanted.is_empty() {
      return true;
    }
    member
      .grad_year
      .is_some_and(|year| year.to_string() == wanted)
  }

  fn matches_industry(&self, member: &MemberProfile) -> bool {
    let wanted = self.industry.trim();
    wanted.is_empty() || member.has_industry(wanted)
  }
}
