//! Member profiles, the documents that make up the directory.
//!
//! A profile is created with empty optional fields when an account is
//! registered and is afterwards only changed by its owner through a
//! merge-write ([`ProfilePatch`]). Profiles are never deleted.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Largest headshot accepted for upload: 5 MiB.
pub const HEADSHOT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// The industry checkboxes offered on the profile form, in display order.
pub const INDUSTRIES: &[&str] = &[
  "Consulting",
  "Education",
  "Engineering",
  "Finance",
  "Government",
  "Healthcare",
  "Law",
  "Media",
  "Nonprofit",
  "Technology",
];

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque account identifier assigned by the platform.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for UserId {
  fn default() -> Self { Self::new() }
}

impl From<Uuid> for UserId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.hyphenated().fmt(f)
  }
}

impl FromStr for UserId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self(Uuid::parse_str(s)?)) }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// A member's directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
  pub user_id:      UserId,
  /// Lowercase-normalised; unique across the directory.
  pub email:        String,
  pub name:         String,
  pub grad_year:    Option<i32>,
  /// Ordered, duplicate-free. A free-text "Other" entry comes last.
  pub industries:   Vec<String>,
  pub bio:          String,
  /// `None` means the UI shows a placeholder image.
  pub headshot_url: Option<String>,
}

impl MemberProfile {
  /// The profile written at registration time: everything but the identity
  /// is empty.
  pub fn new(user_id: UserId, email: &str) -> Self {
    Self {
      user_id,
      email: crate::allowlist::normalize_email(email),
      name: String::new(),
      grad_year: None,
      industries: Vec::new(),
      bio: String::new(),
      headshot_url: None,
    }
  }

  /// Name for list display; falls back to the email when no name is set.
  pub fn display_name(&self) -> &str {
    if self.name.trim().is_empty() { &self.email } else { &self.name }
  }

  pub fn has_industry(&self, tag: &str) -> bool {
    self.industries.iter().any(|i| i == tag)
  }

  /// Apply a merge-write to this profile.
  pub fn merge(&mut self, patch: &ProfilePatch) {
    self.name = patch.name.clone();
    self.grad_year = patch.grad_year;
    self.industries = patch.industries.clone();
    self.bio = patch.bio.clone();
    if let Some(url) = &patch.headshot_url {
      self.headshot_url = Some(url.clone());
    }
  }
}

/// The fields a profile save writes.
///
/// `headshot_url: None` leaves the stored headshot untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
  pub email:        String,
  pub name:         String,
  pub grad_year:    Option<i32>,
  pub industries:   Vec<String>,
  pub bio:          String,
  pub headshot_url: Option<String>,
}

// ─── Form mapping ────────────────────────────────────────────────────────────

/// Raw profile-form input as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
  pub name:           String,
  pub grad_year:      String,
  /// Checked entries from [`INDUSTRIES`].
  pub industries:     Vec<String>,
  pub other_industry: String,
  pub bio:            String,
}

impl ProfileDraft {
  /// Pre-fill the form from a stored profile.
  ///
  /// Tags outside [`INDUSTRIES`] go into the "Other" field; only the last
  /// such tag survives because the form has a single free-text slot.
  pub fn from_profile(profile: &MemberProfile) -> Self {
    let (known, other): (Vec<_>, Vec<_>) = profile
      .industries
      .iter()
      .cloned()
      .partition(|tag| INDUSTRIES.contains(&tag.as_str()));

    Self {
      name:           profile.name.clone(),
      grad_year:      profile.grad_year.map(|y| y.to_string()).unwrap_or_default(),
      industries:     known,
      other_industry: other.into_iter().last().unwrap_or_default(),
      bio:            profile.bio.clone(),
    }
  }

  pub fn toggle_industry(&mut self, tag: &str) {
    if let Some(pos) = self.industries.iter().position(|t| t == tag) {
      self.industries.remove(pos);
    } else {
      self.industries.push(tag.to_owned());
    }
  }

  /// Validate the draft and turn it into a merge-write for `email`.
  pub fn to_patch(&self, email: &str) -> Result<ProfilePatch> {
    Ok(ProfilePatch {
      email:        email.to_owned(),
      name:         self.name.trim().to_owned(),
      grad_year:    parse_grad_year(&self.grad_year)?,
      industries:   self.collect_industries(),
      bio:          self.bio.trim().to_owned(),
      headshot_url: None,
    })
  }

  /// Checked tags in [`INDUSTRIES`] order, then the trimmed "Other" value.
  fn collect_industries(&self) -> Vec<String> {
    let mut tags: Vec<String> = INDUSTRIES
      .iter()
      .filter(|known| self.industries.iter().any(|t| t == *known))
      .map(|known| (*known).to_owned())
      .collect();

    let other = self.other_industry.trim();
    if !other.is_empty() && !tags.iter().any(|t| t == other) {
      tags.push(other.to_owned());
    }
    tags
  }
}

/// Empty input means "unset"; anything else must be a plausible year.
pub fn parse_grad_year(input: &str) -> Result<Option<i32>> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  match trimmed.parse::<i32>() {
    Ok(year) if (1000..=9999).contains(&year) => Ok(Some(year)),
    _ => Err(Error::InvalidGradYear(trimmed.to_owned())),
  }
}

// ─── Headshot ────────────────────────────────────────────────────────────────

/// A picked headshot file, not yet uploaded.
#[derive(Debug, Clone)]
pub struct HeadshotUpload {
  pub bytes:      Vec<u8>,
  pub media_type: String,
}

impl HeadshotUpload {
  pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
    Self { bytes, media_type: media_type.into() }
  }

  pub fn len(&self) -> u64 { self.bytes.len() as u64 }

  pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

  /// Reject files over [`HEADSHOT_MAX_BYTES`] before anything is uploaded.
  pub fn check_size(&self) -> Result<()> {
    let size = self.len();
    if size > HEADSHOT_MAX_BYTES {
      return Err(Error::HeadshotTooLarge { size, limit: HEADSHOT_MAX_BYTES });
    }
    Ok(())
  }

  /// Guess a media type from a file extension; unknown extensions map to
  /// `application/octet-stream`.
  pub fn media_type_for(path: &std::path::Path) -> &'static str {
    match path
      .extension()
      .and_then(|e| e.to_str())
      .map(str::to_ascii_lowercase)
      .as_deref()
    {
      Some("jpg" | "jpeg") => "image/jpeg",
      Some("png") => "image/png",
      Some("gif") => "image/gif",
      Some("webp") => "image/webp",
      _ => "application/octet-stream",
    }
  }
}
