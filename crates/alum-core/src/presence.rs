//! Presence records: one per member, last write wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::member::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
  Online,
  #[default]
  Offline,
}

impl PresenceStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Online => "online",
      Self::Offline => "offline",
    }
  }
}

impl std::fmt::Display for PresenceStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The stored presence document for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
  pub user_id:   UserId,
  pub email:     String,
  pub status:    PresenceStatus,
  /// Assigned by the platform when the record was written.
  pub last_seen: Option<DateTime<Utc>>,
}

impl PresenceRecord {
  pub fn is_online(&self) -> bool { self.status == PresenceStatus::Online }
}
