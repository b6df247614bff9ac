//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, user ids are hyphenated lowercase UUIDs,
//! and industry tags are a compact JSON array.

use alum_core::{
  member::{MemberProfile, UserId},
  presence::{PresenceRecord, PresenceStatus},
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── UserId ──────────────────────────────────────────────────────────────────

pub fn encode_user_id(id: UserId) -> String { id.to_string() }

pub fn decode_user_id(s: &str) -> Result<UserId> { Ok(s.parse()?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PresenceStatus ──────────────────────────────────────────────────────────

pub fn encode_status(status: PresenceStatus) -> &'static str { status.as_str() }

pub fn decode_status(s: &str) -> Result<PresenceStatus> {
  match s {
    "online" => Ok(PresenceStatus::Online),
    "offline" => Ok(PresenceStatus::Offline),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Industries ──────────────────────────────────────────────────────────────

pub fn encode_industries(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_industries(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str =
  "user_id, email, name, grad_year, industries, bio, headshot_url";

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:      String,
  pub email:        String,
  pub name:         String,
  pub grad_year:    Option<i32>,
  pub industries:   String,
  pub bio:          String,
  pub headshot_url: Option<String>,
}

impl RawProfile {
  /// Read a row selected with [`PROFILE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      email:        row.get(1)?,
      name:         row.get(2)?,
      grad_year:    row.get(3)?,
      industries:   row.get(4)?,
      bio:          row.get(5)?,
      headshot_url: row.get(6)?,
    })
  }

  pub fn into_profile(self) -> Result<MemberProfile> {
    Ok(MemberProfile {
      user_id:      decode_user_id(&self.user_id)?,
      email:        self.email,
      name:         self.name,
      grad_year:    self.grad_year,
      industries:   decode_industries(&self.industries)?,
      bio:          self.bio,
      headshot_url: self.headshot_url,
    })
  }
}

pub const PRESENCE_COLUMNS: &str = "user_id, email, status, last_seen";

/// Raw values read directly from a `presence` row.
pub struct RawPresence {
  pub user_id:   String,
  pub email:     String,
  pub status:    String,
  pub last_seen: String,
}

impl RawPresence {
  /// Read a row selected with [`PRESENCE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:   row.get(0)?,
      email:     row.get(1)?,
      status:    row.get(2)?,
      last_seen: row.get(3)?,
    })
  }

  pub fn into_record(self) -> Result<PresenceRecord> {
    Ok(PresenceRecord {
      user_id:   decode_user_id(&self.user_id)?,
      email:     self.email,
      status:    decode_status(&self.status)?,
      last_seen: Some(decode_dt(&self.last_seen)?),
    })
  }
}
