//! [`SqlitePlatform`], the SQLite implementation of the alum platform
//! traits. This module holds the connection, the profile and presence
//! documents, and the [`DocumentStore`] impl; accounts, feeds and files live
//! in sibling modules.

use std::{path::{Path, PathBuf}, sync::Arc};

use alum_core::{
  member::{MemberProfile, ProfilePatch, UserId},
  platform::{AuthUser, DocumentStore, Feed, PlatformResult},
  presence::{PresenceRecord, PresenceStatus},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{
    PRESENCE_COLUMNS, PROFILE_COLUMNS, RawPresence, RawProfile, encode_dt,
    encode_industries, encode_status, encode_user_id,
  },
  feeds::Collection,
  schema::SCHEMA,
};

/// Capacity of the change-notification broadcast.
const CHANGE_CAPACITY: usize = 64;

/// File locations used alongside the database.
#[derive(Debug, Clone)]
pub struct StoreOptions {
  /// Root for uploaded headshots.
  pub blob_dir:       PathBuf,
  /// Newline-delimited list of emails allowed to register.
  pub allowlist_path: PathBuf,
}

// ─── Platform ────────────────────────────────────────────────────────────────

/// An alum platform backed by a single SQLite file.
///
/// Clones share the connection, the session and the change channels.
#[derive(Clone)]
pub struct SqlitePlatform {
  pub(crate) conn:    tokio_rusqlite::Connection,
  pub(crate) session: Arc<watch::Sender<Option<AuthUser>>>,
  pub(crate) changes: broadcast::Sender<Collection>,
  pub(crate) options: Arc<StoreOptions>,
}

impl SqlitePlatform {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn, options).await
  }

  /// Open an in-memory store.
  pub async fn open_in_memory(options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn, options).await
  }

  async fn with_connection(
    conn: tokio_rusqlite::Connection,
    options: StoreOptions,
  ) -> Result<Self> {
    let (session, _) = watch::channel(None);
    let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
    let platform = Self {
      conn,
      session: Arc::new(session),
      changes,
      options: Arc::new(options),
    };
    platform.init_schema().await?;
    Ok(platform)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Writes are only accepted for documents owned by the session user.
  pub(crate) fn require_owner(&self, user_id: UserId) -> Result<()> {
    match &*self.session.borrow() {
      Some(current) if current.user_id == user_id => Ok(()),
      _ => Err(Error::PermissionDenied),
    }
  }

  /// Tell every subscriber of `collection` to re-query.
  pub(crate) fn notify(&self, collection: Collection) {
    // No receivers just means no open subscriptions.
    let _ = self.changes.send(collection);
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  pub async fn load_profile(&self, user_id: UserId) -> Result<Option<MemberProfile>> {
    let id_str = encode_user_id(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
            rusqlite::params![id_str],
            RawProfile::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  /// All profiles ordered by email.
  pub async fn list_profiles(&self) -> Result<Vec<MemberProfile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY email"))?;
        let rows = stmt
          .query_map([], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  pub async fn insert_profile(&self, profile: &MemberProfile) -> Result<()> {
    self.require_owner(profile.user_id)?;

    let id_str       = encode_user_id(profile.user_id);
    let email        = profile.email.clone();
    let name         = profile.name.clone();
    let grad_year    = profile.grad_year;
    let industries   = encode_industries(&profile.industries)?;
    let bio          = profile.bio.clone();
    let headshot_url = profile.headshot_url.clone();
    let at_str       = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             user_id, email, name, grad_year, industries, bio, headshot_url, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, email, name, grad_year, industries, bio, headshot_url, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.notify(Collection::Profiles);
    Ok(())
  }

  /// Upsert the owner's profile. A `None` headshot keeps the stored one.
  pub async fn upsert_profile(&self, user_id: UserId, patch: &ProfilePatch) -> Result<()> {
    self.require_owner(user_id)?;

    let id_str       = encode_user_id(user_id);
    let email        = patch.email.clone();
    let name         = patch.name.clone();
    let grad_year    = patch.grad_year;
    let industries   = encode_industries(&patch.industries)?;
    let bio          = patch.bio.clone();
    let headshot_url = patch.headshot_url.clone();
    let at_str       = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             user_id, email, name, grad_year, industries, bio, headshot_url, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(user_id) DO UPDATE SET
             email        = excluded.email,
             name         = excluded.name,
             grad_year    = excluded.grad_year,
             industries   = excluded.industries,
             bio          = excluded.bio,
             headshot_url = COALESCE(excluded.headshot_url, profiles.headshot_url),
             updated_at   = excluded.updated_at",
          rusqlite::params![
            id_str, email, name, grad_year, industries, bio, headshot_url, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.notify(Collection::Profiles);
    Ok(())
  }

  // ── Presence ──────────────────────────────────────────────────────────────

  /// All presence records ordered by email.
  pub async fn list_presence(&self) -> Result<Vec<PresenceRecord>> {
    let raws: Vec<RawPresence> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PRESENCE_COLUMNS} FROM presence ORDER BY email"))?;
        let rows = stmt
          .query_map([], RawPresence::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPresence::into_record).collect()
  }

  /// Overwrite the presence record, stamping `last_seen` with the store's
  /// clock.
  pub async fn write_presence(&self, user: &AuthUser, status: PresenceStatus) -> Result<()> {
    self.require_owner(user.user_id)?;

    let id_str     = encode_user_id(user.user_id);
    let email      = user.email.clone();
    let status_str = encode_status(status);
    let at_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO presence (user_id, email, status, last_seen)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(user_id) DO UPDATE SET
             email     = excluded.email,
             status    = excluded.status,
             last_seen = excluded.last_seen",
          rusqlite::params![id_str, email, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(user_id = %user.user_id, %status, "presence written");
    self.notify(Collection::Presence);
    Ok(())
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqlitePlatform {
  async fn get_profile(&self, user_id: UserId) -> PlatformResult<Option<MemberProfile>> {
    Ok(self.load_profile(user_id).await?)
  }

  async fn create_profile(&self, profile: &MemberProfile) -> PlatformResult<()> {
    Ok(self.insert_profile(profile).await?)
  }

  async fn merge_profile(&self, user_id: UserId, patch: &ProfilePatch) -> PlatformResult<()> {
    Ok(self.upsert_profile(user_id, patch).await?)
  }

  async fn set_presence(&self, user: &AuthUser, status: PresenceStatus) -> PlatformResult<()> {
    Ok(self.write_presence(user, status).await?)
  }

  fn subscribe_directory(&self) -> Feed<Vec<MemberProfile>> {
    self.spawn_feed(Collection::Profiles, |platform| async move {
      platform.list_profiles().await
    })
  }

  fn subscribe_presence(&self) -> Feed<Vec<PresenceRecord>> {
    self.spawn_feed(Collection::Presence, |platform| async move {
      platform.list_presence().await
    })
  }
}
