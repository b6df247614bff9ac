//! Local accounts: argon2 password hashes in the `accounts` table and a
//! process-wide session published on a `watch` channel.

use alum_core::{
  allowlist::normalize_email,
  member::UserId,
  platform::{AuthProvider, AuthUser, PlatformResult},
};
use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::Utc;
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
  Error, Result,
  encode::{decode_user_id, encode_dt, encode_user_id},
  store::SqlitePlatform,
};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, phc: &str) -> Result<()> {
  let parsed = PasswordHash::new(phc).map_err(|e| Error::PasswordHash(e.to_string()))?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| Error::InvalidCredentials)
}

/// Run argon2 work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
  F: FnOnce() -> Result<T> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| Error::PasswordHash(e.to_string()))?
}

impl SqlitePlatform {
  /// Create an account row. Does not touch the session.
  pub async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser> {
    let email = normalize_email(email);
    if password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::WeakPassword(MIN_PASSWORD_LEN));
    }

    let password = password.to_owned();
    let hash = blocking(move || hash_password(&password)).await?;

    let user = AuthUser { user_id: UserId::new(), email: email.clone() };
    let id_str = encode_user_id(user.user_id);
    let at_str = encode_dt(Utc::now());
    let email_param = email.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken: Option<String> = tx
          .query_row(
            "SELECT user_id FROM accounts WHERE email = ?1",
            rusqlite::params![email_param],
            |row| row.get(0),
          )
          .optional()?;
        if taken.is_some() {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO accounts (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email_param, hash, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::AlreadyRegistered(email));
    }
    info!(user_id = %user.user_id, "account created");
    Ok(user)
  }

  /// Check credentials against the stored hash. Does not touch the session.
  pub async fn verify_account(&self, email: &str, password: &str) -> Result<AuthUser> {
    let email = normalize_email(email);
    let email_param = email.clone();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, password_hash FROM accounts WHERE email = ?1",
            rusqlite::params![email_param],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    let Some((id_str, phc)) = row else {
      debug!(%email, "no account for email");
      return Err(Error::InvalidCredentials);
    };

    let password = password.to_owned();
    blocking(move || verify_password(&password, &phc)).await?;

    Ok(AuthUser { user_id: decode_user_id(&id_str)?, email })
  }

  fn publish_session(&self, user: Option<AuthUser>) {
    self.session.send_replace(user);
  }
}

// ─── AuthProvider impl ───────────────────────────────────────────────────────

impl AuthProvider for SqlitePlatform {
  async fn register(&self, email: &str, password: &str) -> PlatformResult<AuthUser> {
    let user = self.create_account(email, password).await?;
    self.publish_session(Some(user.clone()));
    Ok(user)
  }

  async fn sign_in(&self, email: &str, password: &str) -> PlatformResult<AuthUser> {
    let user = self.verify_account(email, password).await?;
    info!(user_id = %user.user_id, "session started");
    self.publish_session(Some(user.clone()));
    Ok(user)
  }

  async fn sign_out(&self) -> PlatformResult<()> {
    if let Some(user) = self.session.borrow().as_ref() {
      info!(user_id = %user.user_id, "session ended");
    }
    self.publish_session(None);
    Ok(())
  }

  fn current_user(&self) -> Option<AuthUser> { self.session.borrow().clone() }

  fn session_changes(&self) -> watch::Receiver<Option<AuthUser>> { self.session.subscribe() }
}
