//! Error type for `alum-store-sqlite`.

use alum_core::platform::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown presence status: {0:?}")]
  UnknownStatus(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("account already exists: {0}")]
  AlreadyRegistered(String),

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("password must be at least {0} characters")]
  WeakPassword(usize),

  /// The write targets a document the current session does not own, or
  /// there is no session at all.
  #[error("permission denied")]
  PermissionDenied,

  #[error("allowlist unavailable: {0}")]
  AllowlistUnavailable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for PlatformError {
  fn from(e: Error) -> Self {
    match e {
      Error::AlreadyRegistered(_) => PlatformError::AlreadyRegistered,
      Error::InvalidCredentials => PlatformError::InvalidCredentials,
      Error::WeakPassword(min) => PlatformError::WeakPassword(min),
      Error::PermissionDenied => PlatformError::PermissionDenied,
      Error::AllowlistUnavailable(msg) => PlatformError::Unavailable(msg),
      other => PlatformError::Backend(Box::new(other)),
    }
  }
}
