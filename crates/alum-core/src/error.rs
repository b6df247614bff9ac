//! Error types for `alum-core`.

use thiserror::Error;

use crate::platform::PlatformError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("This email is not on the alumni allowlist.")]
  NotOnAllowlist(String),

  #[error("Headshot is {size} bytes; the limit is {limit} bytes.")]
  HeadshotTooLarge { size: u64, limit: u64 },

  #[error("Graduation year must be a number.")]
  InvalidGradYear(String),

  #[error("You must be signed in to do that.")]
  NotSignedIn,

  #[error(transparent)]
  Platform(#[from] PlatformError),
}

impl Error {
  /// `true` for errors raised before any platform call was made.
  pub fn is_validation(&self) -> bool {
    !matches!(self, Self::Platform(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
