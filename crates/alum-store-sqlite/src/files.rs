//! File-backed pieces of the platform: headshot blobs and the allowlist.

use std::path::PathBuf;

use alum_core::{
  member::UserId,
  platform::{AllowlistSource, BlobStore, PlatformResult},
};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::{Error, Result, store::SqlitePlatform};

/// Hex digits of the content hash appended to headshot URLs.
const VERSION_LEN: usize = 16;

fn extension_for(media_type: &str) -> &'static str {
  match media_type {
    "image/png" => "png",
    "image/jpeg" => "jpg",
    "image/gif" => "gif",
    "image/webp" => "webp",
    _ => "bin",
  }
}

/// Short content hash, so a replaced headshot gets a new URL.
fn content_version(bytes: &[u8]) -> String {
  let digest = hex::encode(Sha256::digest(bytes));
  digest[..VERSION_LEN].to_owned()
}

impl SqlitePlatform {
  fn headshot_dir(&self) -> PathBuf { self.options.blob_dir.join("headshots") }

  /// Write the headshot to `<blob_dir>/headshots/<user_id>.<ext>`, replacing
  /// any earlier upload for the same user.
  pub async fn store_headshot(
    &self,
    user_id: UserId,
    bytes: &[u8],
    media_type: &str,
  ) -> Result<String> {
    self.require_owner(user_id)?;

    let dir = self.headshot_dir();
    tokio::fs::create_dir_all(&dir).await?;

    let stem = user_id.to_string();
    let mut entries = tokio::fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.file_stem().is_some_and(|s| s == stem.as_str()) {
        debug!(path = %path.display(), "removing previous headshot");
        tokio::fs::remove_file(&path).await?;
      }
    }

    let path = dir.join(format!("{stem}.{}", extension_for(media_type)));
    tokio::fs::write(&path, bytes).await?;
    let path = tokio::fs::canonicalize(&path).await?;

    info!(%user_id, size = bytes.len(), "headshot stored");
    Ok(format!("file://{}?v={}", path.display(), content_version(bytes)))
  }

  pub async fn read_allowlist(&self) -> Result<String> {
    let path = &self.options.allowlist_path;
    tokio::fs::read_to_string(path)
      .await
      .map_err(|e| Error::AllowlistUnavailable(format!("{}: {e}", path.display())))
  }
}

impl BlobStore for SqlitePlatform {
  async fn upload_headshot(
    &self,
    user_id: UserId,
    bytes: &[u8],
    media_type: &str,
  ) -> PlatformResult<String> {
    Ok(self.store_headshot(user_id, bytes, media_type).await?)
  }
}

impl AllowlistSource for SqlitePlatform {
  async fn fetch_allowlist(&self) -> PlatformResult<String> {
    Ok(self.read_allowlist().await?)
  }
}
