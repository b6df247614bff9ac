//! Real-time subscriptions over the store.
//!
//! Every write broadcasts the [`Collection`] it touched. Each open feed owns a
//! task that re-runs its query on a matching notification and pushes the full
//! snapshot. The task exits as soon as the subscriber drops its [`Feed`].

use std::future::Future;

use alum_core::platform::{Feed, FeedSender, PlatformError};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::{Result, store::SqlitePlatform};

/// Queued snapshots per feed before the producer waits on the subscriber.
const FEED_CAPACITY: usize = 16;

/// A group of documents a feed can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Collection {
  Profiles,
  Presence,
}

impl SqlitePlatform {
  /// Start a feed that delivers `query` now and again after every write to
  /// `collection`.
  pub(crate) fn spawn_feed<T, F, Fut>(&self, collection: Collection, query: F) -> Feed<T>
  where
    T: Send + 'static,
    F: Fn(SqlitePlatform) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    let (tx, feed) = Feed::channel(FEED_CAPACITY);
    // Subscribe before the first query so no write can slip between them.
    let mut changes = self.changes.subscribe();
    let platform = self.clone();

    tokio::spawn(async move {
      debug!(?collection, "feed opened");
      loop {
        let update = query(platform.clone()).await.map_err(|e| {
          warn!(?collection, error = %e, "feed query failed");
          PlatformError::from(e)
        });
        if !tx.send(update).await {
          break;
        }
        if !wait_for_change(&tx, &mut changes, collection).await {
          break;
        }
      }
      debug!(?collection, "feed closed");
    });

    feed
  }
}

/// Block until `collection` changes. Returns `false` when the feed should
/// shut down.
async fn wait_for_change<T>(
  tx: &FeedSender<T>,
  changes: &mut broadcast::Receiver<Collection>,
  collection: Collection,
) -> bool {
  loop {
    tokio::select! {
      _ = tx.closed() => return false,
      msg = changes.recv() => match msg {
        Ok(changed) if changed == collection => return true,
        Ok(_) => continue,
        // Missed notifications; a fresh snapshot covers them.
        Err(RecvError::Lagged(_)) => return true,
        Err(RecvError::Closed) => return false,
      },
    }
  }
}
