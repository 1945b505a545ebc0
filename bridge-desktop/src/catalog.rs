//! Static Item Catalog
//!
//! Catalog backed by a fixed item list. Good enough for hosts whose library
//! is known at startup and for wiring the controller in tests and demos.
//! Readiness either holds from construction or is deferred behind an
//! [`IndexingHandle`] so the host can finish a scan first.

use async_trait::async_trait;
use bridge_traits::catalog::MediaCatalog;
use bridge_traits::engine::MediaItem;
use bridge_traits::error::Result;
use rand::seq::SliceRandom;
use tokio::sync::watch;
use tracing::info;

/// Catalog over a fixed list of items.
pub struct StaticCatalog {
    items: Vec<MediaItem>,
    ready_rx: watch::Receiver<bool>,
}

/// Completes a deferred indexing phase. Dropping the handle without calling
/// [`complete`](IndexingHandle::complete) releases waiters too; they will
/// then observe whatever the catalog holds, which for an unfinished scan is
/// simply "nothing playable yet".
pub struct IndexingHandle {
    ready_tx: watch::Sender<bool>,
}

impl IndexingHandle {
    /// Mark indexing as finished and wake everyone blocked in `ready()`.
    pub fn complete(self) {
        let _ = self.ready_tx.send(true);
    }
}

impl StaticCatalog {
    /// Catalog that is ready from construction.
    pub fn new(items: Vec<MediaItem>) -> Self {
        let (_, ready_rx) = watch::channel(true);
        info!(count = items.len(), "static catalog ready");
        Self { items, ready_rx }
    }

    /// Catalog whose readiness is signalled later through the returned
    /// handle.
    pub fn indexing(items: Vec<MediaItem>) -> (Self, IndexingHandle) {
        let (ready_tx, ready_rx) = watch::channel(false);
        (Self { items, ready_rx }, IndexingHandle { ready_tx })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl MediaCatalog for StaticCatalog {
    async fn ready(&self) {
        let mut rx = self.ready_rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    async fn random_item(&self) -> Result<Option<MediaItem>> {
        Ok(self.items.choose(&mut rand::thread_rng()).cloned())
    }
}
