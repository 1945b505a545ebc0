//! Item Catalog Abstraction
//!
//! The catalog is the external source of playable items. It indexes its
//! backing store asynchronously after construction and becomes ready exactly
//! once per process lifetime.

use crate::engine::MediaItem;
use crate::error::Result;

/// Interface to the external item catalog.
#[async_trait::async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Resolves once the backing catalog has finished indexing. Callable any
    /// number of times; resolves immediately once indexing is complete.
    async fn ready(&self);

    /// Pick one item at random. `None` means the catalog is empty.
    async fn random_item(&self) -> Result<Option<MediaItem>>;
}
