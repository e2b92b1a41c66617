//! Tag vocabulary index and its build-once cache.
//!
//! `TagHashIndex` maps every known tag name to its FNV-1a hash and back.
//! `TagHashCache` owns at most one index, built from the store on first
//! use and rebuilt only through [`TagHashCache::refresh`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use crate::hashing::fnv1a;
use crate::matching::store::MatchStore;

/// Immutable tag name ↔ hash lookup.
#[derive(Debug, Clone, Default)]
pub struct TagHashIndex {
    by_name: HashMap<String, u32>,
    by_hash: HashMap<u32, String>,
}

impl TagHashIndex {
    /// When two names share a hash, reverse lookup returns the later one.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for tag in tags {
            let tag = tag.into();
            let hash = fnv1a(&tag);
            index.by_hash.insert(hash, tag.clone());
            index.by_name.insert(tag, hash);
        }
        index
    }

    pub fn get_hash(&self, tag: &str) -> Option<u32> {
        self.by_name.get(tag).copied()
    }

    pub fn get_tag(&self, hash: u32) -> Option<&str> {
        self.by_hash.get(&hash).map(String::as_str)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_name.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Response body for a single tag lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagHashLookup {
    pub tag: String,
    pub hash: Option<u32>,
    pub known: bool,
    pub vocabulary_size: usize,
}

impl TagHashIndex {
    pub fn lookup(&self, tag: &str) -> TagHashLookup {
        TagHashLookup {
            tag: tag.to_string(),
            hash: self.get_hash(tag),
            known: self.contains(tag),
            vocabulary_size: self.len(),
        }
    }
}

/// Lazily built, explicitly refreshed [`TagHashIndex`].
///
/// Shared through `AppState` as an `Arc<TagHashCache>`. Readers get an
/// `Arc<TagHashIndex>` snapshot and never hold the lock while using it.
#[derive(Debug, Default)]
pub struct TagHashCache {
    index: RwLock<Option<Arc<TagHashIndex>>>,
    builds: AtomicUsize,
}

impl TagHashCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index, building it from `store` if absent.
    ///
    /// Concurrent first callers wait on the write lock; only the first one
    /// to acquire it reads the store.
    pub async fn get(&self, store: &dyn MatchStore) -> Result<Arc<TagHashIndex>, AppError> {
        if let Some(index) = self.index.read().await.as_ref() {
            return Ok(Arc::clone(index));
        }

        let mut slot = self.index.write().await;
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }
        let index = self.build(store).await?;
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Rebuilds from `store` and swaps the new index in.
    ///
    /// Readers holding the previous snapshot keep it until they drop it.
    pub async fn refresh(&self, store: &dyn MatchStore) -> Result<Arc<TagHashIndex>, AppError> {
        let index = self.build(store).await?;
        *self.index.write().await = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Drops the index; the next [`get`](Self::get) rebuilds it.
    pub async fn invalidate(&self) {
        *self.index.write().await = None;
    }

    /// Number of times an index has been built.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    async fn build(&self, store: &dyn MatchStore) -> Result<Arc<TagHashIndex>, AppError> {
        let names = store.all_tag_names().await?;
        let index = TagHashIndex::from_tags(names);
        self.builds.fetch_add(1, Ordering::SeqCst);
        info!(tags = index.len(), "Tag hash index built");
        Ok(Arc::new(index))
    }
}
