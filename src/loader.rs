//! Batching loader engine.
//!
//! ## Architecture
//!
//! The loader owns one [`Buffer`] of pending keys and one [`RequestCache`]
//! of resolved entities, and reconciles the two on every read:
//!
//! ```text
//!   batch(keys) ──► Buffer ──┐
//!                            │ deduplicate, subtract cached keys
//!                            ▼
//!                        pending set ──► dequeue(batch_size) chunks
//!                            │                  │
//!                            │          BatchSource::load_batch
//!                            │                  │
//!                            │          KeyExtractor per entity
//!                            ▼                  ▼
//!   load(key) ◄────────── RequestCache ◄─── insert (overwrite)
//! ```
//!
//! One reconcile pass is idempotent: once a key is cached it is excluded
//! from every later diff, so a key is fetched at most once per enqueue.
//!
//! ## Resolution Policy
//!
//! - Keys a batch result does not cover get no tombstone. They leave the
//!   buffer, so later reads answer `None` without another fetch — resolved
//!   absent for this loader's lifetime unless re-enqueued or forgotten.
//! - A failing chunk aborts the read. Merges from earlier chunks are kept
//!   and the buffer is not flushed, so every still-unresolved key is
//!   dispatched again on the next read. No backoff, no retry budget.
//!
//! ## Concurrency
//!
//! Single-threaded and synchronous: every operation completes before it
//! returns, chunks dispatch strictly sequentially, and a hung batch source
//! blocks the read. One loader per logical request; hosts wanting reuse
//! across requests construct one loader per request scope.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::buffer::Buffer;
use crate::cache::RequestCache;
use crate::error::{KeyError, LoadError, PrimeError};
use crate::key::{Key, TryIntoKey};
use crate::stats::LoaderStats;
use crate::traits::{BatchSource, IndexKey, KeyExtractor};

/// Request-scoped batching loader.
///
/// Constructed through [`LoaderBuilder`](crate::builder::LoaderBuilder).
/// The batch source and key extractor are fixed for the loader's lifetime.
///
/// # Example
///
/// ```
/// use loadkit::builder::LoaderBuilder;
/// use loadkit::error::{BatchError, KeyError};
/// use loadkit::key::Key;
///
/// #[derive(Debug)]
/// struct User {
///     id: i64,
///     name: &'static str,
/// }
///
/// let directory = [(1, "Andrew"), (2, "Frank"), (3, "Ken")];
///
/// let source = move |keys: &[Key]| -> Result<Vec<User>, BatchError> {
///     Ok(directory
///         .iter()
///         .filter(|(id, _)| keys.contains(&Key::Int(*id)))
///         .map(|(id, name)| User { id: *id, name })
///         .collect())
/// };
///
/// let by_id = |user: &User, _: Option<usize>| -> Result<Key, KeyError> {
///     Ok(Key::Int(user.id))
/// };
///
/// let mut loader = LoaderBuilder::new(source)
///     .key_extractor(by_id)
///     .batch_size(2)
///     .build()
///     .unwrap();
///
/// let ken = loader.batch([1, 2, 3]).unwrap().load(3).unwrap().unwrap();
/// assert_eq!(ken.name, "Ken");
/// assert_eq!(loader.stats().batches, 2); // [1, 2] then [3]
/// ```
pub struct Loader<S, X = IndexKey>
where
    S: BatchSource,
{
    source: S,
    extractor: X,
    batch_size: usize,
    buffer: Buffer,
    cache: RequestCache<S::Entity>,
    stats: LoaderStats,
}

impl<S, X> Loader<S, X>
where
    S: BatchSource,
    X: KeyExtractor<S::Entity>,
{
    /// Called by the builder once configuration has been validated.
    pub(crate) fn new(source: S, extractor: X, batch_size: usize) -> Self {
        Self {
            source,
            extractor,
            batch_size,
            buffer: Buffer::new(),
            cache: RequestCache::new(),
            stats: LoaderStats::default(),
        }
    }

    /// Registers keys to fetch on the next read.
    ///
    /// Pure with respect to the cache; repeated calls accumulate. Every key
    /// in the call is normalized before any of them is buffered, so a bad
    /// key rejects the whole call and buffers nothing.
    ///
    /// # Example
    ///
    /// ```
    /// # use loadkit::builder::LoaderBuilder;
    /// # use loadkit::error::BatchError;
    /// # use loadkit::key::Key;
    /// # let mut loader = LoaderBuilder::new(
    /// #     |_keys: &[Key]| -> Result<Vec<u32>, BatchError> { Ok(vec![]) },
    /// # ).build().unwrap();
    /// loader.batch([1, 2]).unwrap().batch(["a", "b"]).unwrap();
    /// assert_eq!(loader.buffered(), 4);
    /// ```
    pub fn batch<I>(&mut self, keys: I) -> Result<&mut Self, KeyError>
    where
        I: IntoIterator,
        I::Item: TryIntoKey,
    {
        let normalized = keys
            .into_iter()
            .map(TryIntoKey::try_into_key)
            .collect::<Result<Vec<_>, _>>()?;
        self.buffer.extend(normalized);
        Ok(self)
    }

    /// Registers a single key to fetch on the next read.
    pub fn enqueue(&mut self, key: impl TryIntoKey) -> Result<&mut Self, KeyError> {
        let key = key.try_into_key()?;
        self.buffer.enqueue(key);
        Ok(self)
    }

    /// Loads one entity by key.
    ///
    /// Reconciles the pending buffer first, then answers from the cache.
    /// `None` means the key was never resolved: either never batched, or
    /// batched and absent from the source.
    pub fn load(&mut self, key: impl TryIntoKey) -> Result<Option<Arc<S::Entity>>, LoadError> {
        let key = key.try_into_key()?;
        self.reconcile()?;
        let found = self.cache.get(&key);
        self.record_read(found.is_some());
        Ok(found)
    }

    /// Loads multiple entities by key.
    ///
    /// Reconciles once, then multi-gets. Keys that never resolved are
    /// omitted from the result, not represented by a placeholder.
    pub fn load_many<I>(&mut self, keys: I) -> Result<FxHashMap<Key, Arc<S::Entity>>, LoadError>
    where
        I: IntoIterator,
        I::Item: TryIntoKey,
    {
        let keys = keys
            .into_iter()
            .map(TryIntoKey::try_into_key)
            .collect::<Result<Vec<_>, _>>()?;
        self.reconcile()?;

        let found = self.cache.get_many(&keys);
        let unique: FxHashSet<&Key> = keys.iter().collect();
        self.stats.hits += found.len() as u64;
        self.stats.misses += (unique.len() - found.len()) as u64;
        Ok(found)
    }

    /// Loads one entity by key, enqueueing it first when necessary.
    ///
    /// Eager variant of [`load`](Loader::load): a key that is neither
    /// buffered nor cached is enqueued implicitly, so a fetch is guaranteed
    /// without a prior `batch` call.
    pub fn load_now(&mut self, key: impl TryIntoKey) -> Result<Option<Arc<S::Entity>>, LoadError> {
        let key = key.try_into_key()?;
        if !self.cache.contains(&key) && !self.buffer.contains(&key) {
            self.buffer.enqueue(key.clone());
        }
        self.reconcile()?;
        let found = self.cache.get(&key);
        self.record_read(found.is_some());
        Ok(found)
    }

    /// Writes an entity directly into the cache, bypassing the batch path.
    ///
    /// The entity is keyed by the extractor with no positional index. With
    /// `overwrite` unset, priming an already-cached key fails with
    /// [`PrimeError::DuplicateKey`] and leaves the existing value untouched.
    pub fn prime(&mut self, entity: S::Entity, overwrite: bool) -> Result<&mut Self, PrimeError> {
        let key = self.extractor.cache_key(&entity, None)?;
        if !overwrite && self.cache.contains(&key) {
            return Err(PrimeError::DuplicateKey(key));
        }
        self.cache.insert(key, Arc::new(entity));
        self.stats.primes += 1;
        Ok(self)
    }

    /// Primes every entity from an iterable.
    ///
    /// Fails fast: entities primed before the first failure stay cached.
    pub fn prime_many(
        &mut self,
        entities: impl IntoIterator<Item = S::Entity>,
        overwrite: bool,
    ) -> Result<&mut Self, PrimeError> {
        for entity in entities {
            self.prime(entity, overwrite)?;
        }
        Ok(self)
    }

    /// Removes one entry from the cache. The buffer is untouched.
    ///
    /// A forgotten key re-enters the pending set only when it is enqueued
    /// again via [`batch`](Loader::batch).
    pub fn forget(&mut self, key: impl TryIntoKey) -> Result<&mut Self, KeyError> {
        let key = key.try_into_key()?;
        self.cache.remove(&key);
        Ok(self)
    }

    /// Empties the cache. The buffer is untouched.
    pub fn flush(&mut self) -> &mut Self {
        self.cache.clear();
        self
    }

    /// Read access to the pending-key buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Read access to the request cache.
    pub fn cache(&self) -> &RequestCache<S::Entity> {
        &self.cache
    }

    /// Number of buffered keys, repeats included.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of cached entries.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Maximum keys per batch source invocation.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Snapshot of the loader's activity counters.
    pub fn stats(&self) -> LoaderStats {
        self.stats
    }

    /// Resolves every pending, not-yet-cached key in chunks.
    ///
    /// Idempotent: an empty pending set is a no-op, so calling this on
    /// every read costs one diff. On success the buffer is flushed; on
    /// failure it is left intact so unresolved keys are retried next read.
    fn reconcile(&mut self) -> Result<(), LoadError> {
        let mut pending = self.buffer.deduplicate().diff(|key| self.cache.contains(key));

        while !pending.is_empty() {
            let chunk = pending.dequeue(self.batch_size);
            let entities = self.source.load_batch(&chunk)?;
            self.stats.batches += 1;
            self.stats.keys_dispatched += chunk.len() as u64;

            for (index, entity) in entities.into_iter().enumerate() {
                let key = self.extractor.cache_key(&entity, Some(index))?;
                self.cache.insert(key, Arc::new(entity));
                self.stats.entities_loaded += 1;
            }
        }

        self.buffer.flush();
        Ok(())
    }

    fn record_read(&mut self, hit: bool) {
        if hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
    }
}

impl<S, X> fmt::Debug for Loader<S, X>
where
    S: BatchSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("batch_size", &self.batch_size)
            .field("buffered", &self.buffer.len())
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LoaderBuilder;
    use crate::error::BatchError;

    #[derive(Debug, PartialEq)]
    struct User {
        id: i64,
        name: &'static str,
    }

    const DIRECTORY: [(i64, &str); 4] =
        [(1, "Andrew"), (2, "Frank"), (3, "Ken"), (4, "Julie")];

    fn directory_source() -> impl FnMut(&[Key]) -> Result<Vec<User>, BatchError> {
        |keys: &[Key]| -> Result<Vec<User>, BatchError> {
            Ok(DIRECTORY
                .iter()
                .filter(|(id, _)| keys.contains(&Key::Int(*id)))
                .map(|(id, name)| User { id: *id, name })
                .collect())
        }
    }

    fn by_id(user: &User, _index: Option<usize>) -> Result<Key, KeyError> {
        Ok(Key::Int(user.id))
    }

    fn loader() -> Loader<impl BatchSource<Entity = User>, impl KeyExtractor<User>> {
        LoaderBuilder::new(directory_source())
            .key_extractor(by_id)
            .build()
            .unwrap()
    }

    #[test]
    fn load_answers_from_batch_result() {
        let mut loader = loader();
        let ken = loader.batch([3]).unwrap().load(3).unwrap().unwrap();
        assert_eq!(ken.name, "Ken");
    }

    #[test]
    fn load_without_batch_is_none() {
        let mut loader = loader();
        assert_eq!(loader.load(1).unwrap(), None);
        assert_eq!(loader.stats().batches, 0);
    }

    #[test]
    fn load_now_fetches_without_prior_batch() {
        let mut loader = loader();
        let julie = loader.load_now(4).unwrap().unwrap();
        assert_eq!(julie.name, "Julie");
        assert_eq!(loader.stats().batches, 1);

        // Already cached: no extra enqueue, no extra fetch
        assert!(loader.load_now(4).unwrap().is_some());
        assert_eq!(loader.stats().batches, 1);
    }

    #[test]
    fn prime_then_load_skips_source() {
        let mut loader = loader();
        loader.prime(User { id: 9, name: "Francois" }, false).unwrap();

        let found = loader.load(9).unwrap().unwrap();
        assert_eq!(found.name, "Francois");
        assert_eq!(loader.stats().batches, 0);
        assert_eq!(loader.stats().primes, 1);
    }

    #[test]
    fn prime_duplicate_keeps_existing_value() {
        let mut loader = loader();
        loader.prime(User { id: 9, name: "first" }, false).unwrap();

        let err = loader.prime(User { id: 9, name: "second" }, false).unwrap_err();
        assert_eq!(err, PrimeError::DuplicateKey(Key::Int(9)));
        assert_eq!(loader.load(9).unwrap().unwrap().name, "first");

        loader.prime(User { id: 9, name: "second" }, true).unwrap();
        assert_eq!(loader.load(9).unwrap().unwrap().name, "second");
    }

    #[test]
    fn forget_then_rebatch_refetches() {
        let mut loader = loader();
        loader.batch([1]).unwrap().load(1).unwrap();
        assert_eq!(loader.stats().batches, 1);

        loader.forget(1).unwrap();
        // Forgotten but not re-enqueued: stays unresolved
        assert_eq!(loader.load(1).unwrap(), None);
        assert_eq!(loader.stats().batches, 1);

        loader.batch([1]).unwrap();
        assert!(loader.load(1).unwrap().is_some());
        assert_eq!(loader.stats().batches, 2);
    }

    #[test]
    fn flush_clears_cache_not_buffer() {
        let mut loader = loader();
        loader.batch([1, 2]).unwrap().load(1).unwrap();
        assert_eq!(loader.cached(), 2);

        loader.batch([3]).unwrap();
        loader.flush();
        assert_eq!(loader.cached(), 0);
        assert_eq!(loader.buffered(), 1);
    }

    #[test]
    fn bad_key_rejects_whole_batch_call() {
        let mut loader = loader();
        assert!(loader.batch([3.14]).is_err());
        assert_eq!(loader.buffered(), 0);
    }

    #[test]
    fn mixed_key_types_resolve_independently() {
        let source = |keys: &[Key]| -> Result<Vec<(Key, &'static str)>, BatchError> {
            Ok(keys.iter().map(|key| (key.clone(), "found")).collect())
        };
        let by_key = |entity: &(Key, &'static str), _: Option<usize>| -> Result<Key, KeyError> {
            Ok(entity.0.clone())
        };
        let mut loader = LoaderBuilder::new(source).key_extractor(by_key).build().unwrap();

        loader.batch([Key::Int(7), Key::Str("7".to_string())]).unwrap();
        let found = loader.load_many([Key::Int(7), Key::Str("7".to_string())]).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn extractor_error_surfaces_from_load() {
        let source = |keys: &[Key]| -> Result<Vec<u32>, BatchError> {
            Ok(keys.iter().map(|_| 0_u32).collect())
        };
        let broken = |_: &u32, _: Option<usize>| -> Result<Key, KeyError> {
            Err(KeyError::new("no key for entity"))
        };
        let mut loader = LoaderBuilder::new(source).key_extractor(broken).build().unwrap();

        loader.batch([1]).unwrap();
        let err = loader.load(1).unwrap_err();
        assert!(matches!(err, LoadError::Key(_)));
    }

    #[test]
    fn debug_reports_sizes_not_collaborators() {
        let mut loader = loader();
        loader.batch([1, 2]).unwrap();
        let rendered = format!("{loader:?}");
        assert!(rendered.contains("buffered: 2"));
        assert!(rendered.contains("batch_size: 1000"));
    }
}
