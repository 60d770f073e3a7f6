//! Capability seams for the loader.
//!
//! The loader's only boundary is a pair of injected capabilities, supplied
//! once at construction and invoked repeatedly:
//!
//! | Trait              | Purpose                                        |
//! |--------------------|------------------------------------------------|
//! | [`BatchSource`]    | Resolve a chunk of keys to entities in one call |
//! | [`KeyExtractor`]   | Compute the cache key for a returned entity    |
//!
//! Both have blanket implementations for closures, so simple hosts pass a
//! function and structured hosts (a repository, a query handle) implement
//! the trait on their own type.
//!
//! ## Contract Notes
//!
//! - A batch result need not be ordered like the requested keys, and it may
//!   be smaller: missing keys resolve to not-found.
//! - The extractor sees the entity's positional index within its batch
//!   result, or `None` when the entity is being primed directly.
//!
//! ## Example Usage
//!
//! ```
//! use loadkit::error::{BatchError, KeyError};
//! use loadkit::key::Key;
//! use loadkit::traits::{BatchSource, KeyExtractor};
//!
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! struct UserTable(Vec<User>);
//!
//! impl BatchSource for UserTable {
//!     type Entity = User;
//!
//!     fn load_batch(&mut self, keys: &[Key]) -> Result<Vec<User>, BatchError> {
//!         Ok(self
//!             .0
//!             .iter()
//!             .filter(|user| keys.contains(&Key::Int(user.id)))
//!             .map(|user| User { id: user.id, name: user.name.clone() })
//!             .collect())
//!     }
//! }
//!
//! struct ById;
//!
//! impl KeyExtractor<User> for ById {
//!     fn cache_key(&self, user: &User, _index: Option<usize>) -> Result<Key, KeyError> {
//!         Ok(Key::Int(user.id))
//!     }
//! }
//! ```

use crate::error::{BatchError, KeyError};
use crate::key::Key;

/// The injected batch-load capability.
///
/// Given a chunk of outstanding keys, produce the entities that could be
/// found. Invoked synchronously and sequentially, one chunk at a time; the
/// loader never fans out.
pub trait BatchSource {
    /// The opaque payload a batch resolves to. The loader never inspects it
    /// beyond handing it to the [`KeyExtractor`].
    type Entity;

    /// Resolves `keys` to entities in a single downstream call.
    ///
    /// Ordering is free and a smaller result set is legal. An `Err` aborts
    /// the read that triggered the dispatch; the unresolved keys stay
    /// buffered and are dispatched again on the next read.
    fn load_batch(&mut self, keys: &[Key]) -> Result<Vec<Self::Entity>, BatchError>;
}

impl<V, F> BatchSource for F
where
    F: FnMut(&[Key]) -> Result<Vec<V>, BatchError>,
{
    type Entity = V;

    fn load_batch(&mut self, keys: &[Key]) -> Result<Vec<V>, BatchError> {
        self(keys)
    }
}

/// The injected cache-key capability.
///
/// Used both to key batch results (with the entity's positional index) and
/// to key primed entities (with `index = None`).
pub trait KeyExtractor<V> {
    /// Computes the cache key for `entity`.
    ///
    /// `index` is the entity's position within its batch result, or `None`
    /// when the entity is primed directly into the cache.
    fn cache_key(&self, entity: &V, index: Option<usize>) -> Result<Key, KeyError>;
}

impl<V, F> KeyExtractor<V> for F
where
    F: Fn(&V, Option<usize>) -> Result<Key, KeyError>,
{
    fn cache_key(&self, entity: &V, index: Option<usize>) -> Result<Key, KeyError> {
        self(entity, index)
    }
}

/// Default extractor: key every entity by its positional index.
///
/// Useful when a batch source returns entities in request order and nothing
/// better identifies them; entities with a canonical id field want a
/// caller-supplied extractor instead. Priming through `IndexKey` always
/// fails, because a primed entity has no position, and the error says to
/// supply an extractor.
///
/// # Example
///
/// ```
/// use loadkit::key::Key;
/// use loadkit::traits::{IndexKey, KeyExtractor};
///
/// let extractor = IndexKey;
/// assert_eq!(extractor.cache_key(&"entity", Some(3)).unwrap(), Key::Int(3));
/// assert!(extractor.cache_key(&"entity", None).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexKey;

impl<V> KeyExtractor<V> for IndexKey {
    fn cache_key(&self, _entity: &V, index: Option<usize>) -> Result<Key, KeyError> {
        match index {
            Some(index) => Ok(Key::Int(index as i64)),
            None => Err(KeyError::new(
                "entity has no positional index to key by; supply a key extractor that \
                 derives the key from the entity itself",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_batch_sources() {
        let mut source = |keys: &[Key]| -> Result<Vec<u32>, BatchError> {
            Ok(keys.iter().map(|_| 0_u32).collect())
        };
        let loaded = source.load_batch(&[Key::Int(1), Key::Int(2)]).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn closures_are_key_extractors() {
        let extractor =
            |entity: &u32, _index: Option<usize>| -> Result<Key, KeyError> { Ok(Key::Int(*entity as i64)) };
        assert_eq!(extractor.cache_key(&7, None).unwrap(), Key::Int(7));
    }

    #[test]
    fn index_key_uses_positional_index() {
        assert_eq!(IndexKey.cache_key(&"x", Some(0)).unwrap(), Key::Int(0));
        assert_eq!(IndexKey.cache_key(&"x", Some(41)).unwrap(), Key::Int(41));
    }

    #[test]
    fn index_key_refuses_to_prime() {
        let err = IndexKey.cache_key(&"x", None).unwrap_err();
        assert!(err.message().contains("key extractor"));
    }
}
