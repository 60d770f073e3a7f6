//! loadkit: request-scoped batching and memoization primitives.
//!
//! Callers register the keys they intend to fetch, and at read time the
//! loader coalesces all pending, not-yet-cached keys into as few batch
//! calls as possible, then serves reads from a cache that lives as long as
//! the loader. This defers individual lookups to a flush point and groups
//! them, which is what kills N+1 fetch patterns.
//!
//! ```
//! use loadkit::builder::LoaderBuilder;
//! use loadkit::error::{BatchError, KeyError};
//! use loadkit::key::Key;
//!
//! #[derive(Debug)]
//! struct Post {
//!     id: i64,
//!     title: &'static str,
//! }
//!
//! // One downstream query per chunk, however many keys were registered.
//! let source = |keys: &[Key]| -> Result<Vec<Post>, BatchError> {
//!     Ok(keys
//!         .iter()
//!         .filter_map(|key| match key {
//!             Key::Int(id) if *id < 100 => Some(Post { id: *id, title: "hello" }),
//!             _ => None,
//!         })
//!         .collect())
//! };
//!
//! let mut posts = LoaderBuilder::new(source)
//!     .key_extractor(|post: &Post, _: Option<usize>| -> Result<Key, KeyError> {
//!         Ok(Key::Int(post.id))
//!     })
//!     .build()
//!     .unwrap();
//!
//! posts.batch([1, 2, 3]).unwrap();
//! let found = posts.load_many([1, 2, 3]).unwrap();
//! assert_eq!(found.len(), 3);
//! assert_eq!(posts.stats().batches, 1);
//! ```

pub mod buffer;
pub mod builder;
pub mod cache;
pub mod error;
pub mod key;
pub mod loader;
pub mod prelude;
pub mod stats;
pub mod traits;
