//! Convenience re-exports of the crate's public surface.

pub use crate::buffer::Buffer;
pub use crate::builder::{LoaderBuilder, DEFAULT_BATCH_SIZE};
pub use crate::cache::RequestCache;
pub use crate::error::{BatchError, ConfigError, KeyError, LoadError, PrimeError};
pub use crate::key::{Key, TryIntoKey};
pub use crate::loader::Loader;
pub use crate::stats::LoaderStats;
pub use crate::traits::{BatchSource, IndexKey, KeyExtractor};
