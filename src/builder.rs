//! Loader builder.
//!
//! Provides the one construction path for [`Loader`]: a batch source is
//! required, the key extractor and batch size have defaults, and `build()`
//! validates the configuration before the loader exists.
//!
//! ## Example
//!
//! ```rust
//! use loadkit::builder::LoaderBuilder;
//! use loadkit::error::BatchError;
//! use loadkit::key::Key;
//!
//! let mut loader = LoaderBuilder::new(|keys: &[Key]| -> Result<Vec<String>, BatchError> {
//!     Ok(keys.iter().map(|key| key.to_string()).collect())
//! })
//! .batch_size(100)
//! .build()
//! .unwrap();
//!
//! loader.batch([1, 2, 3]).unwrap();
//! assert_eq!(loader.buffered(), 3);
//! ```

use crate::error::ConfigError;
use crate::loader::Loader;
use crate::traits::{BatchSource, IndexKey, KeyExtractor};

/// Default maximum number of keys per batch source invocation.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Builder for [`Loader`] instances.
pub struct LoaderBuilder<S, X = IndexKey> {
    source: S,
    extractor: X,
    batch_size: usize,
}

impl<S> LoaderBuilder<S, IndexKey>
where
    S: BatchSource,
{
    /// Starts a builder around the given batch source.
    ///
    /// Defaults: [`IndexKey`] extraction and a batch size of
    /// [`DEFAULT_BATCH_SIZE`].
    pub fn new(source: S) -> Self {
        Self {
            source,
            extractor: IndexKey,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl<S, X> LoaderBuilder<S, X>
where
    S: BatchSource,
{
    /// Sets the maximum number of keys per batch source invocation.
    ///
    /// Must be at least 1; [`build`](LoaderBuilder::build) rejects 0.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Replaces the key extractor.
    ///
    /// Entities with a canonical identifier field should be keyed by it
    /// rather than by the default positional index.
    pub fn key_extractor<X2>(self, extractor: X2) -> LoaderBuilder<S, X2>
    where
        X2: KeyExtractor<S::Entity>,
    {
        LoaderBuilder {
            source: self.source,
            extractor,
            batch_size: self.batch_size,
        }
    }

    /// Validates the configuration and constructs the loader.
    ///
    /// # Example
    ///
    /// ```
    /// use loadkit::builder::LoaderBuilder;
    /// use loadkit::error::BatchError;
    /// use loadkit::key::Key;
    ///
    /// let err = LoaderBuilder::new(|_keys: &[Key]| -> Result<Vec<u32>, BatchError> { Ok(vec![]) })
    ///     .batch_size(0)
    ///     .build()
    ///     .unwrap_err();
    /// assert!(err.to_string().contains("batch_size"));
    /// ```
    pub fn build(self) -> Result<Loader<S, X>, ConfigError>
    where
        X: KeyExtractor<S::Entity>,
    {
        if self.batch_size == 0 {
            return Err(ConfigError::new("batch_size must be >= 1, 0 found"));
        }
        Ok(Loader::new(self.source, self.extractor, self.batch_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchError;
    use crate::key::Key;

    fn echo_source() -> impl FnMut(&[Key]) -> Result<Vec<u32>, BatchError> {
        |keys: &[Key]| -> Result<Vec<u32>, BatchError> {
            Ok((0..keys.len() as u32).collect())
        }
    }

    #[test]
    fn defaults_apply() {
        let loader = LoaderBuilder::new(echo_source()).build().unwrap();
        assert_eq!(loader.batch_size(), DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn batch_size_is_configurable() {
        let loader = LoaderBuilder::new(echo_source()).batch_size(3).build().unwrap();
        assert_eq!(loader.batch_size(), 3);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = LoaderBuilder::new(echo_source()).batch_size(0).build().unwrap_err();
        assert!(err.message().contains("batch_size"));
    }

    #[test]
    fn custom_extractor_is_used() {
        let double = |entity: &u32, _: Option<usize>| -> Result<Key, crate::error::KeyError> {
            Ok(Key::Int(*entity as i64 * 2))
        };
        let mut loader = LoaderBuilder::new(echo_source()).key_extractor(double).build().unwrap();

        loader.batch([0]).unwrap();
        // One pending key; echo source returns entity 0, keyed as 0 * 2
        assert!(loader.load(0).unwrap().is_some());
    }
}
