//! Error types for the loadkit library.
//!
//! ## Key Components
//!
//! - [`KeyError`]: Returned when a value that is neither an integer nor a
//!   string is offered as a cache key (floats are the usual offender).
//! - [`BatchError`]: Returned by a batch source that could not produce a
//!   result set for a chunk of keys.
//! - [`ConfigError`]: Returned when loader configuration parameters are
//!   invalid (e.g. a zero batch size).
//! - [`PrimeError`]: Returned by `prime` when a key is already cached and
//!   overwriting was not requested.
//! - [`LoadError`]: What `load`/`load_many` surface — a key problem or a
//!   batch-source problem.
//!
//! ## Example Usage
//!
//! ```
//! use loadkit::builder::LoaderBuilder;
//! use loadkit::error::BatchError;
//! use loadkit::key::Key;
//!
//! // Fallible builder for user-configurable parameters
//! let bad = LoaderBuilder::new(|_keys: &[Key]| -> Result<Vec<u32>, BatchError> { Ok(vec![]) })
//!     .batch_size(0)
//!     .build();
//! assert!(bad.is_err());
//! ```

use std::fmt;

use crate::key::Key;

// ---------------------------------------------------------------------------
// KeyError
// ---------------------------------------------------------------------------

/// Error returned when a value cannot be used as a cache key.
///
/// Keys must be integers or strings. Floats are rejected because float
/// equality makes them unusable as exact map keys; structured values are
/// rejected because they have no canonical hashable form. Carries a
/// human-readable description naming the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyError(String);

impl KeyError {
    /// Creates a new `KeyError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for KeyError {}

// ---------------------------------------------------------------------------
// BatchError
// ---------------------------------------------------------------------------

/// Error returned when a batch source fails to produce a result set.
///
/// Produced by [`BatchSource::load_batch`](crate::traits::BatchSource::load_batch)
/// implementations and surfaced unchanged through whichever `load` or
/// `load_many` call triggered the dispatch. The loader performs no retry or
/// backoff; the affected keys stay buffered and are dispatched again on the
/// next read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError(String);

impl BatchError {
    /// Creates a new `BatchError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for BatchError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when loader configuration parameters are invalid.
///
/// Produced by [`LoaderBuilder::build`](crate::builder::LoaderBuilder::build).
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// PrimeError
// ---------------------------------------------------------------------------

/// Error returned when priming the request cache fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimeError {
    /// The entity's key is already cached and `overwrite` was `false`.
    /// The existing value is left unchanged.
    DuplicateKey(Key),
    /// The key extractor could not derive a key for the entity.
    Key(KeyError),
}

impl fmt::Display for PrimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimeError::DuplicateKey(key) => {
                write!(f, "key {key} is already cached; prime with overwrite to replace it")
            },
            PrimeError::Key(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PrimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrimeError::DuplicateKey(_) => None,
            PrimeError::Key(err) => Some(err),
        }
    }
}

impl From<KeyError> for PrimeError {
    fn from(err: KeyError) -> Self {
        PrimeError::Key(err)
    }
}

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// Error returned by `load`, `load_many`, and `load_now`.
///
/// Reads first normalize their keys and then reconcile the pending buffer
/// against the cache, so either step can fail: a malformed key, or a batch
/// source that refused a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A supplied key, or a key derived from a batch result, was invalid.
    Key(KeyError),
    /// The batch source failed while resolving a chunk of pending keys.
    Batch(BatchError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Key(err) => write!(f, "{err}"),
            LoadError::Batch(err) => write!(f, "batch source failed: {err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Key(err) => Some(err),
            LoadError::Batch(err) => Some(err),
        }
    }
}

impl From<KeyError> for LoadError {
    fn from(err: KeyError) -> Self {
        LoadError::Key(err)
    }
}

impl From<BatchError> for LoadError {
    fn from(err: BatchError) -> Self {
        LoadError::Batch(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
