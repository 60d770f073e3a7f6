//! Tagged cache keys and the storage codec.
//!
//! ## Architecture
//! - [`Key`] is a tagged variant (`Int` | `Str`) so integer and string keys
//!   can share one buffer and one cache without numeric-string coercion.
//! - [`TryIntoKey`] is the normalization seam: the types a caller may hand
//!   to `batch`/`load` convert through it, and unsupported key shapes are
//!   rejected there with a [`KeyError`].
//! - The storage codec (`storage_key` / `from_storage`) gives every key a
//!   flat, collision-free string form for hosts that persist or log keys.
//!
//! ## Key Rules
//! - Integers and strings are accepted as-is.
//! - Floats are rejected: float equality makes them unusable as exact map
//!   keys. `2.0` and `2` are different keys in spirit even when numerically
//!   equal, and NaN never equals itself.
//! - `Key::Int(7)` and `Key::Str("7")` are distinct keys. Ordering is total:
//!   all integer keys sort before all string keys.
//!
//! ## Example Usage
//! ```
//! use loadkit::key::{Key, TryIntoKey};
//!
//! let a: Key = 42.try_into_key().unwrap();
//! let b: Key = "alpha".try_into_key().unwrap();
//! assert_eq!(a, Key::Int(42));
//! assert_eq!(b, Key::Str("alpha".to_string()));
//!
//! // Floats never normalize
//! assert!(3.14_f64.try_into_key().is_err());
//!
//! // Storage round-trip is loss-free
//! assert_eq!(Key::from_storage(&a.storage_key()).unwrap(), a);
//! ```

use std::fmt;

use crate::error::KeyError;

/// A cache key: an integer or a string identifying one entity.
///
/// Derived `Ord` gives the total ordering the buffer and cache rely on:
/// integers first (by value), then strings (lexicographic). Equality and
/// hashing never coerce across the two variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(String),
}

impl Key {
    /// Encodes the key into its flat storage form.
    ///
    /// Integer keys encode as `i:<value>`, string keys as `s:<value>`. The
    /// tag prefix keeps `Key::Int(7)` and `Key::Str("7")` collision-free,
    /// and [`from_storage`](Key::from_storage) inverts the encoding exactly.
    ///
    /// # Example
    ///
    /// ```
    /// use loadkit::key::Key;
    ///
    /// assert_eq!(Key::Int(42).storage_key(), "i:42");
    /// assert_eq!(Key::Str("alpha".into()).storage_key(), "s:alpha");
    /// ```
    pub fn storage_key(&self) -> String {
        match self {
            Key::Int(value) => format!("i:{value}"),
            Key::Str(value) => format!("s:{value}"),
        }
    }

    /// Decodes a key from its storage form.
    ///
    /// Loss-free inverse of [`storage_key`](Key::storage_key). Fails with a
    /// [`KeyError`] when the tag is unknown or the integer payload does not
    /// parse.
    ///
    /// # Example
    ///
    /// ```
    /// use loadkit::key::Key;
    ///
    /// assert_eq!(Key::from_storage("i:42").unwrap(), Key::Int(42));
    /// assert_eq!(Key::from_storage("s:7").unwrap(), Key::Str("7".into()));
    /// assert!(Key::from_storage("42").is_err());
    /// ```
    pub fn from_storage(storage: &str) -> Result<Self, KeyError> {
        match storage.split_once(':') {
            Some(("i", payload)) => payload
                .parse::<i64>()
                .map(Key::Int)
                .map_err(|_| KeyError::new(format!("malformed integer storage key `{storage}`"))),
            Some(("s", payload)) => Ok(Key::Str(payload.to_string())),
            _ => Err(KeyError::new(format!(
                "malformed storage key `{storage}`, expected an `i:` or `s:` prefix"
            ))),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(value) => write!(f, "{value}"),
            Key::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

/// Fallible normalization into a [`Key`].
///
/// This is the point of entry for caller-supplied key values: integer and
/// string types normalize losslessly, while float types always fail with a
/// descriptive [`KeyError`]. Anything else simply does not implement the
/// trait.
///
/// # Example
///
/// ```
/// use loadkit::key::{Key, TryIntoKey};
///
/// assert_eq!(7_u32.try_into_key().unwrap(), Key::Int(7));
/// assert_eq!("id".to_string().try_into_key().unwrap(), Key::Str("id".into()));
/// assert!(1.5_f32.try_into_key().is_err());
/// ```
pub trait TryIntoKey {
    /// Normalizes `self` into a [`Key`], or explains why it cannot be one.
    fn try_into_key(self) -> Result<Key, KeyError>;
}

impl TryIntoKey for Key {
    fn try_into_key(self) -> Result<Key, KeyError> {
        Ok(self)
    }
}

impl TryIntoKey for &Key {
    fn try_into_key(self) -> Result<Key, KeyError> {
        Ok(self.clone())
    }
}

macro_rules! impl_try_into_key_for_int {
    ($($ty:ty),*) => {
        $(
            impl TryIntoKey for $ty {
                fn try_into_key(self) -> Result<Key, KeyError> {
                    Ok(Key::Int(self as i64))
                }
            }
        )*
    };
}

impl_try_into_key_for_int!(i8, i16, i32, i64, u8, u16, u32);

impl TryIntoKey for u64 {
    fn try_into_key(self) -> Result<Key, KeyError> {
        i64::try_from(self)
            .map(Key::Int)
            .map_err(|_| KeyError::new(format!("integer key {self} is out of range for i64")))
    }
}

impl TryIntoKey for usize {
    fn try_into_key(self) -> Result<Key, KeyError> {
        i64::try_from(self)
            .map(Key::Int)
            .map_err(|_| KeyError::new(format!("integer key {self} is out of range for i64")))
    }
}

impl TryIntoKey for &str {
    fn try_into_key(self) -> Result<Key, KeyError> {
        Ok(Key::Str(self.to_string()))
    }
}

impl TryIntoKey for String {
    fn try_into_key(self) -> Result<Key, KeyError> {
        Ok(Key::Str(self))
    }
}

impl TryIntoKey for &String {
    fn try_into_key(self) -> Result<Key, KeyError> {
        Ok(Key::Str(self.clone()))
    }
}

// Floats are rejected at the normalization seam rather than left
// unimplemented, so the caller gets the reason instead of a type error.
impl TryIntoKey for f64 {
    fn try_into_key(self) -> Result<Key, KeyError> {
        Err(KeyError::new(format!(
            "key must be an integer or string, f64 ({self}) found; floats are not exact map keys"
        )))
    }
}

impl TryIntoKey for f32 {
    fn try_into_key(self) -> Result<Key, KeyError> {
        Err(KeyError::new(format!(
            "key must be an integer or string, f32 ({self}) found; floats are not exact map keys"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_string_keys_normalize() {
        assert_eq!(1_i32.try_into_key(), Ok(Key::Int(1)));
        assert_eq!(1_u8.try_into_key(), Ok(Key::Int(1)));
        assert_eq!((-9_i64).try_into_key(), Ok(Key::Int(-9)));
        assert_eq!("a".try_into_key(), Ok(Key::Str("a".to_string())));
        assert_eq!("a".to_string().try_into_key(), Ok(Key::Str("a".to_string())));
    }

    #[test]
    fn floats_are_rejected_with_reason() {
        let err = 3.14_f64.try_into_key().unwrap_err();
        assert!(err.message().contains("f64"));
        assert!(err.message().contains("3.14"));
        assert!(0.5_f32.try_into_key().is_err());
    }

    #[test]
    fn u64_out_of_range_is_rejected() {
        assert!(u64::MAX.try_into_key().is_err());
        assert_eq!((i64::MAX as u64).try_into_key(), Ok(Key::Int(i64::MAX)));
    }

    #[test]
    fn int_and_str_never_coerce() {
        assert_ne!(Key::Int(7), Key::Str("7".to_string()));
    }

    #[test]
    fn ordering_is_total_ints_before_strings() {
        let mut keys = vec![
            Key::Str("b".to_string()),
            Key::Int(10),
            Key::Str("a".to_string()),
            Key::Int(-1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                Key::Int(-1),
                Key::Int(10),
                Key::Str("a".to_string()),
                Key::Str("b".to_string()),
            ]
        );
    }

    #[test]
    fn storage_round_trip_is_loss_free() {
        for key in [
            Key::Int(0),
            Key::Int(-42),
            Key::Int(i64::MAX),
            Key::Str(String::new()),
            Key::Str("alpha".to_string()),
            Key::Str("7".to_string()),
            Key::Str("i:7".to_string()),
        ] {
            assert_eq!(Key::from_storage(&key.storage_key()).unwrap(), key);
        }
    }

    #[test]
    fn numeric_string_storage_stays_a_string() {
        let key = Key::Str("7".to_string());
        assert_eq!(key.storage_key(), "s:7");
        assert_eq!(Key::from_storage("s:7").unwrap(), key);
    }

    #[test]
    fn malformed_storage_keys_are_rejected() {
        assert!(Key::from_storage("42").is_err());
        assert!(Key::from_storage("x:42").is_err());
        assert!(Key::from_storage("i:forty-two").is_err());
        let err = Key::from_storage("i:4.2").unwrap_err();
        assert!(err.message().contains("i:4.2"));
    }

    #[test]
    fn display_shows_raw_form() {
        assert_eq!(Key::Int(42).to_string(), "42");
        assert_eq!(Key::Str("alpha".to_string()).to_string(), "alpha");
    }
}
