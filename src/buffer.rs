//! Pending-key buffer.
//!
//! ## Architecture
//! - An ordered multiset of [`Key`]s representing fetch intent that is not
//!   yet known to be satisfied. Enqueueing the same key twice is allowed;
//!   deduplication is an explicit step the loader runs before diffing.
//! - Backed by a `VecDeque` so the chunked dequeue is a cheap front drain.
//!
//! ## Core Operations
//! - `enqueue` / `extend`: append keys, no uniqueness enforced.
//! - `deduplicate`: pure copy with repeats removed, first-seen order kept.
//! - `diff`: drop keys the exclusion predicate claims, order kept.
//! - `dequeue`: destructive FIFO take of up to `limit` keys.
//! - `flush`: empty unconditionally.
//!
//! ## Lifecycle
//! Created empty with its loader, grows via enqueue, shrinks via dequeue or
//! flush, and never outlives the loader that owns it.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::key::Key;

/// Ordered multiset of keys awaiting resolution.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    keys: VecDeque<Key>,
}

impl Buffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self {
            keys: VecDeque::new(),
        }
    }

    /// Appends one key to the back of the buffer.
    ///
    /// No uniqueness is enforced here; repeated enqueues of the same key are
    /// collapsed later by [`deduplicate`](Buffer::deduplicate).
    ///
    /// # Example
    ///
    /// ```
    /// use loadkit::buffer::Buffer;
    /// use loadkit::key::Key;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.enqueue(Key::Int(1)).enqueue(Key::Int(1));
    /// assert_eq!(buffer.len(), 2);
    /// ```
    pub fn enqueue(&mut self, key: Key) -> &mut Self {
        self.keys.push_back(key);
        self
    }

    /// Appends every key from an iterable, in iteration order.
    pub fn extend(&mut self, keys: impl IntoIterator<Item = Key>) -> &mut Self {
        self.keys.extend(keys);
        self
    }

    /// Returns a copy of the buffer with repeated keys removed.
    ///
    /// The first occurrence of each key keeps its position; later repeats
    /// are dropped. Pure: the buffer itself is not mutated.
    ///
    /// # Example
    ///
    /// ```
    /// use loadkit::buffer::Buffer;
    /// use loadkit::key::Key;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.extend([Key::Int(1), Key::Int(1), Key::Int(2)]);
    /// assert_eq!(buffer.deduplicate().dump(), vec![Key::Int(1), Key::Int(2)]);
    /// assert_eq!(buffer.len(), 3);
    /// ```
    pub fn deduplicate(&self) -> Buffer {
        let mut seen = FxHashSet::default();
        let keys = self
            .keys
            .iter()
            .filter(|key| seen.insert((*key).clone()))
            .cloned()
            .collect();
        Buffer { keys }
    }

    /// Returns a copy of the buffer without the keys the predicate excludes.
    ///
    /// Relative order of the surviving keys is preserved. The loader uses
    /// this to subtract already-cached keys from the pending set.
    pub fn diff(&self, mut exclude: impl FnMut(&Key) -> bool) -> Buffer {
        let keys = self.keys.iter().filter(|key| !exclude(key)).cloned().collect();
        Buffer { keys }
    }

    /// Removes and returns up to `limit` keys from the front, FIFO.
    ///
    /// Returns fewer than `limit` keys when the buffer is smaller.
    ///
    /// # Example
    ///
    /// ```
    /// use loadkit::buffer::Buffer;
    /// use loadkit::key::Key;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.extend([Key::Int(1), Key::Int(2), Key::Int(3)]);
    ///
    /// assert_eq!(buffer.dequeue(2), vec![Key::Int(1), Key::Int(2)]);
    /// assert_eq!(buffer.dequeue(2), vec![Key::Int(3)]);
    /// assert!(buffer.dequeue(2).is_empty());
    /// ```
    pub fn dequeue(&mut self, limit: usize) -> Vec<Key> {
        let take = limit.min(self.keys.len());
        self.keys.drain(..take).collect()
    }

    /// Empties the buffer unconditionally.
    pub fn flush(&mut self) -> &mut Self {
        self.keys.clear();
        self
    }

    /// Returns `true` if the buffer holds `key` at least once.
    pub fn contains(&self, key: &Key) -> bool {
        self.keys.contains(key)
    }

    /// Returns the number of buffered keys, repeats included.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no keys are buffered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the most recently enqueued key, if any.
    pub fn last(&self) -> Option<&Key> {
        self.keys.back()
    }

    /// Returns an iterator over the buffered keys, front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Copies the buffered keys out in order.
    pub fn dump(&self) -> Vec<Key> {
        self.keys.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_keys(values: impl IntoIterator<Item = i64>) -> Vec<Key> {
        values.into_iter().map(Key::Int).collect()
    }

    #[test]
    fn enqueue_keeps_repeats_and_order() {
        let mut buffer = Buffer::new();
        buffer.enqueue(Key::Int(1)).enqueue(Key::Int(2)).enqueue(Key::Int(1));
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.dump(), int_keys([1, 2, 1]));
        assert_eq!(buffer.last(), Some(&Key::Int(1)));
    }

    #[test]
    fn deduplicate_preserves_first_seen_order() {
        let mut buffer = Buffer::new();
        buffer.extend(int_keys([3, 1, 3, 2, 1]));

        let deduped = buffer.deduplicate();
        assert_eq!(deduped.dump(), int_keys([3, 1, 2]));
        // Pure: original untouched
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn deduplicate_handles_mixed_key_types() {
        let mut buffer = Buffer::new();
        buffer.extend([
            Key::Int(7),
            Key::Str("7".to_string()),
            Key::Int(7),
        ]);
        assert_eq!(
            buffer.deduplicate().dump(),
            vec![Key::Int(7), Key::Str("7".to_string())]
        );
    }

    #[test]
    fn diff_drops_excluded_keys_keeps_order() {
        let mut buffer = Buffer::new();
        buffer.extend(int_keys([1, 2, 3, 4]));

        let remaining = buffer.diff(|key| matches!(key, Key::Int(2) | Key::Int(4)));
        assert_eq!(remaining.dump(), int_keys([1, 3]));
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn dequeue_is_fifo_and_destructive() {
        let mut buffer = Buffer::new();
        buffer.extend(int_keys([1, 2, 3]));

        assert_eq!(buffer.dequeue(2), int_keys([1, 2]));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.dequeue(5), int_keys([3]));
        assert!(buffer.is_empty());
        assert!(buffer.dequeue(1).is_empty());
    }

    #[test]
    fn flush_empties_unconditionally() {
        let mut buffer = Buffer::new();
        buffer.extend(int_keys([1, 2]));
        buffer.flush();
        assert!(buffer.is_empty());
        assert_eq!(buffer.last(), None);
    }

    #[test]
    fn contains_sees_buffered_keys() {
        let mut buffer = Buffer::new();
        buffer.enqueue(Key::Str("a".to_string()));
        assert!(buffer.contains(&Key::Str("a".to_string())));
        assert!(!buffer.contains(&Key::Int(1)));
    }
}
