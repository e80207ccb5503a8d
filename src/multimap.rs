use std::{
    borrow::Borrow,
    collections::{HashMap, VecDeque},
    fmt::{self, Debug},
    hash::Hash,
};

/// A map whose value is a FIFO queue of values.
///
/// Used to pair up items that share a key (components of the same type,
/// children with the same id) in the order they were inserted.
#[derive(Clone)]
pub struct MultiQueue<K, V> {
    inner: HashMap<K, VecDeque<V>>,
}

impl<K: Hash + Eq, V> MultiQueue<K, V> {
    pub fn new() -> Self {
        MultiQueue {
            inner: HashMap::new(),
        }
    }

    pub fn push_back(&mut self, k: K, v: V) {
        self.inner.entry(k).or_default().push_back(v);
    }

    /// Takes the oldest value queued under `k`, if any.
    pub fn pop_front<Q: ?Sized>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let bucket = self.inner.get_mut(k)?;
        let value = bucket.pop_front();

        if bucket.is_empty() {
            self.inner.remove(k);
        }

        value
    }
}

impl<K: Debug + Hash + Eq, V: Debug> Debug for MultiQueue<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(formatter)
    }
}

impl<K, V> Default for MultiQueue<K, V> {
    fn default() -> Self {
        Self {
            inner: Default::default(),
        }
    }
}
