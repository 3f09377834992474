//! The committed row order and the dataset epoch.
//!
//! `Order` is the single source of truth for the visible sequence of row keys.
//! It is never mutated mid-drag; a drag release produces a new order via
//! [`Order::move_item`], and a dataset change replaces it wholesale.

use crate::error::ReorderError;

/// A generation of the dataset.
///
/// Bumped whenever the underlying item collection is replaced. Asynchronous
/// layout results are tagged with the epoch they were requested under so that
/// stale results can never satisfy the current epoch's barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub const fn next(self) -> Epoch {
        Epoch(self.0 + 1)
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered sequence of row keys, one per visible item, no duplicates.
///
/// Invariant: always a permutation of the current dataset's keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Order {
    keys: Vec<String>,
}

impl Order {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Remove the element at `from` and reinsert it at `to`, returning the
    /// resulting order. Fails with [`ReorderError::OutOfRange`] if either
    /// index is outside `0..len`, leaving `self` untouched.
    pub fn move_item(&self, from: usize, to: usize) -> Result<Order, ReorderError> {
        let len = self.keys.len();
        for index in [from, to] {
            if index >= len {
                return Err(ReorderError::OutOfRange { index, len });
            }
        }

        let mut keys = self.keys.clone();
        let key = keys.remove(from);
        keys.insert(to, key);
        Ok(Order { keys })
    }
}

impl From<Vec<&str>> for Order {
    fn from(keys: Vec<&str>) -> Self {
        Self::new(keys.into_iter().map(str::to_string).collect())
    }
}
