//! Handles to the host's row widgets.
//!
//! The engine never touches rendering; it drives each row through a
//! [`RowHandle`] the host registers per key. Handles are looked up in a
//! registry the engine owns.

use std::collections::HashMap;

use log::trace;

use crate::geometry::{Offset, Point};

/// Control surface of one rendered row.
pub trait RowHandle: Send {
    /// Place the row at `location` (container-local), optionally animated.
    fn reposition(&mut self, location: Point, animated: bool);

    /// Move the row by `delta` from wherever it currently is. Used to keep
    /// the dragged row pinned under the pointer while autoscrolling.
    fn move_by(&mut self, delta: Offset);
}

/// Row handles keyed by row key.
#[derive(Default)]
pub struct RowRegistry {
    rows: HashMap<String, Box<dyn RowHandle>>,
}

impl RowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, handle: Box<dyn RowHandle>) {
        self.rows.insert(key.into(), handle);
    }

    pub fn remove(&mut self, key: &str) -> Option<Box<dyn RowHandle>> {
        self.rows.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reposition the row for `key`, if it is registered. Rows that have not
    /// mounted yet are skipped silently; they pick up their nominal position
    /// from the next settle.
    pub fn reposition(&mut self, key: &str, location: Point, animated: bool) {
        if let Some(row) = self.rows.get_mut(key) {
            trace!("reposition '{key}' to ({}, {})", location.x, location.y);
            row.reposition(location, animated);
        }
    }

    pub fn move_by(&mut self, key: &str, delta: Offset) {
        if let Some(row) = self.rows.get_mut(key) {
            row.move_by(delta);
        }
    }
}

impl std::fmt::Debug for RowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowRegistry").field("rows", &self.rows.len()).finish()
    }
}
