//! Row layout collection and the per-epoch readiness barrier.
//!
//! Each row reports its measured size exactly once per epoch, asynchronously
//! and in any order. The registry keeps one single-resolution channel per key;
//! the barrier is a join over all of them and fires only once every key of the
//! current epoch has reported. Beginning a new epoch drops the previous
//! epoch's receivers, so outstanding resolutions from a superseded dataset can
//! never satisfy the new barrier.

use std::collections::HashMap;

use futures::future::join_all;
use log::{debug, warn};
use tokio::sync::oneshot;

use crate::geometry::Size;
use crate::order::Epoch;

/// The measured layout of every row in one epoch, plus the aggregate content
/// size used to size the scrollable content and clamp autoscroll.
#[derive(Debug, Clone)]
pub struct LayoutSnapshot {
    pub epoch: Epoch,
    by_key: HashMap<String, Size>,
    pub content_size: Size,
}

impl LayoutSnapshot {
    pub fn get(&self, key: &str) -> Option<Size> {
        self.by_key.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Records each row's measured size, once per key per epoch.
#[derive(Debug, Default)]
pub struct LayoutRegistry {
    epoch: Epoch,
    senders: HashMap<String, oneshot::Sender<(String, Size)>>,
    barrier: Option<LayoutBarrier>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Start a fresh epoch for the given key set.
    ///
    /// Previous-epoch channels are dropped here, which invalidates any
    /// still-pending barrier from that epoch.
    pub fn begin_epoch(&mut self, keys: &[String]) -> Epoch {
        self.epoch = self.epoch.next();
        self.senders.clear();

        let mut receivers = Vec::with_capacity(keys.len());
        for key in keys {
            let (tx, rx) = oneshot::channel();
            self.senders.insert(key.clone(), tx);
            receivers.push(rx);
        }
        self.barrier = Some(LayoutBarrier {
            epoch: self.epoch,
            receivers,
        });

        debug!("layout epoch {} started with {} rows", self.epoch, keys.len());
        self.epoch
    }

    /// Record a row's measured size. First write wins: a repeated report for
    /// the same key within the epoch is ignored with a warning, as is a report
    /// for a key that is not part of the current epoch.
    pub fn resolve(&mut self, key: &str, size: Size) {
        match self.senders.remove(key) {
            Some(tx) => {
                // Receiver gone means the epoch was superseded mid-flight.
                if tx.send((key.to_string(), size)).is_err() {
                    debug!("discarding layout for '{key}' from a superseded epoch");
                }
            }
            None => warn!("layout for '{key}' ignored (duplicate or unknown in epoch {})", self.epoch),
        }
    }

    /// Hand out the current epoch's barrier, at most once per epoch.
    pub fn take_barrier(&mut self) -> Option<LayoutBarrier> {
        self.barrier.take()
    }
}

/// The pending receiver set for one epoch. Awaiting it joins every row's
/// one-shot resolution.
#[derive(Debug)]
pub struct LayoutBarrier {
    epoch: Epoch,
    receivers: Vec<oneshot::Receiver<(String, Size)>>,
}

impl LayoutBarrier {
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Wait until every row of this epoch has reported a size.
    ///
    /// Returns `None` if any channel closed without a value, which happens
    /// when the epoch is superseded while the barrier is still pending.
    pub async fn wait(self) -> Option<LayoutSnapshot> {
        let epoch = self.epoch;
        let results = join_all(self.receivers).await;

        let mut by_key = HashMap::with_capacity(results.len());
        let mut content_size = Size::default();
        for result in results {
            let (key, size) = result.ok()?;
            content_size.width += size.width;
            content_size.height += size.height;
            by_key.insert(key, size);
        }

        debug!("layout barrier for epoch {epoch} resolved ({} rows)", by_key.len());
        Some(LayoutSnapshot {
            epoch,
            by_key,
            content_size,
        })
    }
}

/// Nominal top coordinate of the row at `index`: the prefix sum of the heights
/// of the rows before it in `order`. `None` if any of those rows is unmeasured
/// or the index is out of range.
pub fn nominal_top(
    order: &crate::order::Order,
    layouts: &LayoutSnapshot,
    index: usize,
) -> Option<f32> {
    if index >= order.len() {
        return None;
    }
    let mut top = 0.0;
    for key in order.iter().take(index) {
        top += layouts.get(key)?.height;
    }
    Some(top)
}
