//! Band hit-testing: which slot does the dragged row currently occupy?

use crate::layout::LayoutSnapshot;
use crate::order::Order;

/// Map the dragged row's top coordinate to the index of the slot it hovers
/// over.
///
/// Rows stack in order, so their bands `[top, top + height)` are contiguous
/// and non-overlapping; the first band containing `active_top` wins. Returns
/// `None` when no band contains the coordinate (e.g. past the last row) — the
/// caller keeps its previous hover index in that case.
///
/// Linear scan on purpose: lists are small. A large-list variant would keep a
/// sorted prefix-sum array and binary-search it with the same band semantics.
pub fn resolve_hover(order: &Order, layouts: &LayoutSnapshot, active_top: f32) -> Option<usize> {
    let mut top = 0.0f32;
    for (index, key) in order.iter().enumerate() {
        let size = layouts.get(key)?;
        if active_top >= top && active_top < top + size.height {
            return Some(index);
        }
        top += size.height;
    }
    None
}
