//! Sibling displacement while a drag is in progress.
//!
//! Every row's position is recomputed from its nominal layout on each call,
//! never accumulated, so applying the same span twice is idempotent. The
//! shift magnitude is each displaced row's own height, which keeps
//! variable-height lists aligned.

use crate::geometry::Point;
use crate::layout::LayoutSnapshot;
use crate::order::Order;
use crate::row::RowRegistry;

/// Reposition every row according to the active drag span, or to its nominal
/// position when `span` is `None`.
///
/// `span` is `(initial_index, hover_index)` into the activation-time order.
/// Dragging down (`hover > initial`) shifts rows in `(initial, hover]` up by
/// one slot; dragging up shifts rows in `[hover, initial)` down by one slot.
/// Rows outside the span return to their nominal position. The active row
/// itself is never touched; it follows the pointer.
pub fn apply_displacement(
    order: &Order,
    layouts: &LayoutSnapshot,
    rows: &mut RowRegistry,
    span: Option<(usize, usize)>,
) {
    let mut top = 0.0f32;
    for (index, key) in order.iter().enumerate() {
        let Some(size) = layouts.get(key) else {
            continue;
        };

        let mut y = top;
        top += size.height;

        if let Some((initial, hover)) = span {
            if index == initial {
                continue;
            }
            if hover > initial && index > initial && index <= hover {
                y -= size.height;
            } else if hover < initial && index >= hover && index < initial {
                y += size.height;
            }
        }

        rows.reposition(key, Point::new(0.0, y), true);
    }
}
