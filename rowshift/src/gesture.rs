//! Gesture events reported by the external row widget.
//!
//! The widget owns recognition (press-hold timing, pointer tracking,
//! velocity); the engine only consumes the resulting events.

use crate::geometry::{Offset, Point};

/// Moves with |vertical velocity| above this are ignored as jitter, not
/// treated as drag progress.
pub const FLING_VELOCITY: f32 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub enum RowGesture {
    /// A press-and-hold exceeded the activation delay (or the widget's manual
    /// activation affordance fired). `location` is the row's current
    /// container-local position.
    Activate {
        key: String,
        index: usize,
        location: Point,
    },
    /// A tap that did not turn into a drag.
    Press { key: String },
    /// The held row moved. `location` is the row's current container-local
    /// position, `page_y` the pointer's screen coordinate.
    Move {
        location: Point,
        velocity: Offset,
        page_y: f32,
    },
    /// The pointer was released.
    Release,
}
