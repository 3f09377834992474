//! The in-flight drag session.
//!
//! At most one session exists at a time. It is created on activation,
//! destroyed on release, and mutated only by the engine's state transitions.

use crate::geometry::Point;

/// Where the session is in its lifecycle. `Releasing` is transient — the
/// release handler runs it to completion — so only the two resting phases are
/// represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Activated, no move seen yet.
    Activating,
    /// At least one move processed.
    Dragging,
}

#[derive(Debug, Clone)]
pub struct DragSession {
    pub active_key: String,
    /// Index of the active row at activation time.
    pub initial_index: usize,
    /// Slot the active row currently hovers over. Starts equal to
    /// `initial_index`.
    pub hover_index: usize,
    /// Last reported top coordinate of the active row, content-local. Also
    /// advanced by autoscroll ticks, which move the row without a gesture.
    pub active_top: f32,
    pub phase: DragPhase,
}

impl DragSession {
    pub fn new(active_key: impl Into<String>, index: usize, location: Point) -> Self {
        Self {
            active_key: active_key.into(),
            initial_index: index,
            hover_index: index,
            active_top: location.y,
            phase: DragPhase::Activating,
        }
    }
}
