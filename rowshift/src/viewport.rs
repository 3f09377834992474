//! The scrollable viewport collaborator.

use crate::geometry::{ContainerLayout, Point};

/// Capability set the engine needs from the host's scroll view.
///
/// The engine owns the authoritative content offset; `scroll_to` is a command,
/// not a query. Offset changes caused by the user scrolling are reported back
/// through [`Command::ScrollOffset`](crate::engine::Command::ScrollOffset).
pub trait Viewport: Send {
    /// Scroll the content to `offset`, optionally animated.
    fn scroll_to(&mut self, offset: Point, animated: bool);

    /// Enable or disable the viewport's own scroll gesture. Disabled for the
    /// duration of a drag so drag and scroll gestures stay unambiguous.
    fn set_scroll_enabled(&mut self, enabled: bool);

    /// Current container bounds, or `None` if not laid out yet. Queried once
    /// rows are measured; the bounds are only meaningful after that.
    fn container_layout(&self) -> Option<ContainerLayout>;
}
