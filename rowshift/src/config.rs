//! Engine configuration.

use std::time::Duration;

/// Host-supplied options, fixed for the lifetime of the engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether the drag gesture is active. Can be toggled at runtime via
    /// [`Command::SetSortingEnabled`](crate::engine::Command::SetSortingEnabled).
    pub sorting_enabled: bool,
    /// Whether the viewport's own scroll gesture starts out enabled. The
    /// engine disables it for the duration of a drag and restores this value
    /// on release.
    pub scroll_enabled: bool,
    /// Height of the edge zones (screen pixels) that trigger autoscroll.
    pub autoscroll_area_size: f32,
    /// Press-hold delay before a row activates. Consumed by the host's row
    /// widget; carried here so the whole engine is configured in one place.
    pub row_activation_time: Duration,
    /// When set, rows activate only through
    /// [`Command::ActivateRow`](crate::engine::Command::ActivateRow) instead
    /// of press-hold.
    pub manually_activate_rows: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sorting_enabled: true,
            scroll_enabled: true,
            autoscroll_area_size: 60.0,
            row_activation_time: Duration::from_millis(200),
            manually_activate_rows: false,
        }
    }
}
