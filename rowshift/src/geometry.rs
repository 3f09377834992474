//! Geometry primitives shared across the engine.
//!
//! All coordinates are `f32` in container-local units. Fields prefixed with
//! `page_` are screen coordinates, which stay stable while the viewport
//! scrolls underneath.

/// A point in container-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A measured size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A movement delta.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f32,
    pub dy: f32,
}

impl Offset {
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Container bounds in local and screen coordinates.
///
/// `page_y` is needed to detect proximity to the screen edges independent of
/// the current scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub page_x: f32,
    pub page_y: f32,
}

impl ContainerLayout {
    /// Screen coordinate of the container's bottom edge.
    pub fn page_bottom(&self) -> f32 {
        self.page_y + self.height
    }
}
