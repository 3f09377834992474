//! Drag-reorder engine for vertically stacked lists.
//!
//! The host renders rows and recognizes gestures; this crate owns the order
//! model, the per-epoch layout barrier, hover hit-testing, sibling shift
//! animation, edge-zone autoscroll, and the drag-session state machine that
//! ties them together. See [`engine::ReorderEngine`] for the entry point.

pub mod autoscroll;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod hover;
pub mod layout;
pub mod order;
pub mod row;
pub mod session;
pub mod shift;
pub mod viewport;

pub use autoscroll::{AUTOSCROLL_INTERVAL, ScrollDirection, ScrollMetrics};
pub use config::Config;
pub use engine::{Callbacks, Command, EngineHandle, ReorderEngine};
pub use error::ReorderError;
pub use geometry::{ContainerLayout, Offset, Point, Size};
pub use gesture::{FLING_VELOCITY, RowGesture};
pub use layout::{LayoutRegistry, LayoutSnapshot};
pub use order::{Epoch, Order};
pub use row::{RowHandle, RowRegistry};
pub use session::{DragPhase, DragSession};
pub use viewport::Viewport;
