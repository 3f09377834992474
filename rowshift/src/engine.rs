//! The drag-reorder engine: command handling, the drag-session state machine,
//! and the async run loop.
//!
//! The engine owns all mutable state (order, layouts, session, autoscroll)
//! and is driven by a single consumer loop, so there is no locking around
//! any of it. Hosts talk to it through an [`EngineHandle`] and get results
//! back through [`Callbacks`]. Layout barriers are collected by spawned tasks
//! that report back through an internal channel; snapshots from superseded
//! epochs are discarded on receipt.

use log::{debug, trace, warn};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::autoscroll::{Autoscroll, ScrollDirection, ScrollMetrics, Tick};
use crate::config::Config;
use crate::error::ReorderError;
use crate::geometry::{ContainerLayout, Offset, Point, Size};
use crate::gesture::{FLING_VELOCITY, RowGesture};
use crate::hover::resolve_hover;
use crate::layout::{self, LayoutRegistry, LayoutSnapshot};
use crate::order::Order;
use crate::row::{RowHandle, RowRegistry};
use crate::session::{DragPhase, DragSession};
use crate::shift::apply_displacement;
use crate::viewport::Viewport;

/// Commands accepted by the engine.
pub enum Command {
    /// Replace the dataset. Starts a new layout epoch; a drag in progress is
    /// dropped, and pending layout results from the old epoch can no longer
    /// apply.
    SetData {
        keys: Vec<String>,
        /// Initial order; defaults to dataset key order.
        order: Option<Vec<String>>,
    },
    /// Replace the order without changing the dataset.
    SetOrder(Vec<String>),
    /// Toggle the drag gesture at runtime.
    SetSortingEnabled(bool),
    /// Register the handle for a mounted row.
    InsertRow {
        key: String,
        handle: Box<dyn RowHandle>,
    },
    /// Drop the handle for an unmounted row.
    RemoveRow { key: String },
    /// A row reported its measured size (once per key per epoch).
    RowLayout { key: String, size: Size },
    /// The viewport reported a scroll position change.
    ScrollOffset { x: f32, y: f32 },
    ScrollBy { dx: f32, dy: f32, animated: bool },
    ScrollTo { x: f32, y: f32, animated: bool },
    /// Scroll so the row is visible; a no-op if it already is.
    ScrollToKey { key: String, animated: bool },
    /// Activate a row explicitly (the `manually_activate_rows` path).
    ActivateRow { key: String },
    Gesture(RowGesture),
    Shutdown,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SetData { keys, order } => f
                .debug_struct("SetData")
                .field("keys", keys)
                .field("order", order)
                .finish(),
            Command::SetOrder(keys) => f.debug_tuple("SetOrder").field(keys).finish(),
            Command::SetSortingEnabled(enabled) => {
                f.debug_tuple("SetSortingEnabled").field(enabled).finish()
            }
            Command::InsertRow { key, .. } => {
                f.debug_struct("InsertRow").field("key", key).finish_non_exhaustive()
            }
            Command::RemoveRow { key } => f.debug_struct("RemoveRow").field("key", key).finish(),
            Command::RowLayout { key, size } => f
                .debug_struct("RowLayout")
                .field("key", key)
                .field("size", size)
                .finish(),
            Command::ScrollOffset { x, y } => f
                .debug_struct("ScrollOffset")
                .field("x", x)
                .field("y", y)
                .finish(),
            Command::ScrollBy { dx, dy, animated } => f
                .debug_struct("ScrollBy")
                .field("dx", dx)
                .field("dy", dy)
                .field("animated", animated)
                .finish(),
            Command::ScrollTo { x, y, animated } => f
                .debug_struct("ScrollTo")
                .field("x", x)
                .field("y", y)
                .field("animated", animated)
                .finish(),
            Command::ScrollToKey { key, animated } => f
                .debug_struct("ScrollToKey")
                .field("key", key)
                .field("animated", animated)
                .finish(),
            Command::ActivateRow { key } => {
                f.debug_struct("ActivateRow").field("key", key).finish()
            }
            Command::Gesture(gesture) => f.debug_tuple("Gesture").field(gesture).finish(),
            Command::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Messages from spawned barrier collectors back to the engine loop.
#[derive(Debug)]
enum Internal {
    LayoutsReady(LayoutSnapshot),
}

/// Host callbacks. All optional.
#[derive(Default)]
pub struct Callbacks {
    /// A row was activated for dragging.
    pub on_activate_row: Option<Box<dyn FnMut(&str) + Send>>,
    /// A row was tapped without starting a drag.
    pub on_press_row: Option<Box<dyn FnMut(&str) + Send>>,
    /// A drag finished: `(initial_index, hover_index)`.
    pub on_release_row: Option<Box<dyn FnMut(usize, usize) + Send>>,
    /// The committed order changed.
    pub on_change_order: Option<Box<dyn FnMut(&Order) + Send>>,
}

/// Clonable sender half used by the host to drive the engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
}

impl EngineHandle {
    /// Queue a command. A closed channel means the engine has shut down; the
    /// command is dropped with a debug note.
    pub async fn send(&self, command: Command) {
        if self.tx.send(command).await.is_err() {
            debug!("command dropped: engine has shut down");
        }
    }

    /// Non-async variant for callers outside the runtime. Drops the command
    /// if the queue is full or closed.
    pub fn try_send(&self, command: Command) {
        if let Err(err) = self.tx.try_send(command) {
            debug!("command dropped: {err}");
        }
    }
}

/// The drag-reorder engine. See the module docs for the ownership model.
pub struct ReorderEngine {
    config: Config,
    sorting_enabled: bool,
    viewport: Box<dyn Viewport>,
    callbacks: Callbacks,
    rows: RowRegistry,
    order: Order,
    layouts: LayoutRegistry,
    snapshot: Option<LayoutSnapshot>,
    container: Option<ContainerLayout>,
    content_offset: Point,
    session: Option<DragSession>,
    released_key: Option<String>,
    autoscroll: Option<Autoscroll>,
    command_rx: mpsc::Receiver<Command>,
    internal_tx: mpsc::Sender<Internal>,
    internal_rx: mpsc::Receiver<Internal>,
}

impl ReorderEngine {
    pub fn new(
        config: Config,
        viewport: Box<dyn Viewport>,
        callbacks: Callbacks,
    ) -> (Self, EngineHandle) {
        let (tx, command_rx) = mpsc::channel(64);
        let (internal_tx, internal_rx) = mpsc::channel(4);
        let sorting_enabled = config.sorting_enabled;
        let engine = Self {
            config,
            sorting_enabled,
            viewport,
            callbacks,
            rows: RowRegistry::new(),
            order: Order::default(),
            layouts: LayoutRegistry::new(),
            snapshot: None,
            container: None,
            content_offset: Point::default(),
            session: None,
            released_key: None,
            autoscroll: None,
            command_rx,
            internal_tx,
            internal_rx,
        };
        (engine, EngineHandle { tx })
    }

    /// The committed order.
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn content_offset(&self) -> Point {
        self.content_offset
    }

    /// Key of the row being dragged, if a session is open.
    pub fn active_row(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.active_key.as_str())
    }

    /// Key of the most recently released row, kept so the host can render it
    /// on top while it animates home.
    pub fn released_row(&self) -> Option<&str> {
        self.released_key.as_deref()
    }

    /// Drive the engine until [`Command::Shutdown`] arrives or every handle
    /// is dropped. One consumer: commands are processed strictly in arrival
    /// order, and an autoscroll tick runs to completion before the next
    /// deadline is armed.
    pub async fn run(mut self) {
        debug!("reorder engine running");
        loop {
            // A fresh epoch's barrier gets its own collector task; stale
            // collectors resolve to nothing once their channels drop.
            if let Some(barrier) = self.layouts.take_barrier() {
                let tx = self.internal_tx.clone();
                tokio::spawn(async move {
                    if let Some(snapshot) = barrier.wait().await {
                        let _ = tx.send(Internal::LayoutsReady(snapshot)).await;
                    }
                });
            }

            let deadline = self.autoscroll.as_ref().map(Autoscroll::deadline);
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle_command(command),
                },
                Some(internal) = self.internal_rx.recv() => self.handle_internal(internal),
                _ = until(deadline) => self.on_autoscroll_tick(),
            }
        }
        debug!("reorder engine stopped");
    }

    /// Apply one command synchronously. Exposed for hosts that embed the
    /// engine in their own loop instead of spawning [`ReorderEngine::run`].
    pub fn handle_command(&mut self, command: Command) {
        trace!("command: {command:?}");
        match command {
            Command::SetData { keys, order } => self.set_data(keys, order),
            Command::SetOrder(keys) => self.set_order(keys),
            Command::SetSortingEnabled(enabled) => {
                debug!("sorting enabled: {enabled}");
                self.sorting_enabled = enabled;
            }
            Command::InsertRow { key, handle } => self.rows.insert(key, handle),
            Command::RemoveRow { key } => {
                self.rows.remove(&key);
            }
            Command::RowLayout { key, size } => self.layouts.resolve(&key, size),
            Command::ScrollOffset { x, y } => self.content_offset = Point::new(x, y),
            Command::ScrollBy { dx, dy, animated } => self.scroll_by(dx, dy, animated),
            Command::ScrollTo { x, y, animated } => self.scroll_to(x, y, animated),
            Command::ScrollToKey { key, animated } => self.scroll_to_key(&key, animated),
            Command::ActivateRow { key } => self.activate_row(&key),
            Command::Gesture(gesture) => self.handle_gesture(gesture),
            // Handled by the run loop; nothing to do when driven directly.
            Command::Shutdown => {}
        }
    }

    /// Await the current epoch's layout barrier, if one is pending, and apply
    /// the resulting snapshot. For hosts that drive the engine through
    /// [`ReorderEngine::handle_command`] instead of the run loop; call it once
    /// every row of the epoch is guaranteed to report.
    pub async fn await_layouts(&mut self) {
        if let Some(barrier) = self.layouts.take_barrier()
            && let Some(snapshot) = barrier.wait().await
        {
            self.apply_snapshot(snapshot);
        }
    }

    fn handle_internal(&mut self, internal: Internal) {
        match internal {
            Internal::LayoutsReady(snapshot) => self.apply_snapshot(snapshot),
        }
    }

    fn set_data(&mut self, keys: Vec<String>, order: Option<Vec<String>>) {
        if let Some(session) = self.session.take() {
            warn!(
                "dataset changed while row '{}' was dragged; dropping the session",
                session.active_key
            );
            self.autoscroll = None;
            self.restore_scroll_enabled();
        }
        self.order = Order::new(order.unwrap_or_else(|| keys.clone()));
        self.snapshot = None;
        self.container = None;
        self.released_key = None;
        self.layouts.begin_epoch(self.order.keys());
    }

    fn set_order(&mut self, keys: Vec<String>) {
        let order = Order::new(keys);
        if order.len() != self.order.len() {
            warn!(
                "replacement order has {} keys, current order has {}",
                order.len(),
                self.order.len()
            );
        }
        self.order = order;
    }

    fn apply_snapshot(&mut self, snapshot: LayoutSnapshot) {
        if snapshot.epoch != self.layouts.epoch() {
            debug!("discarding layout snapshot for stale epoch {}", snapshot.epoch);
            return;
        }
        // Container bounds are only meaningful once rows are measured.
        self.container = self.viewport.container_layout();
        self.snapshot = Some(snapshot);
        if let Some(snapshot) = &self.snapshot {
            apply_displacement(&self.order, snapshot, &mut self.rows, None);
        }
    }

    fn scroll_by(&mut self, dx: f32, dy: f32, animated: bool) {
        self.content_offset.x += dx;
        self.content_offset.y += dy;
        self.scroll(animated);
    }

    fn scroll_to(&mut self, x: f32, y: f32, animated: bool) {
        self.content_offset = Point::new(x, y);
        self.scroll(animated);
    }

    fn scroll(&mut self, animated: bool) {
        self.viewport.scroll_to(self.content_offset, animated);
    }

    fn scroll_to_key(&mut self, key: &str, animated: bool) {
        let Some(snapshot) = &self.snapshot else {
            warn!("scroll to '{key}' ignored: layouts not resolved yet");
            return;
        };
        let Some(container) = self.container else {
            warn!("scroll to '{key}' ignored: container not measured yet");
            return;
        };
        let Some(index) = self.order.index_of(key) else {
            warn!("{}", ReorderError::UnknownKey(key.to_string()));
            return;
        };
        let Some(key_y) = layout::nominal_top(&self.order, snapshot, index) else {
            return;
        };

        // Only scroll when the row sits outside the visible band.
        if key_y < self.content_offset.y || key_y > self.content_offset.y + container.height {
            self.content_offset.y = key_y;
            self.scroll(animated);
        }
    }

    fn handle_gesture(&mut self, gesture: RowGesture) {
        match gesture {
            RowGesture::Activate { key, index, location } => self.activate(key, index, location),
            RowGesture::Press { key } => {
                if let Some(on_press) = &mut self.callbacks.on_press_row {
                    on_press(&key);
                }
            }
            RowGesture::Move { location, velocity, page_y } => {
                self.on_move(location, velocity, page_y)
            }
            RowGesture::Release => self.on_release(),
        }
    }

    fn activate(&mut self, key: String, index: usize, location: Point) {
        if !self.sorting_enabled {
            debug!("ignoring activation of '{key}': sorting disabled");
            return;
        }
        if let Some(session) = &self.session {
            // The open session is authoritative; never nest.
            warn!("{}", ReorderError::SessionActive { active: session.active_key.clone() });
            return;
        }
        if self.order.get(index) != Some(key.as_str()) {
            warn!("activation of '{key}' at index {index} does not match the current order");
            return;
        }

        debug!("row '{key}' activated at index {index}");
        self.session = Some(DragSession::new(key.as_str(), index, location));
        self.released_key = None;
        self.viewport.set_scroll_enabled(false);
        if let Some(on_activate) = &mut self.callbacks.on_activate_row {
            on_activate(&key);
        }
    }

    fn activate_row(&mut self, key: &str) {
        let Some(index) = self.order.index_of(key) else {
            warn!("{}", ReorderError::UnknownKey(key.to_string()));
            return;
        };
        let location = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| layout::nominal_top(&self.order, snapshot, index))
            .map(|top| Point::new(0.0, top));
        let Some(location) = location else {
            warn!("cannot activate '{key}' before layouts resolve");
            return;
        };
        self.activate(key.to_string(), index, location);
    }

    fn on_move(&mut self, location: Point, velocity: Offset, page_y: f32) {
        let Some(session) = self.session.as_mut() else {
            trace!("move without an active session");
            return;
        };
        if session.phase == DragPhase::Activating {
            session.phase = DragPhase::Dragging;
            debug!("row '{}' entered dragging", session.active_key);
        }

        // Anti-jitter: a fast vertical flick is noise, not drag progress.
        if velocity.dy.abs() > FLING_VELOCITY {
            trace!("ignoring fling move (vy = {})", velocity.dy);
            return;
        }
        session.active_top = location.y;

        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let hover_changed = match resolve_hover(&self.order, snapshot, location.y) {
            Some(hover) if hover != session.hover_index => {
                trace!("hover index {} -> {hover}", session.hover_index);
                session.hover_index = hover;
                true
            }
            // No band under the row's top edge: keep the previous hover.
            _ => false,
        };
        let (initial, hover) = (session.initial_index, session.hover_index);

        if hover_changed {
            // While autoscrolling, displacement waits for the terminal
            // settle; applying it mid-scroll would fight the moving viewport.
            if self.autoscroll.is_none() {
                apply_displacement(&self.order, snapshot, &mut self.rows, Some((initial, hover)));
            }
            if self.config.scroll_enabled {
                self.evaluate_autoscroll(page_y);
            }
        } else if self.autoscroll.is_some() && self.config.scroll_enabled {
            // The pointer can leave the edge zone without crossing a band;
            // the run must still stop deterministically.
            self.evaluate_autoscroll(page_y);
        }
    }

    fn evaluate_autoscroll(&mut self, page_y: f32) {
        let Some(container) = self.container else {
            return;
        };
        let area = self.config.autoscroll_area_size;
        let in_begin_area = page_y < container.page_y + area;
        let in_end_area = page_y > container.page_bottom() - area;

        if self.autoscroll.is_some() {
            if !in_begin_area && !in_end_area {
                self.stop_autoscroll();
            }
            // An active run is never replaced.
            return;
        }

        let direction = if in_begin_area {
            ScrollDirection::Up
        } else if in_end_area {
            ScrollDirection::Down
        } else {
            return;
        };

        let Some(metrics) = self.scroll_metrics() else {
            return;
        };
        let run = Autoscroll::new(direction);
        if !run.can_scroll(&metrics) {
            return;
        }
        debug!("autoscroll started: {:?}", direction);
        self.autoscroll = Some(run);
    }

    fn on_autoscroll_tick(&mut self) {
        let Some(metrics) = self.scroll_metrics() else {
            self.stop_autoscroll();
            return;
        };
        let Some(run) = self.autoscroll.as_mut() else {
            return;
        };
        match run.on_tick(&metrics) {
            Tick::Scroll(dy) => {
                trace!("autoscroll tick: dy = {dy}");
                self.scroll_by(0.0, dy, false);
                // Keep the dragged row pinned under the pointer.
                if let Some(session) = self.session.as_mut() {
                    session.active_top += dy;
                    let key = session.active_key.clone();
                    self.rows.move_by(&key, Offset::new(0.0, dy));
                }
            }
            Tick::Stop => self.stop_autoscroll(),
        }
    }

    /// Cancel the running autoscroll, if any, and settle the displacement for
    /// the current hover. Cancellation always reconciles; a run is never left
    /// mid-flight.
    fn stop_autoscroll(&mut self) {
        if self.autoscroll.take().is_none() {
            return;
        }
        debug!("autoscroll stopped");
        self.settle();
    }

    fn settle(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let span = (session.initial_index, session.hover_index);
        if let Some(snapshot) = &self.snapshot {
            apply_displacement(&self.order, snapshot, &mut self.rows, Some(span));
        }
    }

    fn on_release(&mut self) {
        let Some(session) = self.session.clone() else {
            trace!("release without an active session");
            return;
        };

        // Scrolling stops first; a release always ends with the rows settled
        // into the final arrangement.
        self.autoscroll = None;
        self.settle();
        self.session = None;

        let (from, to) = (session.initial_index, session.hover_index);
        match self.order.move_item(from, to) {
            Ok(next) => {
                if next != self.order {
                    self.order = next;
                    if let Some(on_change) = &mut self.callbacks.on_change_order {
                        on_change(&self.order);
                    }
                }
            }
            Err(err) => warn!("release kept the previous order: {err}"),
        }

        debug!("row '{}' released: {from} -> {to}", session.active_key);
        self.released_key = Some(session.active_key);
        self.restore_scroll_enabled();
        if let Some(on_release) = &mut self.callbacks.on_release_row {
            on_release(from, to);
        }
    }

    fn restore_scroll_enabled(&mut self) {
        self.viewport.set_scroll_enabled(self.config.scroll_enabled);
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        let snapshot = self.snapshot.as_ref()?;
        let container = self.container?;
        Some(ScrollMetrics {
            content_offset_y: self.content_offset.y,
            content_height: snapshot.content_size.height,
            container_height: container.height,
        })
    }
}

impl std::fmt::Debug for ReorderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReorderEngine")
            .field("order", &self.order)
            .field("session", &self.session)
            .field("autoscroll", &self.autoscroll)
            .field("content_offset", &self.content_offset)
            .finish_non_exhaustive()
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
