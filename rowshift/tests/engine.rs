use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use rowshift::{
    Callbacks, Command, Config, ContainerLayout, Offset, Point, ReorderEngine, RowGesture,
    RowHandle, Size, Viewport,
};

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Default)]
struct RowLog {
    /// Every reposition per key, in call order.
    positions: HashMap<String, Vec<Point>>,
}

impl RowLog {
    fn last_y(&self, key: &str) -> Option<f32> {
        self.positions.get(key).and_then(|v| v.last()).map(|p| p.y)
    }
}

struct TestRow {
    key: String,
    log: Arc<Mutex<RowLog>>,
}

impl RowHandle for TestRow {
    fn reposition(&mut self, location: Point, _animated: bool) {
        self.log
            .lock()
            .unwrap()
            .positions
            .entry(self.key.clone())
            .or_default()
            .push(location);
    }

    fn move_by(&mut self, _delta: Offset) {}
}

struct TestViewport {
    container: Option<ContainerLayout>,
    scrolls: mpsc::UnboundedSender<(Point, bool)>,
    scroll_enabled: Arc<Mutex<Vec<bool>>>,
}

impl Viewport for TestViewport {
    fn scroll_to(&mut self, offset: Point, animated: bool) {
        let _ = self.scrolls.send((offset, animated));
    }

    fn set_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_enabled.lock().unwrap().push(enabled);
    }

    fn container_layout(&self) -> Option<ContainerLayout> {
        self.container
    }
}

struct Harness {
    engine: ReorderEngine,
    log: Arc<Mutex<RowLog>>,
    scrolls: mpsc::UnboundedReceiver<(Point, bool)>,
    scroll_enabled: Arc<Mutex<Vec<bool>>>,
    activated: mpsc::UnboundedReceiver<String>,
    released: mpsc::UnboundedReceiver<(usize, usize)>,
    orders: mpsc::UnboundedReceiver<Vec<String>>,
}

fn container(height: f32) -> ContainerLayout {
    ContainerLayout {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height,
        page_x: 0.0,
        page_y: 0.0,
    }
}

fn harness(config: Config, container: ContainerLayout) -> Harness {
    let (scrolls_tx, scrolls) = mpsc::unbounded_channel();
    let scroll_enabled = Arc::new(Mutex::new(Vec::new()));
    let viewport = TestViewport {
        container: Some(container),
        scrolls: scrolls_tx,
        scroll_enabled: Arc::clone(&scroll_enabled),
    };

    let (activated_tx, activated) = mpsc::unbounded_channel();
    let (released_tx, released) = mpsc::unbounded_channel();
    let (orders_tx, orders) = mpsc::unbounded_channel();
    let callbacks = Callbacks {
        on_activate_row: Some(Box::new(move |key: &str| {
            let _ = activated_tx.send(key.to_string());
        })),
        on_press_row: None,
        on_release_row: Some(Box::new(move |from, to| {
            let _ = released_tx.send((from, to));
        })),
        on_change_order: Some(Box::new(move |order| {
            let _ = orders_tx.send(order.keys().to_vec());
        })),
    };

    let (engine, _handle) = ReorderEngine::new(config, Box::new(viewport), callbacks);
    Harness {
        engine,
        log: Arc::new(Mutex::new(RowLog::default())),
        scrolls,
        scroll_enabled,
        activated,
        released,
        orders,
    }
}

impl Harness {
    /// Load a dataset of uniform-height rows and resolve every layout.
    async fn mount_rows(&mut self, keys: &[&str], height: f32) {
        self.engine.handle_command(Command::SetData {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            order: None,
        });
        for key in keys {
            self.engine.handle_command(Command::InsertRow {
                key: key.to_string(),
                handle: Box::new(TestRow {
                    key: key.to_string(),
                    log: Arc::clone(&self.log),
                }),
            });
            self.engine.handle_command(Command::RowLayout {
                key: key.to_string(),
                size: Size::new(100.0, height),
            });
        }
        self.engine.await_layouts().await;
    }

    fn activate(&mut self, key: &str, index: usize, top: f32) {
        self.engine
            .handle_command(Command::Gesture(RowGesture::Activate {
                key: key.to_string(),
                index,
                location: Point::new(0.0, top),
            }));
    }

    fn drag_to(&mut self, top: f32, page_y: f32) {
        self.engine.handle_command(Command::Gesture(RowGesture::Move {
            location: Point::new(0.0, top),
            velocity: Offset::new(0.0, 0.1),
            page_y,
        }));
    }

    fn release(&mut self) {
        self.engine.handle_command(Command::Gesture(RowGesture::Release));
    }
}

// =============================================================================
// Drag and release
// =============================================================================

#[tokio::test]
async fn test_drag_b_to_slot_three_commits_acdb() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c", "d"], 50.0).await;

    h.activate("b", 1, 50.0);
    assert_eq!(h.activated.recv().await.as_deref(), Some("b"));
    assert_eq!(h.engine.active_row(), Some("b"));

    // Drag b's top edge into d's band.
    h.drag_to(160.0, 250.0);

    // c and d shifted up one slot, a untouched at its nominal position.
    {
        let log = h.log.lock().unwrap();
        assert_eq!(log.last_y("c"), Some(50.0));
        assert_eq!(log.last_y("d"), Some(100.0));
        assert_eq!(log.last_y("a"), Some(0.0));
    }

    h.release();
    assert_eq!(h.released.recv().await, Some((1, 3)));
    assert_eq!(h.engine.order().keys(), ["a", "c", "d", "b"]);
    assert_eq!(h.orders.recv().await.unwrap(), ["a", "c", "d", "b"]);
    assert_eq!(h.engine.active_row(), None);
    assert_eq!(h.engine.released_row(), Some("b"));

    // Viewport scrolling: off for the drag, restored on release.
    assert_eq!(*h.scroll_enabled.lock().unwrap(), vec![false, true]);
}

#[tokio::test]
async fn test_drag_up_commits_and_reports_indices() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c", "d"], 50.0).await;

    h.activate("d", 3, 150.0);
    h.drag_to(60.0, 250.0);
    h.release();

    assert_eq!(h.released.recv().await, Some((3, 1)));
    assert_eq!(h.engine.order().keys(), ["a", "d", "b", "c"]);
}

#[tokio::test]
async fn test_release_without_hover_change_keeps_order() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c"], 50.0).await;

    h.activate("b", 1, 50.0);
    h.release();

    assert_eq!(h.released.recv().await, Some((1, 1)));
    assert_eq!(h.engine.order().keys(), ["a", "b", "c"]);
    // No order change, no on_change_order.
    assert!(h.orders.try_recv().is_err());
}

#[tokio::test]
async fn test_fling_moves_are_ignored() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c", "d"], 50.0).await;

    h.activate("b", 1, 50.0);
    h.engine.handle_command(Command::Gesture(RowGesture::Move {
        location: Point::new(0.0, 160.0),
        velocity: Offset::new(0.0, 0.9),
        page_y: 250.0,
    }));
    h.release();

    // The fling never updated the hover index.
    assert_eq!(h.released.recv().await, Some((1, 1)));
    assert_eq!(h.engine.order().keys(), ["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_hover_outside_bands_keeps_previous_hover() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c"], 50.0).await;

    h.activate("a", 0, 0.0);
    h.drag_to(60.0, 250.0);
    // Past the last band: hover stays at 1.
    h.drag_to(400.0, 250.0);
    h.release();

    assert_eq!(h.released.recv().await, Some((0, 1)));
    assert_eq!(h.engine.order().keys(), ["b", "a", "c"]);
}

#[tokio::test]
async fn test_double_activation_is_rejected() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c"], 50.0).await;

    h.activate("a", 0, 0.0);
    h.activate("b", 1, 50.0);

    assert_eq!(h.activated.recv().await.as_deref(), Some("a"));
    assert!(h.activated.try_recv().is_err());
    assert_eq!(h.engine.active_row(), Some("a"));
}

#[tokio::test]
async fn test_activation_ignored_while_sorting_disabled() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b"], 50.0).await;

    h.engine.handle_command(Command::SetSortingEnabled(false));
    h.activate("a", 0, 0.0);
    assert_eq!(h.engine.active_row(), None);

    h.engine.handle_command(Command::SetSortingEnabled(true));
    h.activate("a", 0, 0.0);
    assert_eq!(h.engine.active_row(), Some("a"));
}

#[tokio::test]
async fn test_manual_activation_by_key() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c"], 50.0).await;

    h.engine.handle_command(Command::ActivateRow { key: "c".to_string() });
    assert_eq!(h.activated.recv().await.as_deref(), Some("c"));
    assert_eq!(h.engine.active_row(), Some("c"));
}

// =============================================================================
// Dataset epochs
// =============================================================================

#[tokio::test]
async fn test_dataset_change_drops_session_and_old_layouts() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c"], 50.0).await;

    h.activate("b", 1, 50.0);
    assert_eq!(h.engine.active_row(), Some("b"));

    // New dataset arrives mid-drag; the session is dropped and viewport
    // scrolling comes back.
    h.mount_rows(&["x", "y"], 40.0).await;
    assert_eq!(h.engine.active_row(), None);
    assert_eq!(h.engine.order().keys(), ["x", "y"]);
    assert!(h.scroll_enabled.lock().unwrap().ends_with(&[true]));

    // A release for the dead session is a no-op.
    h.release();
    assert!(h.released.try_recv().is_err());

    // The new epoch is fully usable.
    h.activate("x", 0, 0.0);
    h.drag_to(50.0, 250.0);
    h.release();
    assert_eq!(h.released.recv().await, Some((0, 1)));
    assert_eq!(h.engine.order().keys(), ["y", "x"]);
}

#[tokio::test]
async fn test_set_order_reorders_existing_dataset() {
    let mut h = harness(Config::default(), container(500.0));
    h.mount_rows(&["a", "b", "c"], 50.0).await;

    h.engine.handle_command(Command::SetOrder(vec![
        "c".to_string(),
        "a".to_string(),
        "b".to_string(),
    ]));
    assert_eq!(h.engine.order().keys(), ["c", "a", "b"]);
}

// =============================================================================
// Scroll commands
// =============================================================================

#[tokio::test]
async fn test_scroll_by_and_scroll_to_move_content_offset() {
    let mut h = harness(Config::default(), container(200.0));
    h.mount_rows(&["a", "b", "c", "d", "e", "f"], 50.0).await;

    h.engine.handle_command(Command::ScrollBy { dx: 0.0, dy: 80.0, animated: false });
    assert_eq!(h.scrolls.recv().await, Some((Point::new(0.0, 80.0), false)));

    h.engine.handle_command(Command::ScrollTo { x: 0.0, y: 10.0, animated: true });
    assert_eq!(h.scrolls.recv().await, Some((Point::new(0.0, 10.0), true)));
    assert_eq!(h.engine.content_offset(), Point::new(0.0, 10.0));
}

#[tokio::test]
async fn test_scroll_to_key_only_when_outside_visible_band() {
    let mut h = harness(Config::default(), container(200.0));
    h.mount_rows(&["a", "b", "c", "d", "e", "f"], 50.0).await;

    // 'b' (top = 50) is already visible: no scroll.
    h.engine.handle_command(Command::ScrollToKey { key: "b".to_string(), animated: false });
    assert!(h.scrolls.try_recv().is_err());

    // 'f' (top = 250) is below the fold: scroll to its top.
    h.engine.handle_command(Command::ScrollToKey { key: "f".to_string(), animated: true });
    assert_eq!(h.scrolls.recv().await, Some((Point::new(0.0, 250.0), true)));
}
