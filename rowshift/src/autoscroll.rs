//! Edge-zone autoscroll: a cancellable periodic process that scrolls the
//! viewport while the pointer sits near the container's top or bottom edge.
//!
//! The controller owns its tick schedule and policies; the engine's run loop
//! arms a sleep on [`Autoscroll::deadline`] and calls [`Autoscroll::on_tick`]
//! when it fires. Cancellation is dropping the controller, so a timer can
//! never leak. Stopping — for any reason — is always followed by a settle of
//! the row displacement, because continuous scrolling otherwise desynchronizes
//! the visuals from the hover computation.

use std::time::Duration;

use tokio::time::Instant;

/// Tick period of the autoscroll loop.
pub const AUTOSCROLL_INTERVAL: Duration = Duration::from_millis(100);

/// Step size for the first ticks of a run.
pub const SLOW_STEP: f32 = 30.0;
/// Step size once the run has accelerated.
pub const FAST_STEP: f32 = 60.0;
/// Tick index after which the step accelerates.
const ACCELERATE_AFTER: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn sign(self) -> f32 {
        match self {
            ScrollDirection::Up => -1.0,
            ScrollDirection::Down => 1.0,
        }
    }
}

/// Scroll state sampled by the engine right before each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub content_offset_y: f32,
    pub content_height: f32,
    pub container_height: f32,
}

impl ScrollMetrics {
    /// Largest valid content offset.
    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.container_height).max(0.0)
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Scroll the viewport by this signed vertical delta and move the active
    /// row along with it.
    Scroll(f32),
    /// The content boundary was reached; stop and settle.
    Stop,
}

type ContinuePolicy = Box<dyn Fn(&ScrollMetrics) -> bool + Send>;
type StepPolicy = Box<dyn Fn(&ScrollMetrics, u32) -> f32 + Send>;

/// An in-flight autoscroll run.
pub struct Autoscroll {
    direction: ScrollDirection,
    ticks: u32,
    deadline: Instant,
    should_continue: ContinuePolicy,
    next_step: StepPolicy,
}

impl Autoscroll {
    /// Build the controller for one direction. The policies capture the
    /// direction's boundary: upward runs stop at offset 0, downward runs at
    /// `content_height - container_height`, and the step is clamped so the
    /// final tick lands exactly on the boundary instead of overshooting.
    pub fn new(direction: ScrollDirection) -> Self {
        let should_continue: ContinuePolicy = match direction {
            ScrollDirection::Up => Box::new(|m| m.content_offset_y > 0.0),
            ScrollDirection::Down => Box::new(|m| m.content_offset_y < m.max_offset()),
        };
        let next_step: StepPolicy = match direction {
            ScrollDirection::Up => Box::new(|m, tick| base_step(tick).min(m.content_offset_y)),
            ScrollDirection::Down => {
                Box::new(|m, tick| base_step(tick).min(m.max_offset() - m.content_offset_y))
            }
        };

        Self {
            direction,
            ticks: 0,
            deadline: Instant::now() + AUTOSCROLL_INTERVAL,
            should_continue,
            next_step,
        }
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    /// When the next tick is due.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether a run in this direction has anywhere to go right now. Checked
    /// before starting so a run at the boundary is never created.
    pub fn can_scroll(&self, metrics: &ScrollMetrics) -> bool {
        (self.should_continue)(metrics)
    }

    /// Process one tick and arm the next deadline.
    pub fn on_tick(&mut self, metrics: &ScrollMetrics) -> Tick {
        if !(self.should_continue)(metrics) {
            return Tick::Stop;
        }

        let step = (self.next_step)(metrics, self.ticks);
        self.ticks += 1;
        self.deadline += AUTOSCROLL_INTERVAL;
        Tick::Scroll(self.direction.sign() * step)
    }
}

impl std::fmt::Debug for Autoscroll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autoscroll")
            .field("direction", &self.direction)
            .field("ticks", &self.ticks)
            .finish()
    }
}

/// Unclamped step for a tick index: slow for the first four ticks, fast after.
fn base_step(tick: u32) -> f32 {
    if tick > ACCELERATE_AFTER { FAST_STEP } else { SLOW_STEP }
}
