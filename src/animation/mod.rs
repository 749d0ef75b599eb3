//! The animation driver contract and its run-state controller.
//!
//! An animation is any type that paints frames into the strip's pixel
//! buffer on a periodic clock. Drivers are handed the buffer on every
//! frame, control their own frame interval (it may change between
//! frames), and are started, stopped and queried through the controller
//! owned by the shelf. The shelf signals frame completion to observers
//! exactly once per painted frame, before the next frame begins.

mod fire;

use embassy_time::{Duration, Instant};
pub use fire::FireAnimation;

use crate::buffer::PixelBuffer;

/// A pluggable LED strip animation.
pub trait Animation {
    /// Human-readable name of this animation.
    fn name(&self) -> &str;

    /// Interval until the next frame is due.
    fn frame_interval(&self) -> Duration;

    /// Change the frame interval, effective from the next frame.
    fn set_frame_interval(&mut self, interval: Duration);

    /// Paint one frame into the strip's pixel buffer.
    fn paint(&mut self, now: Instant, pixels: &mut PixelBuffer);
}

/// Gates whether the bound driver runs and paces its frames.
///
/// At most one driver is bound at a time; clearing the binding stops it.
pub(crate) struct AnimationController {
    driver: Option<Box<dyn Animation>>,
    running: bool,
    next_frame: Instant,
}

impl AnimationController {
    pub(crate) const fn new() -> Self {
        Self {
            driver: None,
            running: false,
            next_frame: Instant::from_millis(0),
        }
    }

    pub(crate) fn bind(&mut self, driver: Box<dyn Animation>) {
        self.running = false;
        self.driver = Some(driver);
    }

    pub(crate) fn clear(&mut self) -> Option<Box<dyn Animation>> {
        self.running = false;
        self.driver.take()
    }

    pub(crate) fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    pub(crate) fn driver_name(&self) -> Option<&str> {
        self.driver.as_deref().map(Animation::name)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    /// Start the driver; the first frame paints on the next tick.
    pub(crate) fn start(&mut self, now: Instant) {
        self.running = true;
        self.next_frame = now;
    }

    pub(crate) fn stop(&mut self) {
        self.running = false;
    }

    /// Paint a frame if one is due. Returns whether a frame completed.
    pub(crate) fn tick(&mut self, now: Instant, pixels: &mut PixelBuffer) -> bool {
        if !self.running {
            return false;
        }
        let Some(driver) = self.driver.as_mut() else {
            return false;
        };
        if now < self.next_frame {
            return false;
        }

        driver.paint(now, pixels);
        self.next_frame = now + driver.frame_interval();
        true
    }
}
