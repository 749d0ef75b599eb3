//! Change notifications for shelf observers.
//!
//! The shelf pushes events into a bounded queue that the embedder polls
//! between ticks. Events are observational only and never alter control
//! flow; when the queue overflows the oldest entry is dropped.

use heapless::Deque;

use crate::color::Rgb;

/// Capacity of the event queue.
pub const EVENT_QUEUE_DEPTH: usize = 32;

/// A change on the shelf worth relaying to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShelfEvent {
    EnabledChanged(bool),
    BrightnessChanged(f32),
    AverageColorChanged(Rgb),
    /// Compartment contents changed; views should repaint.
    CompartmentsChanged,
    AnimatingChanged(bool),
    /// An animation driver finished painting a frame.
    FrameComplete,
}

#[derive(Debug)]
pub(crate) struct EventQueue {
    inner: Deque<ShelfEvent, EVENT_QUEUE_DEPTH>,
}

impl EventQueue {
    pub(crate) const fn new() -> Self {
        Self { inner: Deque::new() }
    }

    pub(crate) fn push(&mut self, event: ShelfEvent) {
        if self.inner.is_full() {
            self.inner.pop_front();
        }
        let _ = self.inner.push_back(event);
    }

    pub(crate) fn poll(&mut self) -> Option<ShelfEvent> {
        self.inner.pop_front()
    }
}
