//! Command ingress for the single-writer shelf engine.
//!
//! All shelf mutation funnels through one owner of the [`ShelfModel`];
//! external bindings (HTTP, CLI, GUI glue) post [`ShelfCommand`]s into a
//! shared [`Mailbox`] and the owner drains them at the start of every
//! tick. The mailbox is a fixed-size deque guarded by critical sections,
//! so posting is safe from any context.
//!
//! [`ShelfModel`]: crate::shelf::ShelfModel

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Duration;
use heapless::Deque;

use crate::color::Rgb;
use crate::layout::ShelfLayout;

/// A requested change to the shelf state. Commands are applied in
/// posting order on the next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShelfCommand {
    SetEnabled(bool),
    /// Overall brightness, 0.0..=1.0.
    SetBrightness(f32),
    /// Fill every compartment with one color.
    SetAverageColor(Rgb),
    /// Paint a single compartment.
    SetCompartmentColor { compartment: usize, color: Rgb },
    SetAnimating(bool),
    SetLayout(ShelfLayout),
    SetTransitionDuration(Duration),
    SetBrightnessTransitions(bool),
    SetColorTransitions(bool),
}

/// Error returned when posting to a full mailbox; carries the rejected
/// value back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxFull<T>(pub T);

/// A bounded, critical-section-protected command queue.
pub struct Mailbox<T, const N: usize> {
    slots: Mutex<RefCell<Deque<T, N>>>,
}

impl<T, const N: usize> Mailbox<T, N> {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Post a value. Fails when the mailbox is full; nothing is dropped.
    pub fn post(&self, value: T) -> Result<(), MailboxFull<T>> {
        critical_section::with(|cs| {
            self.slots
                .borrow(cs)
                .borrow_mut()
                .push_back(value)
                .map_err(MailboxFull)
        })
    }

    /// Take the oldest posted value, if any.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.slots.borrow(cs).borrow_mut().pop_front())
    }

    /// A lightweight posting handle for producers.
    pub const fn poster(&self) -> Poster<'_, T, N> {
        Poster { mailbox: self }
    }
}

impl<T, const N: usize> Default for Mailbox<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable posting handle for a [`Mailbox`].
#[derive(Clone, Copy)]
pub struct Poster<'a, T, const N: usize> {
    mailbox: &'a Mailbox<T, N>,
}

impl<T, const N: usize> Poster<'_, T, N> {
    pub fn post(&self, value: T) -> Result<(), MailboxFull<T>> {
        self.mailbox.post(value)
    }
}

/// Type alias for the shelf command mailbox.
pub type CommandMailbox<const N: usize> = Mailbox<ShelfCommand, N>;

/// Type alias for a shelf command poster.
pub type CommandPoster<'a, const N: usize> = Poster<'a, ShelfCommand, N>;
