//! The shelf engine: grid-level business logic over the LED strip.
//!
//! Maps compartments onto strip ranges through [`ShelfLayout`], drives
//! brightness and color transitions, and gates the bound animation
//! driver. All mutation funnels through one owner: commands posted to
//! the shared mailbox are drained at the start of every `tick`, and the
//! tick is the only source of time-based mutation.
//!
//! The shelf's enabled flag governs the painted brightness (a disabled
//! shelf is faded to zero); the strip's own enable/connect state machine
//! is managed separately by the embedder.

use embassy_time::{Duration, Instant};
use tracing::{error, warn};

use crate::animation::{Animation, AnimationController};
use crate::buffer::RestoreScope;
use crate::color::{BLACK, Rgb, WHITE, color_distance, quadratic_channel_mean};
use crate::command::{CommandMailbox, ShelfCommand};
use crate::config::ShelfConfig;
use crate::error::Error;
use crate::events::{EventQueue, ShelfEvent};
use crate::layout::ShelfLayout;
use crate::pixel::MAX_BRIGHTNESS;
use crate::strip::LedStrip;
use crate::transition::{Easing, Transition, scaled_duration};
use crate::transport::Transport;

/// The shelf model over a strip behind transport `T`, draining commands
/// from a mailbox of depth `C`.
pub struct ShelfModel<'a, T: Transport, const C: usize> {
    strip: LedStrip<T>,
    commands: &'a CommandMailbox<C>,
    events: EventQueue,
    layout: ShelfLayout,
    enabled: bool,
    brightness: f32,
    brightness_transitions: bool,
    color_transitions: bool,
    transition_duration: Duration,
    /// Requested fill color; reported while a color fade is in flight.
    average_color: Rgb,
    brightness_transition: Transition<f32>,
    color_transition: Transition<Rgb>,
    animation: AnimationController,
    pending_brightness_transition: bool,
    animating: bool,
}

impl<'a, T: Transport, const C: usize> ShelfModel<'a, T, C> {
    /// Create the shelf over `strip`, resizing it to match the layout
    /// and painting the initial white fill.
    pub fn new(
        mut strip: LedStrip<T>,
        commands: &'a CommandMailbox<C>,
        config: &ShelfConfig,
    ) -> Self {
        let layout = config.layout.sanitized();
        if let Err(err) = strip.set_count(layout.led_count()) {
            error!("unable to size strip for shelf layout: {err}");
        }

        let brightness = clamp_brightness(config.brightness);
        let mut shelf = Self {
            strip,
            commands,
            events: EventQueue::new(),
            layout,
            enabled: false,
            brightness,
            brightness_transitions: config.brightness_transitions,
            color_transitions: config.color_transitions,
            transition_duration: Duration::from_millis(config.transition_duration_ms),
            average_color: WHITE,
            brightness_transition: Transition::new_level(0.0),
            color_transition: Transition::new_color(WHITE),
            animation: AnimationController::new(),
            pending_brightness_transition: false,
            animating: false,
        };

        shelf.set_ranges_to_color(WHITE);
        shelf.sync_brightness(true);
        shelf
    }

    /// Advance the engine: drain pending commands, step the transitions,
    /// and paint a due animation frame.
    pub fn tick(&mut self, now: Instant) {
        self.drain_commands(now);
        self.tick_transitions(now);
        self.tick_animation(now);
    }

    /// Take the oldest pending change notification.
    pub fn poll_event(&mut self) -> Option<ShelfEvent> {
        self.events.poll()
    }

    pub fn strip(&self) -> &LedStrip<T> {
        &self.strip
    }

    /// Direct strip access for the embedder's painting API bindings.
    pub fn strip_mut(&mut self) -> &mut LedStrip<T> {
        &mut self.strip
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the shelf, fading brightness when transitions
    /// are on. Enabling a shelf that is painted fully black repaints it
    /// white first so enabling never leads to a dark no-op.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.abort_transitions();

        if enabled && !self.animating && self.computed_average_color() == BLACK {
            self.average_color = WHITE;
            self.set_ranges_to_color(WHITE);
            self.strip.show();
            self.events.push(ShelfEvent::AverageColorChanged(WHITE));
        }

        if enabled && self.animating {
            // Hold the fade until the first animation frame has painted,
            // so the white default fill never flashes through.
            self.pending_brightness_transition = true;
            self.update_animation(now);
        } else if self.brightness_transitions {
            // The animation (if any) keeps running through a fade-out
            // and is stopped when the transition completes.
            self.transition_to_current_brightness(now);
        } else {
            self.sync_brightness(false);
            self.update_animation(now);
            self.strip.show();
            self.events.push(ShelfEvent::CompartmentsChanged);
        }

        self.events.push(ShelfEvent::EnabledChanged(enabled));
    }

    pub fn layout(&self) -> ShelfLayout {
        self.layout
    }

    /// Change the grid geometry. Invalid fields are clamped with a
    /// warning. The strip is resized to match and repainted.
    pub fn set_layout(&mut self, layout: ShelfLayout) -> Result<(), Error> {
        let layout = layout.sanitized();
        if self.layout == layout {
            return Ok(());
        }
        self.layout = layout;
        self.strip.set_count(layout.led_count())?;

        if !self.animating {
            let color = self.average_color;
            self.set_ranges_to_color(color);
        }
        self.sync_brightness(true);

        self.events.push(ShelfEvent::CompartmentsChanged);
        self.events
            .push(ShelfEvent::AverageColorChanged(self.average_color()));
        Ok(())
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Set the overall brightness (0.0..=1.0, clamped with a warning).
    /// A positive brightness implicitly enables the shelf. With
    /// transitions on, fades from the strip's current average level;
    /// the duration scales with the size of the change.
    pub fn set_brightness(&mut self, value: f32, now: Instant) {
        let value = clamp_brightness(value);
        if self.brightness == value {
            return;
        }

        if self.brightness_transitions {
            self.brightness_transition.abort();

            // Enable first: it syncs the previous brightness, so the
            // fade starts from where the strip actually is.
            if value > 0.0 {
                self.set_enabled(true, now);
            }

            self.brightness = value;
            let current = self.current_average_brightness();
            let duration = scaled_duration(self.transition_duration, (value - current).abs());
            self.brightness_transition.start(current, value, duration, now);
        } else {
            self.brightness = value;
            if self.enabled {
                self.sync_brightness(true);
                self.events.push(ShelfEvent::CompartmentsChanged);
            } else {
                self.set_enabled(true, now);
            }
        }

        self.events.push(ShelfEvent::BrightnessChanged(value));
    }

    pub fn brightness_transitions(&self) -> bool {
        self.brightness_transitions
    }

    /// Toggle brightness fading. Turning it off mid-fade completes the
    /// fade instantly.
    pub fn set_brightness_transitions(&mut self, animate: bool) {
        if self.brightness_transitions == animate {
            return;
        }
        self.brightness_transitions = animate;

        if !animate && self.brightness_transition.is_transitioning() {
            self.brightness_transition.abort();
            self.sync_brightness(true);
            self.events.push(ShelfEvent::CompartmentsChanged);
        }
    }

    pub fn color_transitions(&self) -> bool {
        self.color_transitions
    }

    /// Toggle color crossfades. Turning it off mid-fade jumps to the
    /// fade's target fill.
    pub fn set_color_transitions(&mut self, animate: bool) {
        if self.color_transitions == animate {
            return;
        }
        self.color_transitions = animate;

        if !animate && self.color_transition.is_transitioning() {
            self.color_transition.abort();
            let color = self.average_color;
            self.set_ranges_to_color(color);
            if self.enabled {
                self.strip.show();
            }
            self.events.push(ShelfEvent::CompartmentsChanged);
        }
    }

    pub fn transition_duration(&self) -> Duration {
        self.transition_duration
    }

    /// Base duration of a full-magnitude transition.
    pub fn set_transition_duration(&mut self, duration: Duration) {
        self.transition_duration = duration;
    }

    /// Progress curve used by both transition axes.
    pub fn set_transition_easing(&mut self, easing: Easing) {
        self.brightness_transition.set_easing(easing);
        self.color_transition.set_easing(easing);
    }

    /// The shelf's average color: the quadratic mean over all
    /// compartment averages, or the fade target while a color
    /// transition is in flight.
    pub fn average_color(&self) -> Rgb {
        if self.color_transition.is_transitioning() {
            return self.average_color;
        }
        self.computed_average_color()
    }

    /// Fill every compartment with one color, crossfading when color
    /// transitions are on. Painting black while enabled implicitly
    /// disables the shelf; painting any other color implicitly enables
    /// it.
    pub fn set_average_color(&mut self, color: Rgb, now: Instant) {
        if self.average_color() == color {
            return;
        }
        self.average_color = color;

        let was_animating = self.animating;
        if was_animating {
            // Don't let the stop briefly restore the pre-animation fill
            // under the new color.
            self.strip.forget_saved();
            self.set_animating(false, now);
        }

        if self.color_transitions && self.enabled && color != BLACK {
            if was_animating {
                // Paint the stopped animation's aftermath as the
                // crossfade baseline.
                let baseline = self.computed_average_color();
                self.set_ranges_to_color(baseline);
                self.strip.show();
                self.events.push(ShelfEvent::CompartmentsChanged);
            }

            let from = self.computed_average_color();
            let duration = scaled_duration(self.transition_duration, color_distance(from, color));
            self.color_transition.start(from, color, duration, now);
        } else {
            self.set_ranges_to_color(color);

            if color == BLACK {
                if self.enabled {
                    self.set_enabled(false, now);
                } else {
                    self.events.push(ShelfEvent::CompartmentsChanged);
                }
            } else if self.enabled {
                self.strip.show();
                self.events.push(ShelfEvent::CompartmentsChanged);
            } else {
                self.set_enabled(true, now);
            }
        }

        self.events
            .push(ShelfEvent::AverageColorChanged(self.average_color()));
    }

    pub fn compartment_count(&self) -> usize {
        self.layout.compartment_count()
    }

    /// Average color of one compartment. A disabled shelf reads black.
    pub fn compartment_color(&self, compartment: usize) -> Result<Rgb, Error> {
        let range = self.layout.compartment_range(compartment)?;
        if !self.enabled {
            return Ok(BLACK);
        }
        self.strip.average_color(range.first, range.last)
    }

    /// Average brightness of one compartment as a 0.0..=1.0 fraction.
    pub fn compartment_brightness(&self, compartment: usize) -> Result<f32, Error> {
        let range = self.layout.compartment_range(compartment)?;
        let average = self.strip.average_brightness(range.first, range.last)?;
        Ok(f32::from(average) / f32::from(MAX_BRIGHTNESS))
    }

    /// Paint one compartment. Stops a running animation; painting the
    /// shelf fully black implicitly disables it, anything else enables.
    pub fn set_compartment_color(
        &mut self,
        compartment: usize,
        color: Rgb,
        now: Instant,
    ) -> Result<(), Error> {
        let range = self.layout.compartment_range(compartment)?;
        if self.strip.average_color(range.first, range.last)? == color {
            return Ok(());
        }

        if self.animating {
            self.set_animating(false, now);
        }

        self.strip.set_color_range(range.first, range.last, color)?;
        self.strip.show();

        if self.computed_average_color() == BLACK {
            self.set_enabled(false, now);
        } else if self.enabled {
            self.events.push(ShelfEvent::CompartmentsChanged);
        } else {
            self.set_enabled(true, now);
        }

        self.events
            .push(ShelfEvent::AverageColorChanged(self.average_color()));
        Ok(())
    }

    pub fn animating(&self) -> bool {
        self.animating
    }

    /// Whether the bound driver is actually painting frames right now
    /// (it keeps running through a fade-out after disabling).
    pub fn animation_running(&self) -> bool {
        self.animation.is_running()
    }

    /// Start or stop the bound animation. Starting implicitly enables
    /// the shelf.
    pub fn set_animating(&mut self, animating: bool, now: Instant) {
        if self.animating == animating {
            return;
        }
        self.animating = animating;

        if animating && !self.enabled {
            self.set_enabled(true, now);
        } else {
            self.update_animation(now);
        }

        self.events.push(ShelfEvent::AnimatingChanged(animating));
    }

    /// Bind an animation driver, replacing any previous binding.
    pub fn bind_animation(&mut self, driver: Box<dyn Animation>, now: Instant) {
        self.animation.bind(driver);
        self.update_animation(now);
    }

    /// Remove the animation binding. Forces `animating` off; the
    /// teardown hook for a driver about to disappear.
    pub fn clear_animation(&mut self, now: Instant) -> Option<Box<dyn Animation>> {
        let driver = self.animation.clear();
        if driver.is_some() {
            self.set_animating(false, now);
        }
        driver
    }

    pub fn animation_name(&self) -> Option<&str> {
        self.animation.driver_name()
    }

    pub fn brightness_transitioning(&self) -> bool {
        self.brightness_transition.is_transitioning()
    }

    pub fn color_transitioning(&self) -> bool {
        self.color_transition.is_transitioning()
    }

    fn drain_commands(&mut self, now: Instant) {
        while let Some(command) = self.commands.take() {
            match command {
                ShelfCommand::SetEnabled(enabled) => self.set_enabled(enabled, now),
                ShelfCommand::SetBrightness(value) => self.set_brightness(value, now),
                ShelfCommand::SetAverageColor(color) => self.set_average_color(color, now),
                ShelfCommand::SetCompartmentColor { compartment, color } => {
                    if let Err(err) = self.set_compartment_color(compartment, color, now) {
                        warn!("rejected compartment paint: {err}");
                    }
                }
                ShelfCommand::SetAnimating(animating) => self.set_animating(animating, now),
                ShelfCommand::SetLayout(layout) => {
                    if let Err(err) = self.set_layout(layout) {
                        error!("layout change failed: {err}");
                    }
                }
                ShelfCommand::SetTransitionDuration(duration) => {
                    self.set_transition_duration(duration);
                }
                ShelfCommand::SetBrightnessTransitions(animate) => {
                    self.set_brightness_transitions(animate);
                }
                ShelfCommand::SetColorTransitions(animate) => {
                    self.set_color_transitions(animate);
                }
            }
        }
    }

    fn tick_transitions(&mut self, now: Instant) {
        if self.brightness_transition.is_transitioning() {
            let completed = self.brightness_transition.tick(now);
            self.sync_brightness(true);
            self.events.push(ShelfEvent::CompartmentsChanged);

            // A fade to black finishing is the moment to stop a still-
            // running animation.
            if completed && !self.enabled {
                self.update_animation(now);
            }
        }

        if self.color_transition.is_transitioning() {
            self.color_transition.tick(now);
            let color = self.color_transition.current();
            self.set_ranges_to_color(color);
            self.strip.show();
            self.events.push(ShelfEvent::CompartmentsChanged);
        }
    }

    fn tick_animation(&mut self, now: Instant) {
        if !self.animation.tick(now, self.strip.buffer_mut()) {
            return;
        }
        self.strip.show();
        self.events.push(ShelfEvent::FrameComplete);

        if self.enabled {
            self.events.push(ShelfEvent::CompartmentsChanged);
            self.events
                .push(ShelfEvent::AverageColorChanged(self.average_color()));

            if self.pending_brightness_transition {
                self.transition_to_current_brightness(now);
                self.pending_brightness_transition = false;
            }
        }
    }

    /// Start or stop the driver according to the enabled/animating
    /// state. Starting snapshots the buffer so stopping can restore the
    /// painted colors exactly; brightness stays under the fade engine's
    /// control throughout.
    fn update_animation(&mut self, now: Instant) {
        if !self.animation.has_driver() {
            return;
        }

        if self.enabled && self.animating {
            if !self.animation.is_running() {
                if let Err(err) = self.strip.save() {
                    error!("unable to save strip data before animating: {err}");
                }
                if self.pending_brightness_transition {
                    // Pre-darken so the first frame fades in instead of
                    // flashing the default fill.
                    let level = if self.enabled { 0.0 } else { self.brightness };
                    self.apply_brightness_level(level);
                }
                self.animation.start(now);
            }
        } else if !self.brightness_transition.is_transitioning() {
            if self.animation.is_running() {
                self.animation.stop();
                if self.strip.restore(RestoreScope::Color).is_ok() {
                    self.strip.show();
                }
                self.events.push(ShelfEvent::CompartmentsChanged);
                self.events
                    .push(ShelfEvent::AverageColorChanged(self.average_color()));
            }
        }
    }

    fn transition_to_current_brightness(&mut self, now: Instant) {
        let (from, to) = if self.enabled {
            (0.0, self.brightness)
        } else {
            (self.brightness, 0.0)
        };
        let duration = scaled_duration(self.transition_duration, (to - from).abs());
        self.brightness_transition.start(from, to, duration, now);
    }

    /// Write the effective brightness to the whole strip: the in-flight
    /// fade value while transitioning, otherwise the configured level
    /// (zero when disabled).
    fn sync_brightness(&mut self, show: bool) {
        let level = if self.brightness_transition.is_transitioning() {
            self.brightness_transition.current()
        } else if self.enabled {
            self.brightness
        } else {
            0.0
        };
        self.apply_brightness_level(level);
        if show {
            self.strip.show();
        }
    }

    fn apply_brightness_level(&mut self, level: f32) {
        let value = libm::roundf(f32::from(MAX_BRIGHTNESS) * level) as u8;
        let last = self.strip.count() - 1;
        if let Err(err) = self.strip.set_brightness_range(0, last, value) {
            error!("unable to apply shelf brightness: {err}");
        }
    }

    /// Repaint every compartment range with `color`, leaving the wall
    /// LEDs dark.
    fn set_ranges_to_color(&mut self, color: Rgb) {
        self.strip.clear();
        for compartment in 0..self.layout.compartment_count() {
            if let Ok(range) = self.layout.compartment_range(compartment) {
                let _ = self.strip.set_color_range(range.first, range.last, color);
            }
        }
    }

    /// Cancel in-flight transitions, keeping whatever intermediate
    /// values were last committed to the strip.
    fn abort_transitions(&mut self) {
        self.color_transition.abort();
        self.brightness_transition.abort();
    }

    fn computed_average_color(&self) -> Rgb {
        let compartments = self.layout.compartment_count() as u64;
        let mut r = 0u64;
        let mut g = 0u64;
        let mut b = 0u64;
        for compartment in 0..self.layout.compartment_count() {
            let Ok(range) = self.layout.compartment_range(compartment) else {
                continue;
            };
            let Ok(color) = self.strip.average_color(range.first, range.last) else {
                continue;
            };
            r += u64::from(color.r) * u64::from(color.r);
            g += u64::from(color.g) * u64::from(color.g);
            b += u64::from(color.b) * u64::from(color.b);
        }
        Rgb {
            r: quadratic_channel_mean(r, compartments),
            g: quadratic_channel_mean(g, compartments),
            b: quadratic_channel_mean(b, compartments),
        }
    }

    fn current_average_brightness(&self) -> f32 {
        let compartments = self.layout.compartment_count();
        let mut sum = 0.0f32;
        for compartment in 0..compartments {
            let Ok(range) = self.layout.compartment_range(compartment) else {
                continue;
            };
            let Ok(average) = self.strip.average_brightness(range.first, range.last) else {
                continue;
            };
            sum += f32::from(average);
        }
        (sum / compartments as f32) / f32::from(MAX_BRIGHTNESS)
    }
}

fn clamp_brightness(value: f32) -> f32 {
    if !(0.0..=1.0).contains(&value) {
        warn!(value, "brightness outside 0.0..=1.0, clamping");
    }
    value.clamp(0.0, 1.0)
}
