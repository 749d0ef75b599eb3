//! Time-based value transitions.
//!
//! A [`Transition`] interpolates between two values of some copyable
//! type using a blender function, driven by explicit `tick` calls with
//! an externally supplied clock. On the tick that reaches the duration
//! the exact target value is committed, so floating-point interpolation
//! error can never leave a visible residual.

use embassy_time::{Duration, Instant};

use crate::color::{Rgb, blend_colors};

/// Blends two values of type `T` using a progress value (0.0..=1.0).
pub type Blender<T> = fn(T, T, f32) -> T;

/// Progress curve applied to the linear elapsed fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    InOutQuad,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
        }
    }
}

/// Smallest fraction of the base duration a transition may take.
///
/// Keeps a change with coinciding endpoints from degenerating into a
/// zero-duration "transition" that observers would miss entirely.
pub const MIN_TRANSITION_MAGNITUDE: f32 = 0.1;

/// Scale a base duration by the normalized magnitude of the change,
/// floored at [`MIN_TRANSITION_MAGNITUDE`].
pub fn scaled_duration(base: Duration, magnitude: f32) -> Duration {
    let magnitude = magnitude.clamp(MIN_TRANSITION_MAGNITUDE, 1.0);
    Duration::from_millis(libm::roundf(base.as_millis() as f32 * magnitude) as u64)
}

/// Transition for values of type `T`.
#[derive(Debug, Clone)]
pub struct Transition<T: Copy> {
    /// Blender function
    blend: Blender<T>,
    /// Current interpolated value
    current: T,
    /// Value at the start of the transition
    source: T,
    /// Target value (None if no transition in progress)
    target: Option<T>,
    /// Total transition duration
    duration: Duration,
    /// Time at which the transition started
    start_time: Instant,
    easing: Easing,
}

impl<T: Copy> Transition<T> {
    pub const fn new(initial: T, blend: Blender<T>) -> Self {
        Self {
            blend,
            current: initial,
            source: initial,
            target: None,
            duration: Duration::from_millis(0),
            start_time: Instant::from_millis(0),
            easing: Easing::Linear,
        }
    }

    pub const fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub const fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    /// Get the current value.
    pub const fn current(&self) -> T {
        self.current
    }

    /// The end value of an in-flight transition.
    pub const fn target(&self) -> Option<T> {
        self.target
    }

    /// Check if a transition is in progress.
    pub const fn is_transitioning(&self) -> bool {
        self.target.is_some()
    }

    /// Transition from the current value to `value`. A zero duration
    /// applies immediately.
    pub fn set(&mut self, value: T, duration: Duration, now: Instant) {
        let source = self.current;
        self.start(source, value, duration, now);
    }

    /// Transition between two explicit endpoints, discarding the current
    /// value. A zero duration applies immediately.
    pub fn start(&mut self, from: T, to: T, duration: Duration, now: Instant) {
        self.start_time = now;
        if duration.as_millis() == 0 {
            self.current = to;
            self.source = to;
            self.target = None;
            self.duration = Duration::from_millis(0);
        } else {
            self.current = from;
            self.source = from;
            self.target = Some(to);
            self.duration = duration;
        }
    }

    /// Cancel an in-flight transition, keeping whatever value was last
    /// committed. The target is not applied.
    pub fn abort(&mut self) {
        self.source = self.current;
        self.target = None;
    }

    /// Advance the transition. Returns `true` on the tick that commits
    /// the exact end value.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let elapsed = now.duration_since(self.start_time);
        if elapsed >= self.duration {
            self.current = target;
            self.source = target;
            self.target = None;
            return true;
        }

        let progress = elapsed.as_millis() as f32 / self.duration.as_millis() as f32;
        self.current = (self.blend)(self.source, target, self.easing.apply(progress));
        false
    }
}

impl Transition<f32> {
    /// Transition over a normalized 0.0..=1.0 level.
    pub const fn new_level(initial: f32) -> Self {
        Self::new(initial, blend_level)
    }
}

impl Transition<Rgb> {
    /// Transition over an RGB color.
    pub const fn new_color(initial: Rgb) -> Self {
        Self::new(initial, blend_colors)
    }
}

/// Linear interpolation between two levels.
pub fn blend_level(a: f32, b: f32, amount_of_b: f32) -> f32 {
    a + (b - a) * amount_of_b
}
