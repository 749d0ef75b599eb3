//! Serpentine LED shelf lighting engine.
//!
//! Drives a strip of APA102/SK9822-compatible LEDs over a SPI-like
//! clocked bus and exposes it as a rectangular grid of shelf
//! compartments that can be filled with colors, faded in brightness and
//! animated.
//!
//! Two engines make up the crate. [`LedStrip`] owns the packed per-LED
//! buffer, applies optional gamma and HSV-brightness correction at
//! transmit time and clocks frames out through a pluggable [`Transport`].
//! [`ShelfModel`] maps compartments onto strip ranges through the
//! serpentine [`ShelfLayout`], drives time-based brightness and color
//! transitions and gates a bound [`Animation`] driver.
//!
//! All time-dependent behavior is advanced by explicit `tick` calls with
//! a caller-supplied [`Instant`], so the engine never reads a wall clock
//! and transition math is testable with synthetic time. All mutation is
//! meant to flow through one owner; external bindings post
//! [`ShelfCommand`]s into a shared [`CommandMailbox`] and poll
//! [`ShelfEvent`]s back out.

pub mod animation;
pub mod buffer;
pub mod color;
pub mod command;
pub mod config;
pub mod correction;
pub mod error;
pub mod events;
pub mod gamma;
pub mod layout;
pub mod pixel;
pub mod scheduler;
pub mod shelf;
pub mod strip;
pub mod transition;
pub mod transport;

pub use animation::{Animation, FireAnimation};
pub use buffer::{PixelBuffer, RestoreScope};
pub use color::{BLACK, Rgb, WHITE, blend_colors, color_distance};
pub use command::{CommandMailbox, CommandPoster, Mailbox, ShelfCommand};
pub use config::{ShelfConfig, StripConfig};
pub use correction::CorrectionPipeline;
pub use error::Error;
pub use events::ShelfEvent;
pub use gamma::gamma_lut;
pub use layout::{CompartmentRange, ShelfLayout};
pub use pixel::{MAX_BRIGHTNESS, Pixel};
pub use scheduler::{ShelfScheduler, TickResult};
pub use shelf::ShelfModel;
pub use strip::LedStrip;
pub use transition::{Easing, Transition, scaled_duration};
#[cfg(feature = "hardware")]
pub use transport::SpidevTransport;
pub use transport::{MemoryTransport, Transport};

pub use embassy_time::{Duration, Instant};
