//! Shelf geometry and the serpentine compartment-to-LED mapping.
//!
//! The strip is wired boustrophedon across the shelf boards, starting at
//! the bottom: wiring row 0 holds LEDs `0..row_length`, and each row
//! above continues where the previous one turned around. Compartment
//! indices are logical and row-major from the top-left.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

/// Shelf grid geometry.
///
/// `density` is the number of LEDs behind one compartment; consecutive
/// compartments in a row are separated by `wall_thickness` LEDs sitting
/// behind the divider boards, which are kept dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfLayout {
    pub rows: usize,
    pub columns: usize,
    pub density: usize,
    pub wall_thickness: usize,
}

impl Default for ShelfLayout {
    fn default() -> Self {
        Self {
            rows: 4,
            columns: 5,
            density: 20,
            wall_thickness: 1,
        }
    }
}

impl ShelfLayout {
    /// Clamp all fields to their minimums, warning about every
    /// adjustment. Geometry is never rejected outright.
    pub fn sanitized(self) -> Self {
        let clamp = |name: &str, value: usize, min: usize| {
            if value < min {
                warn!(value, min, "{name} below minimum, clamping");
                min
            } else {
                value
            }
        };
        Self {
            rows: clamp("rows", self.rows, 1),
            columns: clamp("columns", self.columns, 1),
            density: clamp("density", self.density, 1),
            wall_thickness: self.wall_thickness,
        }
    }

    /// LEDs in one wired row: the compartments plus the walls between
    /// them.
    pub const fn row_length(&self) -> usize {
        self.columns * self.density + (self.columns - 1) * self.wall_thickness
    }

    /// Total LEDs behind the shelf. The strip driving this layout must
    /// have exactly this count.
    pub const fn led_count(&self) -> usize {
        self.row_length() * self.rows
    }

    pub const fn compartment_count(&self) -> usize {
        self.rows * self.columns
    }

    /// The inclusive LED range behind one compartment.
    ///
    /// Compartment 0 is the logical top-left; the wiring origin is the
    /// bottom of the shelf, so logical rows are flipped onto wiring rows
    /// and even wiring rows are traversed mirrored.
    pub fn compartment_range(&self, compartment: usize) -> Result<CompartmentRange, Error> {
        let count = self.compartment_count();
        if compartment >= count {
            warn!(compartment, count, "compartment index out of bounds");
            return Err(Error::IndexOutOfBounds {
                index: compartment,
                count,
            });
        }

        let row = compartment / self.columns;
        let column = compartment % self.columns;
        let wiring_row = self.rows - 1 - row;
        let index_in_row = if wiring_row % 2 == 0 {
            self.columns - 1 - column
        } else {
            column
        };

        let first = wiring_row * self.row_length()
            + index_in_row * (self.density + self.wall_thickness);
        Ok(CompartmentRange {
            first,
            last: first + self.density - 1,
        })
    }
}

/// Inclusive LED index range of one compartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompartmentRange {
    pub first: usize,
    pub last: usize,
}

impl CompartmentRange {
    pub const fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}
