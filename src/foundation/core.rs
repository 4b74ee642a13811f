use std::fmt;

use crate::foundation::error::{SandError, SandResult};

pub use kurbo::Point;

/// A location on the table in polar form.
///
/// `theta` is in radians and is never wrapped: a value past `2*pi` encodes extra turns of a
/// spiral. `rho` is the normalized radius, nominally `[0, 1]`, and is never clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PolarPosition {
    /// Angle in radians, unbounded.
    pub theta: f64,
    /// Normalized radius, `0` at the table centre and `1` at the usable rim.
    pub rho: f64,
}

impl PolarPosition {
    /// Table centre.
    pub const ORIGIN: Self = Self {
        theta: 0.0,
        rho: 0.0,
    };

    /// Create a position from `theta` (radians) and normalized `rho`.
    pub const fn new(theta: f64, rho: f64) -> Self {
        Self { theta, rho }
    }

    /// Straight-line distance to `other`, via the law of cosines in polar form.
    ///
    /// The result is in normalized radius units.
    pub fn distance(self, other: Self) -> f64 {
        let sq = self.rho * self.rho + other.rho * other.rho
            - 2.0 * self.rho * other.rho * (other.theta - self.theta).cos();
        sq.max(0.0).sqrt()
    }

    /// Linear interpolation in `(theta, rho)` space.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            theta: self.theta + (other.theta - self.theta) * t,
            rho: self.rho + (other.rho - self.rho) * t,
        }
    }
}

impl fmt::Display for PolarPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(theta={:.5}, rho={:.5})", self.theta, self.rho)
    }
}

/// Inclusive rectangle of integer grid cells `[x0, x1] x [y0, y1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBox {
    /// Left column.
    pub x0: usize,
    /// Top row.
    pub y0: usize,
    /// Right column (inclusive).
    pub x1: usize,
    /// Bottom row (inclusive).
    pub y1: usize,
}

impl GridBox {
    /// Box spanning two grid points grown by `margin` cells on every side, clamped to a
    /// `size x size` grid.
    ///
    /// `size` must be non-zero.
    pub fn spanning(a: (i64, i64), b: (i64, i64), margin: i64, size: usize) -> Self {
        let last = size as i64 - 1;
        let clamp = |v: i64| v.clamp(0, last) as usize;
        Self {
            x0: clamp(a.0.min(b.0) - margin),
            y0: clamp(a.1.min(b.1) - margin),
            x1: clamp(a.0.max(b.0) + margin),
            y1: clamp(a.1.max(b.1) + margin),
        }
    }

    /// The box with every bound pulled inside a `size x size` grid.
    ///
    /// `size` must be non-zero.
    pub fn clamped(self, size: usize) -> Self {
        let last = size - 1;
        Self {
            x0: self.x0.min(last),
            y0: self.y0.min(last),
            x1: self.x1.min(last),
            y1: self.y1.min(last),
        }
    }

    /// Number of cells covered.
    pub fn cell_count(&self) -> usize {
        (self.x1 - self.x0 + 1) * (self.y1 - self.y0 + 1)
    }

    /// Return `true` when `(x, y)` lies inside the box.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }
}

impl fmt::Display for GridBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "box x=[{}..={}] y=[{}..={}]",
            self.x0, self.x1, self.y0, self.y1
        )
    }
}

/// 0-based index of a rendered animation frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames per second as a rational `num / den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SandResult<Self> {
        if den == 0 {
            return Err(SandError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SandError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
