//! Polar <-> grid coordinate mapping for a circular table.
//!
//! Theta `0` points at grid row `0` and grows clockwise on screen:
//! `x = cx + sin(theta) * rho * R`, `y = cy - cos(theta) * rho * R`.

use crate::foundation::core::{Point, PolarPosition};
use crate::foundation::error::{SandError, SandResult};

/// Fixed geometry of a square grid holding a circular table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableGeometry {
    diameter: usize,
    center_x: f64,
    center_y: f64,
    max_radius: f64,
}

impl TableGeometry {
    /// Geometry for a `diameter x diameter` grid whose usable radius stops `edge_margin` cells
    /// short of the grid edge.
    pub fn new(diameter: usize, edge_margin: usize) -> SandResult<Self> {
        if diameter == 0 {
            return Err(SandError::validation("table diameter must be non-zero"));
        }
        let radius = diameter / 2;
        if edge_margin >= radius {
            return Err(SandError::validation(format!(
                "edge margin {edge_margin} leaves no usable radius on a {diameter}px table"
            )));
        }
        Ok(Self {
            diameter,
            center_x: radius as f64,
            center_y: radius as f64,
            max_radius: (radius - edge_margin) as f64,
        })
    }

    /// Grid side length in cells.
    pub fn diameter(&self) -> usize {
        self.diameter
    }

    /// Grid coordinates of the table centre.
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Radius in cells that corresponds to `rho == 1`.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Grid column for a polar position.
    #[inline]
    pub fn to_grid_x(&self, theta: f64, rho: f64) -> f64 {
        self.center_x + theta.sin() * rho * self.max_radius
    }

    /// Grid row for a polar position.
    #[inline]
    pub fn to_grid_y(&self, theta: f64, rho: f64) -> f64 {
        self.center_y - theta.cos() * rho * self.max_radius
    }

    /// Grid point for a polar position.
    #[inline]
    pub fn to_grid(&self, p: PolarPosition) -> Point {
        Point::new(self.to_grid_x(p.theta, p.rho), self.to_grid_y(p.theta, p.rho))
    }

    /// Integer cell under a polar position (truncated toward zero, as the grid operators index).
    #[inline]
    pub fn to_cell(&self, p: PolarPosition) -> (i64, i64) {
        let pt = self.to_grid(p);
        (pt.x as i64, pt.y as i64)
    }

    /// Polar estimate for a pixel, used when seeding state from an image.
    ///
    /// This is the pixel-seeding convention rather than an exact inverse of [`Self::to_grid`]:
    /// rho is measured against the full diameter and theta is the plain `atan2(dy, dx)` angle.
    pub fn from_grid(&self, x: f64, y: f64) -> PolarPosition {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        PolarPosition {
            theta: dy.atan2(dx),
            rho: (dx * dx + dy * dy).sqrt() / self.diameter as f64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/polar.rs"]
mod tests;
