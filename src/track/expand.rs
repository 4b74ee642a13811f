//! Polar-space subdivision of waypoint segments.
//!
//! The ball moves between consecutive targets along a chord in grid space. A segment that sweeps
//! an angle therefore has to be cut into short polar steps first, otherwise a constant-rho arc is
//! drawn as a straight line.

use std::f64::consts::PI;

use crate::foundation::core::PolarPosition;
use crate::foundation::error::{SandError, SandResult};

/// Number of half turns the cleaning spiral sweeps before its closing lap.
pub const CLEANING_TURNS: u32 = 200;

/// Thresholds controlling [`expand_sequence`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExpandOpts {
    /// Largest theta change (radians) allowed between emitted waypoints.
    pub max_theta_delta: f64,
    /// Largest rho change allowed between emitted waypoints of a sweeping segment.
    pub max_rho_delta: f64,
    /// Segments whose endpoints both sit this close to the centre are always subdivided,
    /// since their angle is ambiguous.
    pub near_center_epsilon: f64,
}

impl Default for ExpandOpts {
    fn default() -> Self {
        Self {
            max_theta_delta: 0.05,
            max_rho_delta: 0.01,
            near_center_epsilon: 1e-4,
        }
    }
}

impl ExpandOpts {
    /// Reject thresholds that would never terminate or never subdivide.
    pub fn validate(&self) -> SandResult<()> {
        if !(self.max_theta_delta.is_finite() && self.max_theta_delta > 0.0) {
            return Err(SandError::validation("max_theta_delta must be > 0"));
        }
        if !(self.max_rho_delta.is_finite() && self.max_rho_delta > 0.0) {
            return Err(SandError::validation("max_rho_delta must be > 0"));
        }
        if self.near_center_epsilon.is_nan() || self.near_center_epsilon < 0.0 {
            return Err(SandError::validation("near_center_epsilon must be >= 0"));
        }
        Ok(())
    }

    /// Number of points emitted for the segment `a -> b`, counting `a` and excluding `b`.
    pub fn segment_points(&self, a: PolarPosition, b: PolarPosition) -> usize {
        let d_theta = (b.theta - a.theta).abs();
        let d_rho = (b.rho - a.rho).abs();
        let near_center =
            a.rho.abs() < self.near_center_epsilon && b.rho.abs() < self.near_center_epsilon;

        if d_rho <= self.max_rho_delta && d_theta <= self.max_theta_delta && !near_center {
            return 1;
        }

        // A purely radial segment is already straight on the grid.
        let theta_steps = d_theta / self.max_theta_delta;
        let rho_steps = if d_theta > 0.0 {
            d_rho / self.max_rho_delta
        } else {
            0.0
        };
        (theta_steps.max(rho_steps).ceil() as usize).max(1)
    }
}

/// Subdivide every segment of `sequence` so that emitted steps stay within `opts`.
///
/// The first point of each segment is kept exactly, intermediate points are interpolated in
/// `(theta, rho)` space, and the final waypoint is appended exactly once.
#[tracing::instrument(level = "debug", skip_all, fields(len = sequence.len()))]
pub fn expand_sequence(sequence: &[PolarPosition], opts: &ExpandOpts) -> Vec<PolarPosition> {
    let Some(&last) = sequence.last() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(sequence.len());
    for pair in sequence.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let n = opts.segment_points(a, b);
        if n == 1 {
            out.push(a);
            continue;
        }
        let step = 1.0 / n as f64;
        out.extend((0..n).map(|j| a.lerp(b, j as f64 * step)));
    }
    out.push(last);

    tracing::debug!(input = sequence.len(), expanded = out.len(), "expanded track");
    out
}

/// Synthetic spiral that sweeps the whole table and finishes with one lap at the rim.
///
/// Rendering it over any starting field leaves a reproducible baseline.
pub fn build_cleaning_track(turns: u32) -> Vec<PolarPosition> {
    let turns = f64::from(turns);
    vec![
        PolarPosition::new(0.0, 0.0),
        PolarPosition::new(turns * PI, 1.0),
        PolarPosition::new((turns + 2.0) * PI, 1.0),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/track/expand.rs"]
mod tests;
