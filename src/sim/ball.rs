//! Ball kinematics: a two-state machine stepping a ball toward a polar target.

use std::f64::consts::PI;

use crate::foundation::core::PolarPosition;

/// Distance below which a new target counts as already reached.
pub const TARGET_EPSILON: f64 = 1e-3;
/// Slack on the remaining distance when deciding to snap onto the target.
pub const DISTANCE_EPSILON: f64 = 1e-6;
/// Largest remaining theta gap (radians) that still allows a snap.
pub const THETA_EPSILON: f64 = 1e-3;
/// Theta advance per tick once the radial distance is closed but the angle is not.
pub const MAX_ANGULAR_STEP: f64 = PI / 20.0;
/// Remaining gaps below this after an angular step finish the move.
pub const SETTLE_EPSILON: f64 = 1e-9;

/// Kinematic state of a ball.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BallState {
    /// Travelling toward the current target.
    Moving,
    /// Sitting on the current target.
    AtTarget,
}

/// One ball rolling over the table.
#[derive(Clone, Debug)]
pub struct Ball {
    name: String,
    radius: usize,
    relax_margin: i64,
    current: PolarPosition,
    target: PolarPosition,
    start: PolarPosition,
    state: BallState,
}

impl Ball {
    /// Create a ball resting at the table centre.
    ///
    /// The relax margin is `radius * relax_margin_factor` cells, truncated.
    pub fn new(name: impl Into<String>, radius: usize, relax_margin_factor: f64) -> Self {
        Self {
            name: name.into(),
            radius,
            relax_margin: (radius as f64 * relax_margin_factor) as i64,
            current: PolarPosition::ORIGIN,
            target: PolarPosition::ORIGIN,
            start: PolarPosition::ORIGIN,
            state: BallState::AtTarget,
        }
    }

    /// Ball name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Radius in grid cells.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Cells added around the swept region when relaxing behind this ball.
    pub fn relax_margin(&self) -> i64 {
        self.relax_margin
    }

    /// Current position.
    pub fn position(&self) -> PolarPosition {
        self.current
    }

    /// Current target.
    pub fn target(&self) -> PolarPosition {
        self.target
    }

    /// Position the ball held when its current target was set.
    pub fn start(&self) -> PolarPosition {
        self.start
    }

    /// Current kinematic state.
    pub fn state(&self) -> BallState {
        self.state
    }

    /// Return `true` once the ball sits on its target.
    pub fn at_target(&self) -> bool {
        self.state == BallState::AtTarget
    }

    /// Teleport the ball to `position` and make it the target.
    pub fn place(&mut self, position: PolarPosition) {
        self.current = position;
        self.target = position;
        self.start = position;
        self.state = BallState::AtTarget;
    }

    /// Aim at a new target, remembering where this move started.
    ///
    /// A target closer than [`TARGET_EPSILON`] is reached immediately; the ball takes on the
    /// target's exact coordinates so that theta keeps accumulating turns.
    pub fn set_target(&mut self, target: PolarPosition) {
        self.start = self.current;
        self.target = target;
        if self.current.distance(target) < TARGET_EPSILON {
            self.current = target;
            self.state = BallState::AtTarget;
        } else {
            self.state = BallState::Moving;
        }
    }

    /// Advance one tick with a travel budget of `step` normalized units.
    ///
    /// Returns `true` when the ball is on its target after the tick. Calls made once the target
    /// is reached change nothing.
    pub fn update_position(&mut self, step: f64) -> bool {
        if self.state == BallState::AtTarget {
            return true;
        }

        let d = self.current.distance(self.target);
        let d_theta = self.target.theta - self.current.theta;
        let d_rho = self.target.rho - self.current.rho;

        if (step >= d || d - step < DISTANCE_EPSILON) && d_theta.abs() < THETA_EPSILON {
            return self.arrive();
        }

        let fraction = step / d;
        if fraction < 1.0 {
            self.current.theta += fraction * d_theta;
            self.current.rho += fraction * d_rho;
            return false;
        }

        // Radially there already, only the angle is open: turn in place at fixed rho.
        let turn = d_theta.signum() * d_theta.abs().min(MAX_ANGULAR_STEP);
        self.current.theta += turn;
        let theta_left = (self.target.theta - self.current.theta).abs();
        let rho_left = (self.target.rho - self.current.rho).abs();
        if theta_left < SETTLE_EPSILON && rho_left < SETTLE_EPSILON {
            return self.arrive();
        }
        false
    }

    fn arrive(&mut self) -> bool {
        self.current = self.target;
        self.state = BallState::AtTarget;
        true
    }
}

/// Mirror of a primary-ball position used to drive the second ball.
///
/// The second ball sits opposite the primary one, `theta + pi`, and at the complementary radius
/// `1 - rho`, so the pair crosses at `rho = 0.5`.
pub fn mirror(p: PolarPosition) -> PolarPosition {
    PolarPosition {
        theta: p.theta + PI,
        rho: 1.0 - p.rho,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/ball.rs"]
mod tests;
