//! The simulation: balls, sand, and the loop that drives them.

/// Ball kinematics.
pub mod ball;
/// Waypoint-by-waypoint simulation loop.
pub mod driver;
/// Height field with push and relax.
pub mod grid;
/// Engine parameters.
pub mod params;
/// Throttled progress reporting.
pub mod progress;
