use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SandError, SandResult};
use crate::track::expand::ExpandOpts;
use crate::transform::polar::TableGeometry;

/// Distance, in grid cells, the ball travels per tick when no explicit step is configured.
pub const DEFAULT_STEP_PIXELS: f64 = 0.5;

/// Everything the engine needs to know about the table, the ball and the sand.
///
/// Passed by value into [`crate::Simulation::new`]; the engine reads no other configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Grid side length in cells.
    pub table_diameter: usize,
    /// Cells between the usable radius (`rho == 1`) and the grid edge.
    pub edge_margin: usize,
    /// Primary ball radius in cells.
    pub ball_radius: usize,
    /// Uniform starting depth when no background is supplied.
    pub initial_sand_depth: f64,
    /// Height difference a neighbour pair may hold without sand sliding.
    pub max_slope: f64,
    /// Share of an over-steep difference moved per relax step, in `(0, 0.5)`.
    pub redistribution_rate: f64,
    /// Relax margin as a multiple of the ball radius; must exceed 1.
    pub relax_margin_factor: f64,
    /// Sweep cap for a single relax call.
    pub max_relax_sweeps: u32,
    /// Per-tick travel in normalized units; derived from [`DEFAULT_STEP_PIXELS`] when unset.
    pub step_arc_length: Option<f64>,
    /// Run a mirrored second ball alongside the primary one.
    pub use_second_ball: bool,
    /// Subdivide track segments before simulating.
    pub expand_sequences: bool,
    /// Subdivision thresholds used when `expand_sequences` is set.
    pub expand: ExpandOpts,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            table_diameter: 100,
            edge_margin: 20,
            ball_radius: 5,
            initial_sand_depth: 2.0,
            max_slope: 1.0,
            redistribution_rate: 0.25,
            relax_margin_factor: 4.0,
            max_relax_sweeps: 50_000,
            step_arc_length: None,
            use_second_ball: false,
            expand_sequences: true,
            expand: ExpandOpts::default(),
        }
    }
}

impl SimulationParameters {
    /// Load parameters from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> SandResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SandError::io(path, e))?;
        let params: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse parameters '{}'", path.display()))?;
        params.validate()?;
        Ok(params)
    }

    /// Check every field for values the engine cannot run with.
    pub fn validate(&self) -> SandResult<()> {
        self.geometry()?;
        if self.ball_radius == 0 {
            return Err(SandError::validation("ball_radius must be non-zero"));
        }
        if !(self.initial_sand_depth.is_finite() && self.initial_sand_depth >= 0.0) {
            return Err(SandError::validation("initial_sand_depth must be >= 0"));
        }
        if !(self.max_slope.is_finite() && self.max_slope >= 0.0) {
            return Err(SandError::validation("max_slope must be >= 0"));
        }
        // At 0.5 a lone lower neighbour swaps heights with the cell and the pair never settles.
        if !(self.redistribution_rate > 0.0 && self.redistribution_rate < 0.5) {
            return Err(SandError::validation(
                "redistribution_rate must be in (0, 0.5)",
            ));
        }
        if !(self.relax_margin_factor.is_finite() && self.relax_margin_factor > 1.0) {
            return Err(SandError::validation("relax_margin_factor must be > 1"));
        }
        if self.max_relax_sweeps == 0 {
            return Err(SandError::validation("max_relax_sweeps must be non-zero"));
        }
        if let Some(step) = self.step_arc_length
            && !(step.is_finite() && step > 0.0)
        {
            return Err(SandError::validation("step_arc_length must be > 0"));
        }
        self.expand.validate()
    }

    /// Table geometry derived from the diameter and edge margin.
    pub fn geometry(&self) -> SandResult<TableGeometry> {
        TableGeometry::new(self.table_diameter, self.edge_margin)
    }

    /// Per-tick step budget in normalized units.
    pub fn step_arc_length(&self, geometry: &TableGeometry) -> f64 {
        self.step_arc_length
            .unwrap_or(DEFAULT_STEP_PIXELS / geometry.max_radius())
    }

    /// Expansion thresholds, or `None` when expansion is switched off.
    pub fn expand_opts(&self) -> Option<&ExpandOpts> {
        self.expand_sequences.then_some(&self.expand)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/params.rs"]
mod tests;
