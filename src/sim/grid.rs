//! The sand height field and the two operators that change it.
//!
//! `push` carves the ball's footprint and throws the displaced sand outward; `relax` lets
//! over-steep neighbour pairs slide until the swept region is stable again.

use crate::foundation::core::GridBox;
use crate::foundation::error::{SandError, SandResult};
use crate::sim::ball::Ball;
use crate::sim::params::SimulationParameters;
use crate::transform::polar::TableGeometry;

/// Square grid of non-negative sand depths, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    size: usize,
    cells: Vec<f64>,
}

impl HeightField {
    /// A `size x size` field at a uniform `depth`.
    pub fn uniform(size: usize, depth: f64) -> Self {
        Self {
            size,
            cells: vec![depth; size * size],
        }
    }

    /// Wrap row-major heights. Every value must be finite and non-negative.
    pub fn from_heights(size: usize, cells: Vec<f64>) -> SandResult<Self> {
        if cells.len() != size * size {
            return Err(SandError::validation(format!(
                "height field needs {} cells for a {size}x{size} table, got {}",
                size * size,
                cells.len()
            )));
        }
        if let Some(bad) = cells.iter().find(|h| !(h.is_finite() && **h >= 0.0)) {
            return Err(SandError::validation(format!(
                "height field values must be finite and >= 0, found {bad}"
            )));
        }
        Ok(Self { size, cells })
    }

    /// Side length in cells.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Height at column `x`, row `y`.
    ///
    /// Panics when out of range.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.cells[self.index(x, y)]
    }

    /// Row-major heights.
    pub fn heights(&self) -> &[f64] {
        &self.cells
    }

    /// Sum of all heights.
    pub fn total_mass(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Largest height, `0` for an empty field.
    pub fn max_height(&self) -> f64 {
        self.cells.iter().copied().fold(0.0, f64::max)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    #[inline]
    fn contains(&self, x: i64, y: i64) -> bool {
        let n = self.size as i64;
        (0..n).contains(&x) && (0..n).contains(&y)
    }
}

/// What a push call did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PushReport {
    /// Cells that gave sand away.
    pub cells_moved: usize,
    /// Total height moved outward.
    pub mass_moved: f64,
}

/// What a relax call did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxReport {
    /// Sweeps run, including the final settled one.
    pub sweeps: u32,
    /// Cell-to-neighbour transfers applied.
    pub transfers: u64,
    /// Region that was relaxed.
    pub region: GridBox,
}

/// Owner of the height field.
#[derive(Clone, Debug)]
pub struct SandGrid {
    field: HeightField,
    geometry: TableGeometry,
    max_slope: f64,
    redistribution_rate: f64,
    max_sweeps: u32,
}

impl SandGrid {
    /// Grid at the configured uniform starting depth.
    pub fn new(params: &SimulationParameters) -> SandResult<Self> {
        let field = HeightField::uniform(params.table_diameter, params.initial_sand_depth);
        Self::with_field(params, field)
    }

    /// Grid seeded with an existing field, e.g. from a background image.
    pub fn with_field(params: &SimulationParameters, field: HeightField) -> SandResult<Self> {
        params.validate()?;
        if field.size() != params.table_diameter {
            return Err(SandError::validation(format!(
                "seed field is {0}x{0}, table is {1}x{1}",
                field.size(),
                params.table_diameter
            )));
        }
        Ok(Self {
            field,
            geometry: params.geometry()?,
            max_slope: params.max_slope,
            redistribution_rate: params.redistribution_rate,
            max_sweeps: params.max_relax_sweeps,
        })
    }

    /// Read-only view of the heights.
    pub fn field(&self) -> &HeightField {
        &self.field
    }

    /// Replace the whole field with `heights`, e.g. when restoring a saved table.
    pub fn seed_from(&mut self, heights: Vec<f64>) -> SandResult<()> {
        self.field = HeightField::from_heights(self.field.size(), heights)?;
        Ok(())
    }

    /// Grid side length in cells.
    pub fn diameter(&self) -> usize {
        self.field.size()
    }

    /// Height at cell `(x, y)`.
    pub fn height(&self, x: usize, y: usize) -> f64 {
        self.field.get(x, y)
    }

    /// Row-major heights.
    pub fn heights(&self) -> &[f64] {
        self.field.heights()
    }

    /// Sum of all heights.
    pub fn total_mass(&self) -> f64 {
        self.field.total_mass()
    }

    /// Table geometry used to place balls on the grid.
    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    /// Displace the sand under `ball` at its current position.
    pub fn push(&mut self, ball: &Ball) -> PushReport {
        let (cx, cy) = self.geometry.to_cell(ball.position());
        self.push_at(cx, cy, ball.radius())
    }

    /// Displace sand under a ball of `radius` cells centred on cell `(cx, cy)`.
    ///
    /// Each covered cell keeps at most the ball's bump profile and throws the excess to the
    /// cell mirrored across it from the centre, i.e. offset `(dx, dy)` again. Cells whose source
    /// or destination is off the grid are skipped, so no sand is lost.
    pub fn push_at(&mut self, cx: i64, cy: i64, radius: usize) -> PushReport {
        let r = radius as i64;
        let rf = radius as f64;
        let mut report = PushReport::default();

        for i in (cx - r)..=(cx + r) {
            for j in (cy - r)..=(cy + r) {
                let (dx, dy) = (i - cx, j - cy);
                let (ti, tj) = (i + dx, j + dy);
                if !self.field.contains(i, j) || !self.field.contains(ti, tj) {
                    continue;
                }
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                if d > rf {
                    continue;
                }

                let profile = ball_profile(d, rf);
                let src = self.field.index(i as usize, j as usize);
                let here = self.field.cells[src];
                if here < profile {
                    continue;
                }

                let mut moved = here - profile;
                let mut left = here - moved;
                if left < 0.0 {
                    moved += left;
                    left = 0.0;
                }
                // Source first: the centre cell is its own destination.
                self.field.cells[src] = left;
                let dst = self.field.index(ti as usize, tj as usize);
                self.field.cells[dst] += moved;

                if moved > 0.0 {
                    report.cells_moved += 1;
                    report.mass_moved += moved;
                }
            }
        }
        report
    }

    /// Relax the region `ball` swept since its target was set, plus its relax margin.
    pub fn relax(&mut self, ball: &Ball) -> SandResult<RelaxReport> {
        let region = GridBox::spanning(
            self.geometry.to_cell(ball.start()),
            self.geometry.to_cell(ball.position()),
            ball.relax_margin(),
            self.field.size(),
        );
        self.relax_region(region)
    }

    /// Sweep `region` until no cell has a 4-neighbour more than `max_slope` below it.
    ///
    /// Each over-steep cell sends `redistribution_rate * 2 / count` of every qualifying
    /// difference to its `count` lower neighbours, all measured before the cell changes.
    /// A region reaching past the grid is clamped to it. Fails with [`SandError::Unsettled`]
    /// after `max_relax_sweeps` unsettled sweeps.
    pub fn relax_region(&mut self, region: GridBox) -> SandResult<RelaxReport> {
        let n = self.field.size;
        let region = region.clamped(n);
        let cells = &mut self.field.cells;
        let mut sweeps = 0u32;
        let mut transfers = 0u64;

        loop {
            if sweeps == self.max_sweeps {
                return Err(SandError::Unsettled { sweeps, region });
            }
            sweeps += 1;
            let mut settled = true;

            for y in region.y0..=region.y1 {
                for x in region.x0..=region.x1 {
                    let here_idx = y * n + x;
                    let here = cells[here_idx];
                    let floor = here - self.max_slope;

                    let mut lower = [0usize; 4];
                    let mut count = 0;
                    let mut consider = |k: usize| {
                        if cells[k] < floor {
                            lower[count] = k;
                            count += 1;
                        }
                    };
                    if x > 0 {
                        consider(here_idx - 1);
                    }
                    if x + 1 < n {
                        consider(here_idx + 1);
                    }
                    if y > 0 {
                        consider(here_idx - n);
                    }
                    if y + 1 < n {
                        consider(here_idx + n);
                    }
                    if count == 0 {
                        continue;
                    }

                    settled = false;
                    let share = self.redistribution_rate * 2.0 / count as f64;
                    let mut out = 0.0;
                    for &k in &lower[..count] {
                        let amount = (here - cells[k]) * share;
                        cells[k] += amount;
                        out += amount;
                    }
                    cells[here_idx] = here - out;
                    transfers += count as u64;
                }
            }

            if settled {
                return Ok(RelaxReport {
                    sweeps,
                    transfers,
                    region,
                });
            }
        }
    }
}

/// Height of the ball's bump at distance `d` from its centre: zero at the rim, highest in the
/// middle.
#[inline]
pub fn ball_profile(d: f64, radius: f64) -> f64 {
    (1.0 - (1.0 - d / radius).max(0.0).cos()).max(0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/sim/grid.rs"]
mod tests;
