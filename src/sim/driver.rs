//! Runs balls over the sand, one waypoint at a time.
//!
//! Each tick moves every ball one step, pushes the sand under every ball, then relaxes the region
//! each ball has swept since its target was set. A waypoint counts as visited once every ball sits
//! on its target. Frame sinks see a snapshot every `image_skip_count` waypoints, never in the
//! middle of a tick.

use std::time::{Duration, Instant};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, PolarPosition};
use crate::foundation::error::SandResult;
use crate::render::raster::{ColorMode, FrameRGBA, RenderOptions, render_height_field};
use crate::sim::ball::{Ball, mirror};
use crate::sim::grid::{HeightField, SandGrid};
use crate::sim::params::SimulationParameters;
use crate::sim::progress::Progress;
use crate::transform::polar::TableGeometry;

/// Log name of the ball that follows the track.
pub const PRIMARY_BALL: &str = "primary";
/// Log name of the mirrored ball in two-ball mode.
pub const SECONDARY_BALL: &str = "secondary";

/// Work done by one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Sand moved by all pushes.
    pub mass_pushed: f64,
    /// Largest relax sweep count among the balls.
    pub max_sweeps: u32,
}

/// Work done reaching one waypoint.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveReport {
    /// Ticks until every ball arrived; zero when the target was already reached.
    pub ticks: u64,
    /// Largest relax sweep count seen.
    pub max_sweeps: u32,
}

/// Summary of one track run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackStats {
    /// Waypoints visited.
    pub waypoints: usize,
    /// Ticks simulated.
    pub ticks: u64,
    /// Frames pushed to each sink.
    pub frames: u64,
    /// Largest relax sweep count seen.
    pub max_sweeps: u32,
    /// Wall time spent.
    pub elapsed: Duration,
}

/// A sand table with one or two balls on it.
#[derive(Debug)]
pub struct Simulation {
    params: SimulationParameters,
    grid: SandGrid,
    balls: Vec<Ball>,
    step: f64,
}

impl Simulation {
    /// Table covered in a uniform layer of `initial_sand_depth`.
    pub fn new(params: SimulationParameters) -> SandResult<Self> {
        let grid = SandGrid::new(&params)?;
        Ok(Self::from_grid(params, grid))
    }

    /// Table seeded with existing heights, e.g. from a background image.
    pub fn with_field(params: SimulationParameters, field: HeightField) -> SandResult<Self> {
        let grid = SandGrid::with_field(&params, field)?;
        Ok(Self::from_grid(params, grid))
    }

    fn from_grid(params: SimulationParameters, grid: SandGrid) -> Self {
        let step = params.step_arc_length(grid.geometry());
        let mut balls = vec![Ball::new(
            PRIMARY_BALL,
            params.ball_radius,
            params.relax_margin_factor,
        )];
        if params.use_second_ball {
            let mut second = Ball::new(
                SECONDARY_BALL,
                params.ball_radius.saturating_sub(1).max(1),
                params.relax_margin_factor,
            );
            second.place(mirror(PolarPosition::ORIGIN));
            balls.push(second);
        }
        Self {
            params,
            grid,
            balls,
            step,
        }
    }

    /// Parameters the simulation was built with.
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Table geometry.
    pub fn geometry(&self) -> &TableGeometry {
        self.grid.geometry()
    }

    /// The sand.
    pub fn grid(&self) -> &SandGrid {
        &self.grid
    }

    /// The balls, primary first.
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// The ball that follows the track.
    pub fn primary(&self) -> &Ball {
        &self.balls[0]
    }

    /// Per-tick travel budget in normalized units.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Return `true` when every ball sits on its target.
    pub fn at_target(&self) -> bool {
        self.balls.iter().all(Ball::at_target)
    }

    /// Lift the balls and set them down at `position` (the second one at its mirror).
    pub fn place(&mut self, position: PolarPosition) {
        self.for_each_target(position, Ball::place);
    }

    /// Aim the balls at `target` (the second one at its mirror).
    pub fn set_target(&mut self, target: PolarPosition) {
        self.for_each_target(target, Ball::set_target);
    }

    fn for_each_target(&mut self, p: PolarPosition, f: impl Fn(&mut Ball, PolarPosition)) {
        let mut balls = self.balls.iter_mut();
        if let Some(primary) = balls.next() {
            f(primary, p);
        }
        for ball in balls {
            f(ball, mirror(p));
        }
    }

    /// One tick: move every ball, push under every ball, relax behind every ball.
    pub fn tick(&mut self) -> SandResult<TickReport> {
        let mut report = TickReport::default();
        for ball in &mut self.balls {
            ball.update_position(self.step);
        }
        for ball in &self.balls {
            report.mass_pushed += self.grid.push(ball).mass_moved;
        }
        for ball in &self.balls {
            let relaxed = self.grid.relax(ball)?;
            report.max_sweeps = report.max_sweeps.max(relaxed.sweeps);
        }
        Ok(report)
    }

    /// Set `target` and tick until every ball has arrived.
    pub fn move_to(&mut self, target: PolarPosition) -> SandResult<MoveReport> {
        self.set_target(target);
        let mut report = MoveReport::default();
        while !self.at_target() {
            let tick = self.tick()?;
            report.ticks += 1;
            report.max_sweeps = report.max_sweeps.max(tick.max_sweeps);
        }
        tracing::trace!(
            %target,
            ticks = report.ticks,
            max_sweeps = report.max_sweeps,
            "waypoint reached"
        );
        Ok(report)
    }

    /// Snapshot of the current heights.
    pub fn render(&self, color: ColorMode) -> FrameRGBA {
        render_height_field(self.grid.field(), color)
    }

    /// Visit every waypoint in order, starting with the balls set down on the first one.
    ///
    /// Every sink is started before the first waypoint and ended after the last one, also when
    /// the run fails part way.
    #[tracing::instrument(
        level = "info",
        skip(self, waypoints, render, sinks),
        fields(waypoints = waypoints.len())
    )]
    pub fn run_track(
        &mut self,
        label: &str,
        waypoints: &[PolarPosition],
        render: &RenderOptions,
        sinks: &mut [Box<dyn FrameSink>],
    ) -> SandResult<TrackStats> {
        render.validate()?;
        let size = self.grid.diameter() as u32;
        let cfg = SinkConfig {
            width: size,
            height: size,
            fps: render.fps,
        };
        for sink in sinks.iter_mut() {
            sink.begin(cfg.clone())?;
        }

        let result = self.drive(label, waypoints, render, sinks);

        let mut ended = Ok(());
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.end() {
                tracing::warn!(error = %e, "frame sink failed to finish");
                if ended.is_ok() {
                    ended = Err(e);
                }
            }
        }
        let stats = result?;
        ended?;
        Ok(stats)
    }

    fn drive(
        &mut self,
        label: &str,
        waypoints: &[PolarPosition],
        render: &RenderOptions,
        sinks: &mut [Box<dyn FrameSink>],
    ) -> SandResult<TrackStats> {
        let started = Instant::now();
        let mut stats = TrackStats {
            waypoints: waypoints.len(),
            ..TrackStats::default()
        };
        let mut progress = Progress::new(label, waypoints.len());
        tracing::info!(track = label, waypoints = waypoints.len(), "track started");

        // Start on the first waypoint; a track may begin at the rim instead of the centre.
        if let Some(first) = waypoints.first() {
            self.place(*first);
        }

        for (index, &waypoint) in waypoints.iter().enumerate() {
            let moved = self.move_to(waypoint)?;
            stats.ticks += moved.ticks;
            stats.max_sweeps = stats.max_sweeps.max(moved.max_sweeps);

            if !sinks.is_empty() && index % render.image_skip_count == 0 {
                let frame = self.render(render.color);
                for sink in sinks.iter_mut() {
                    sink.push_frame(FrameIndex(stats.frames), &frame)?;
                }
                stats.frames += 1;
            }
            progress.update(index + 1);
        }

        stats.elapsed = started.elapsed();
        tracing::info!(
            track = label,
            ticks = stats.ticks,
            frames = stats.frames,
            elapsed = ?stats.elapsed,
            "track finished"
        );
        tracing::debug!(
            track = label,
            max_sweeps = stats.max_sweeps,
            mass = self.grid.total_mass(),
            "relax statistics"
        );
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/driver.rs"]
mod tests;
