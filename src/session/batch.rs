use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::png_seq::PngSequenceSink;
use crate::encode::sink::FrameSink;
use crate::foundation::error::{SandError, SandResult};
use crate::render::background::clean_background_name;
use crate::render::raster::{RenderOptions, output_format, write_image};
use crate::sim::driver::{Simulation, TrackStats};
use crate::track::expand::CLEANING_TURNS;
use crate::track::source::{TrackSource, prepare_waypoints};

/// Suffix added to output names of reversed runs.
pub const REVERSED_SUFFIX: &str = "_reversed";
/// Suffix added to output names of two-ball runs.
pub const TWO_BALLS_SUFFIX: &str = "_2balls";

/// How a batch is run and where its results go.
#[derive(Clone, Debug)]
pub struct BatchOpts {
    /// Play every track back to front.
    pub reversed: bool,
    /// Sweep the table with the cleaning spiral before the first track.
    pub clean_first: bool,
    /// Half turns of the cleaning spiral.
    pub cleaning_turns: u32,
    /// Output location. A file path is used as-is for a single track, anything else is treated
    /// as a directory. `None` writes next to each track file.
    pub out: Option<PathBuf>,
    /// Extension of generated image names.
    pub image_extension: String,
    /// Directory receiving one PNG frame folder per track.
    pub frames_dir: Option<PathBuf>,
    /// Directory receiving one MP4 per track.
    pub video_dir: Option<PathBuf>,
    /// Colour mode and frame cadence.
    pub render: RenderOptions,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            reversed: false,
            clean_first: false,
            cleaning_turns: CLEANING_TURNS,
            out: None,
            image_extension: "png".to_owned(),
            frames_dir: None,
            video_dir: None,
            render: RenderOptions::default(),
        }
    }
}

impl BatchOpts {
    /// Check the output extension and render options.
    pub fn validate(&self) -> SandResult<()> {
        self.render.validate()?;
        output_format(Path::new(&format!("probe.{}", self.image_extension)))?;
        if let Some(out) = &self.out
            && is_image_path(out)
        {
            output_format(out)?;
        }
        Ok(())
    }
}

/// Result of one track in a batch.
#[derive(Debug)]
pub struct TrackOutcome {
    /// Track label used in logs.
    pub label: String,
    /// Image path the track writes to.
    pub output: PathBuf,
    /// Statistics, or the error that stopped the track.
    pub result: SandResult<TrackStats>,
}

impl TrackOutcome {
    /// Return `true` when the track ran to the end and its image was written.
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per track, in batch order.
    pub outcomes: Vec<TrackOutcome>,
    /// Wall time for the whole batch.
    pub elapsed: Duration,
}

impl BatchReport {
    /// Tracks that completed.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Tracks that were skipped or aborted.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs tracks one after another on a single table.
#[derive(Debug)]
pub struct BatchRunner {
    sim: Simulation,
    opts: BatchOpts,
}

impl BatchRunner {
    /// Wrap a simulation; its height field persists across every track run here.
    pub fn new(sim: Simulation, opts: BatchOpts) -> SandResult<Self> {
        opts.validate()?;
        Ok(Self { sim, opts })
    }

    /// The simulation being driven.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Options in effect.
    pub fn opts(&self) -> &BatchOpts {
        &self.opts
    }

    /// Consume the runner and return the simulation.
    pub fn into_simulation(self) -> Simulation {
        self.sim
    }

    /// Image path for a track file, given how many tracks the batch holds.
    pub fn output_path(&self, track: &Path, track_count: usize) -> PathBuf {
        if track_count == 1
            && let Some(out) = &self.opts.out
            && is_image_path(out)
        {
            return out.clone();
        }
        let stem = track
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track".to_owned());
        let name = output_name(
            &stem,
            self.opts.reversed,
            self.sim.params().use_second_ball,
            &self.opts.image_extension,
        );
        match &self.opts.out {
            Some(dir) => dir.join(name),
            None => track.with_file_name(name),
        }
    }

    /// Image path of the clean backdrop for this table.
    pub fn clean_output_path(&self) -> PathBuf {
        let name = clean_background_name(self.sim.grid().diameter());
        match &self.opts.out {
            Some(out) if is_image_path(out) => out.clone(),
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Run every track in order, isolating failures per track.
    #[tracing::instrument(level = "info", skip_all, fields(tracks = tracks.len()))]
    pub fn run(&mut self, tracks: &[PathBuf]) -> SandResult<BatchReport> {
        let started = Instant::now();
        if self.opts.clean_first {
            let cleaning = TrackSource::Cleaning {
                turns: self.opts.cleaning_turns,
            };
            self.run_source(&cleaning, None)?;
        }

        let mut report = BatchReport::default();
        for track in tracks {
            let output = self.output_path(track, tracks.len());
            let source = TrackSource::File(track.clone());
            let result = self.run_source(&source, Some(&output));
            match &result {
                Ok(stats) => tracing::info!(
                    track = %source.label(),
                    output = %output.display(),
                    ticks = stats.ticks,
                    "image written"
                ),
                Err(e @ (SandError::Io { .. } | SandError::Parse(_))) => {
                    tracing::warn!(track = %source.label(), error = %e, "track skipped")
                }
                Err(e) => tracing::error!(track = %source.label(), error = %e, "track aborted"),
            }
            report.outcomes.push(TrackOutcome {
                label: source.label(),
                output,
                result,
            });
        }

        report.elapsed = started.elapsed();
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed = ?report.elapsed,
            "batch finished"
        );
        Ok(report)
    }

    /// Sweep the table with the cleaning spiral and write the clean backdrop image.
    pub fn clean(&mut self) -> SandResult<PathBuf> {
        let output = self.clean_output_path();
        let cleaning = TrackSource::Cleaning {
            turns: self.opts.cleaning_turns,
        };
        self.run_source(&cleaning, Some(&output))?;
        tracing::info!(output = %output.display(), "clean backdrop written");
        Ok(output)
    }

    /// Load, prepare and run one track, then write its image when `output` is set.
    pub fn run_source(
        &mut self,
        source: &TrackSource,
        output: Option<&Path>,
    ) -> SandResult<TrackStats> {
        let raw = source.load()?;
        // The cleaning spiral always runs outward.
        let reversed = self.opts.reversed && matches!(source, TrackSource::File(_));
        let waypoints = prepare_waypoints(raw, reversed, self.sim.params().expand_opts());
        tracing::debug!(track = %source.label(), waypoints = waypoints.len(), "track prepared");

        let mut sinks = self.sinks_for(source, output);
        let stats = self.sim.run_track(
            &source.label(),
            &waypoints,
            &self.opts.render,
            &mut sinks,
        )?;

        if let Some(path) = output {
            write_image(&self.sim.render(self.opts.render.color), path)?;
        }
        Ok(stats)
    }

    fn sinks_for(&self, source: &TrackSource, output: Option<&Path>) -> Vec<Box<dyn FrameSink>> {
        let stem = output
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| sanitize(&source.label()));
        let mut sinks: Vec<Box<dyn FrameSink>> = Vec::new();
        if let Some(dir) = &self.opts.frames_dir {
            sinks.push(Box::new(PngSequenceSink::new(dir.join(&stem))));
        }
        if let Some(dir) = &self.opts.video_dir {
            let path = dir.join(format!("{stem}.mp4"));
            sinks.push(Box::new(FfmpegSink::new(FfmpegSinkOpts::new(path))));
        }
        sinks
    }
}

/// `<stem>[_reversed][_2balls].<ext>`
pub fn output_name(stem: &str, reversed: bool, two_balls: bool, extension: &str) -> String {
    let mut name = stem.to_owned();
    if reversed {
        name.push_str(REVERSED_SUFFIX);
    }
    if two_balls {
        name.push_str(TWO_BALLS_SUFFIX);
    }
    format!("{name}.{extension}")
}

fn is_image_path(path: &Path) -> bool {
    image::ImageFormat::from_path(path).is_ok()
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/session/batch.rs"]
mod tests;
