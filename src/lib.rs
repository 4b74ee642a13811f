//! sandtable simulates a ball rolling through sand on a round table.
//!
//! A track is a list of polar waypoints (`theta rho`, as found in `.thr` files). The ball follows
//! the track, carves a groove in a height field of sand, and the disturbed sand slides back
//! until no neighbouring cells are steeper than the angle of repose. The result is rendered as an
//! image, and optionally as a PNG frame sequence or MP4 while the ball moves.
//!
//! - Parse and expand a track with [`parse_track_text`] and [`expand_sequence`]
//! - Build a [`Simulation`] from [`SimulationParameters`]
//! - Drive it with [`Simulation::run_track`], or run many tracks with a [`BatchRunner`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Frame sinks for animation output.
pub mod encode;
/// Height field rendering and background seeding.
pub mod render;
/// Track and batch orchestration.
pub mod session;
/// Balls, sand grid and the simulation loop.
pub mod sim;
/// Track parsing, expansion and sources.
pub mod track;
/// Polar/grid coordinate mapping.
pub mod transform;

pub use crate::foundation::core::{Fps, FrameIndex, GridBox, Point, PolarPosition};
pub use crate::foundation::error::{SandError, SandResult};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::png_seq::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::background::{BackgroundChannel, load_background};
pub use crate::render::raster::{ColorMode, FrameRGBA, RenderOptions, write_image};
pub use crate::session::batch::{BatchOpts, BatchReport, BatchRunner, TrackOutcome};
pub use crate::sim::ball::{Ball, BallState};
pub use crate::sim::driver::{Simulation, TrackStats};
pub use crate::sim::grid::{HeightField, RelaxReport, SandGrid};
pub use crate::sim::params::SimulationParameters;
pub use crate::track::expand::{ExpandOpts, build_cleaning_track, expand_sequence};
pub use crate::track::parse::{TrackParseError, parse_track_text, parse_waypoints};
pub use crate::track::source::TrackSource;
pub use crate::transform::polar::TableGeometry;
