//! Frame sinks for animation output.
//!
//! The simulation driver pushes a rendered frame every few waypoints; sinks decide where it goes.

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Numbered PNG frame directory.
pub mod png_seq;
/// Sink trait and the in-memory sink.
pub mod sink;
