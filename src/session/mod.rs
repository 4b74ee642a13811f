//! Running whole tracks and batches of tracks on one persistent table.

/// Batch runner, output naming and per-track reports.
pub mod batch;
