use std::path::{Path, PathBuf};

use crate::foundation::core::PolarPosition;
use crate::foundation::error::{SandError, SandResult};
use crate::track::expand::{ExpandOpts, build_cleaning_track, expand_sequence};
use crate::track::parse::parse_track_text;

/// File extension of track files.
pub const TRACK_EXTENSION: &str = "thr";

/// Where a track's waypoints come from.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackSource {
    /// A `.thr` file on disk.
    File(PathBuf),
    /// The synthetic cleaning spiral.
    Cleaning {
        /// Half turns swept before the closing rim lap.
        turns: u32,
    },
}

impl TrackSource {
    /// Short human-readable name for logs.
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Cleaning { turns } => format!("cleaning({turns})"),
        }
    }

    /// Read and parse the raw waypoints, before reversal or expansion.
    pub fn load(&self) -> SandResult<Vec<PolarPosition>> {
        match self {
            Self::File(path) => {
                let text =
                    std::fs::read_to_string(path).map_err(|e| SandError::io(path.clone(), e))?;
                Ok(parse_track_text(&text)?)
            }
            Self::Cleaning { turns } => Ok(build_cleaning_track(*turns)),
        }
    }
}

/// Apply the optional reversal and expansion to raw waypoints.
pub fn prepare_waypoints(
    mut raw: Vec<PolarPosition>,
    reversed: bool,
    expand: Option<&ExpandOpts>,
) -> Vec<PolarPosition> {
    if reversed {
        raw.reverse();
    }
    match expand {
        Some(opts) => expand_sequence(&raw, opts),
        None => raw,
    }
}

/// Append the `.thr` extension to a bare track name.
pub fn normalize_track_name(name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    if path.extension().is_some_and(|e| e == TRACK_EXTENSION) {
        path
    } else {
        PathBuf::from(format!("{name}.{TRACK_EXTENSION}"))
    }
}

/// Parse a batch list: one or more comma-separated track names per line, `#` comments ignored.
pub fn parse_batch_list(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"))
        .flat_map(|l| l.split(','))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(normalize_track_name)
        .collect()
}

/// Read a batch list file. Relative track paths resolve against the list's directory.
pub fn read_batch_file(path: &Path) -> SandResult<Vec<PathBuf>> {
    let text = std::fs::read_to_string(path).map_err(|e| SandError::io(path, e))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parse_batch_list(&text)
        .into_iter()
        .map(|p| if p.is_absolute() { p } else { base.join(p) })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/track/source.rs"]
mod tests;
