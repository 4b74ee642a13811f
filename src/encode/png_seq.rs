use std::path::{Path, PathBuf};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{SandError, SandResult};
use crate::render::raster::{FrameRGBA, write_image};

/// Sink writing each frame as `image_%06d.png` into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: usize,
}

impl PngSequenceSink {
    /// Create a sink writing into `dir`, created on `begin`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Frames written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// File path for frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("image_{:06}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> SandResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SandError::validation(
                "png sequence width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| SandError::io(&self.dir, e))?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SandResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SandError::encode("png sequence sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(SandError::encode(
                "png sequence sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SandError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        write_image(frame, &self.frame_path(idx))?;
        self.last_idx = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> SandResult<()> {
        self.cfg = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png_seq.rs"]
mod tests;
