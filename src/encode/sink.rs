use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::SandResult;
use crate::render::raster::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame of a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback rate for video sinks.
    pub fps: Fps,
}

/// Observer that receives snapshots of the table while a track runs.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values between
/// one `begin` and its `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> SandResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SandResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> SandResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames received since the last `begin`.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Return `true` once `end` has been called.
    pub fn finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SandResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SandResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> SandResult<()> {
        self.finished = true;
        Ok(())
    }
}
