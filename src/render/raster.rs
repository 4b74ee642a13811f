use std::path::Path;

use crate::foundation::core::Fps;
use crate::foundation::error::{SandError, SandResult};
use crate::sim::grid::HeightField;

/// Gray levels per unit of sand height.
pub const GRAY_PER_UNIT: f64 = 30.0;

/// Channel ratios applied to the gray level in [`ColorMode::Tinted`].
pub const TINT_RATIOS: [f64; 3] = [255.0 / 255.0, 244.0 / 255.0, 200.0 / 255.0];

/// CPU frame buffer in RGBA8, row-major, always opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// RGBA value at `(x, y)`.
    ///
    /// Panics when out of range.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// How gray levels map to colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Plain gray.
    Greyscale,
    /// Warm sand tint.
    #[default]
    Tinted,
}

/// Rendering and animation cadence options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output colour mode.
    pub color: ColorMode,
    /// Waypoints between animation frames.
    pub image_skip_count: usize,
    /// Playback rate handed to frame sinks.
    pub fps: Fps,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: ColorMode::Tinted,
            image_skip_count: 4,
            fps: Fps::default(),
        }
    }
}

impl RenderOptions {
    /// Reject a zero frame cadence or frame rate.
    pub fn validate(&self) -> SandResult<()> {
        if self.image_skip_count == 0 {
            return Err(SandError::validation("image_skip_count must be non-zero"));
        }
        Fps::new(self.fps.num, self.fps.den).map(|_| ())
    }
}

/// Gray level for a sand height: `min(255, floor(h * 30))`.
#[inline]
pub fn gray_level(height: f64) -> u8 {
    (height * GRAY_PER_UNIT).floor().clamp(0.0, 255.0) as u8
}

/// Opaque RGBA for a gray level.
#[inline]
pub fn shade(gray: u8, color: ColorMode) -> [u8; 4] {
    match color {
        ColorMode::Greyscale => [gray, gray, gray, 255],
        ColorMode::Tinted => {
            let g = f64::from(gray);
            [
                (g * TINT_RATIOS[0]) as u8,
                (g * TINT_RATIOS[1]) as u8,
                (g * TINT_RATIOS[2]) as u8,
                255,
            ]
        }
    }
}

/// Rasterize the whole field; pixel `(x, y)` shows cell `(x, y)`.
pub fn render_height_field(field: &HeightField, color: ColorMode) -> FrameRGBA {
    let size = field.size() as u32;
    let mut data = Vec::with_capacity(field.heights().len() * 4);
    for &h in field.heights() {
        data.extend_from_slice(&shade(gray_level(h), color));
    }
    FrameRGBA {
        width: size,
        height: size,
        data,
    }
}

/// Image format for an output path, or an error when the `image` crate cannot write it.
pub fn output_format(path: &Path) -> SandResult<image::ImageFormat> {
    let format = image::ImageFormat::from_path(path).map_err(|e| {
        SandError::validation(format!(
            "output '{}' has no usable image extension: {e}",
            path.display()
        ))
    })?;
    if !format.writing_enabled() {
        return Err(SandError::validation(format!(
            "output '{}': writing {format:?} images is not supported",
            path.display()
        )));
    }
    Ok(format)
}

/// Write `frame` to `path`, picking the encoder from the extension.
pub fn write_image(frame: &FrameRGBA, path: &Path) -> SandResult<()> {
    let format = output_format(path)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| SandError::io(parent, e))?;
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| SandError::render("frame buffer does not match its dimensions"))?;
    let img = image::DynamicImage::ImageRgba8(img);
    // JPEG and friends carry no alpha channel; the frame is opaque anyway.
    let result = match format {
        image::ImageFormat::Jpeg | image::ImageFormat::Pnm => {
            image::DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(path, format)
        }
        _ => img.save_with_format(path, format),
    };
    result.map_err(|e| SandError::render(format!("write image '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
