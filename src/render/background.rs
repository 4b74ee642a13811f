//! Seeding the height field from a previously rendered table image.

use std::path::{Path, PathBuf};

use crate::foundation::error::{SandError, SandResult};
use crate::render::raster::GRAY_PER_UNIT;
use crate::sim::grid::HeightField;

/// Which pixel channel encodes sand height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundChannel {
    /// Red channel only; survives the sand tint unchanged.
    #[default]
    Red,
    /// Mean of red, green and blue.
    AveragedRgb,
}

/// File name of the clean backdrop for a table: `clean_<d>x<d>.png`.
pub fn clean_background_name(diameter: usize) -> String {
    format!("clean_{diameter}x{diameter}.png")
}

/// The clean backdrop in `dir`, if one has been generated.
pub fn default_background(dir: &Path, diameter: usize) -> Option<PathBuf> {
    let path = dir.join(clean_background_name(diameter));
    path.is_file().then_some(path)
}

/// Sand height encoded by one pixel.
#[inline]
pub fn height_from_pixel(rgb: [u8; 3], channel: BackgroundChannel) -> f64 {
    let level = match channel {
        BackgroundChannel::Red => f64::from(rgb[0]),
        BackgroundChannel::AveragedRgb => {
            (f64::from(rgb[0]) + f64::from(rgb[1]) + f64::from(rgb[2])) / 3.0
        }
    };
    level / GRAY_PER_UNIT
}

/// Build a height field from a decoded image, which must be exactly `diameter` square.
pub fn field_from_image(
    img: &image::RgbImage,
    diameter: usize,
    channel: BackgroundChannel,
) -> SandResult<HeightField> {
    let (w, h) = img.dimensions();
    if w as usize != diameter || h as usize != diameter {
        return Err(SandError::validation(format!(
            "background is {w}x{h}, table is {diameter}x{diameter}"
        )));
    }
    let cells = img
        .pixels()
        .map(|p| height_from_pixel(p.0, channel))
        .collect();
    HeightField::from_heights(diameter, cells)
}

/// Decode `path` and turn it into a height field.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_background(
    path: &Path,
    diameter: usize,
    channel: BackgroundChannel,
) -> SandResult<HeightField> {
    let reader = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| SandError::io(path, e))?;
    let img = reader
        .decode()
        .map_err(|e| SandError::render(format!("decode background '{}': {e}", path.display())))?
        .to_rgb8();
    let field = field_from_image(&img, diameter, channel)?;
    tracing::debug!(mass = field.total_mass(), "background loaded");
    Ok(field)
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
