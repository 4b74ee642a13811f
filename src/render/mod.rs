//! Turning the height field into pixels, and pixels back into a height field.

/// Background image seeding.
pub mod background;
/// Height field rasterization and still-image output.
pub mod raster;
