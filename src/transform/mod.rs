/// Polar/grid mapping for the circular table.
pub mod polar;
