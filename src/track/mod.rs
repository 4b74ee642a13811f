/// Path expansion and the cleaning spiral.
pub mod expand;
/// `.thr` text parsing.
pub mod parse;
/// Track files, batch lists and waypoint preparation.
pub mod source;
