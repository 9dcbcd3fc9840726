//! Raster image inspection.
//!
//! Only what the template engine needs to lay out an embedded picture:
//! signature detection and pixel dimensions read straight from the header.

pub mod dimensions;

pub use dimensions::{FALLBACK_DIMENSIONS, RasterFormat, sniff, sniff_format};
