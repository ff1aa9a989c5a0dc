//! Core domain types for background flattening.

mod error;
mod params;
mod result;

pub use error::FlattenError;
pub use params::{FlattenParams, WindowGeometry};
pub use result::{FieldStats, FlattenReport, ImageDimensions, ImageInfo, OutputPaths};
