//! rbgg core - local-percentile background estimation
//!
//! This crate estimates slowly varying illumination with a per-pixel local
//! percentile, computed by sliding a 256-bin histogram down every column,
//! and rescales each pixel against it. Image decoding and encoding live
//! behind the ports in [`ports`].

pub mod domain;
pub mod estimation;
pub mod flatten;
pub mod normalize;
pub mod ports;

pub use domain::{
    FieldStats, FlattenError, FlattenParams, FlattenReport, ImageDimensions, ImageInfo,
    OutputPaths, WindowGeometry,
};
pub use estimation::{
    compute_percentile_field, HistogramWindow, PercentileField, PercentileFieldComputer,
};
pub use flatten::{FlattenOutput, Flattener};
pub use normalize::normalize;
pub use ports::{ImageSink, ImageSource, ProgressEvent, ProgressSink, ResultOutput};
