//! rbgg adapters - filesystem side of the flattening engine.
//!
//! This crate provides adapters for:
//! - Filesystem image source (decode any raster format `image` supports)
//! - PNG output of the gray copy, flattened image and gradient field

pub mod fs;
pub mod png;

pub use fs::FsImageSource;
pub use png::PngImageSink;
