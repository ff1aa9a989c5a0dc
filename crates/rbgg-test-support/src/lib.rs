//! Test support utilities for rbgg.
//!
//! Provides synthetic image builders, a brute-force percentile oracle and
//! mocks of the core ports.
//!
//! # Example
//!
//! ```
//! use rbgg_test_support::{reference, MockImageSource, SyntheticImageBuilder};
//!
//! let page = SyntheticImageBuilder::vignette(64, 48, 230, 90);
//! let expected = reference::percentile_field(&page, 2, 0.9);
//! assert_eq!(expected.dimensions(), (64, 48));
//!
//! let _source = MockImageSource::new(vec![SyntheticImageBuilder::info("page", page)]);
//! ```

mod builders;
mod mocks;
pub mod reference;

pub use builders::SyntheticImageBuilder;
pub use mocks::{MockImageSink, MockImageSource, MockProgressSink, MockResultOutput, SavedImage};
