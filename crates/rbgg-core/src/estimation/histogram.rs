//! 256-bin intensity histogram over a sliding neighborhood.

use crate::domain::FieldStats;

/// Number of 8-bit intensity bins.
pub const BINS: usize = 256;

/// Frequency table of the intensities currently inside a window.
///
/// Invariant: `total == bins.iter().sum()`. Only [`add`](Self::add) and
/// [`remove`](Self::remove) mutate it, and `remove` refuses to take a value
/// that is not present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramWindow {
    bins: [u64; BINS],
    total: u64,
}

impl Default for HistogramWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramWindow {
    /// Creates an empty window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bins: [0; BINS],
            total: 0,
        }
    }

    /// Builds a histogram over every pixel of a grayscale image.
    #[must_use]
    pub fn from_luma(image: &image::GrayImage) -> Self {
        let mut histogram = Self::new();
        histogram.add_all(image.as_raw());
        histogram
    }

    /// Counts one more pixel of intensity `value`.
    pub fn add(&mut self, value: u8) {
        self.bins[usize::from(value)] += 1;
        self.total += 1;
    }

    /// Drops one pixel of intensity `value`.
    ///
    /// # Panics
    ///
    /// Panics if no pixel of that intensity is in the window. The sweep
    /// tracks exactly which rows are inside, so this only fires on a
    /// bookkeeping defect.
    pub fn remove(&mut self, value: u8) {
        let bin = &mut self.bins[usize::from(value)];
        assert!(*bin > 0, "removed intensity {value} that is not in the window");
        *bin -= 1;
        self.total -= 1;
    }

    /// Adds every sample in `values`.
    pub fn add_all(&mut self, values: &[u8]) {
        for &value in values {
            self.add(value);
        }
    }

    /// Removes every sample in `values`.
    pub fn remove_all(&mut self, values: &[u8]) {
        for &value in values {
            self.remove(value);
        }
    }

    /// Returns the number of pixels in the window.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns true when the window holds no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Returns the count for a single intensity.
    #[must_use]
    pub const fn count(&self, value: u8) -> u64 {
        self.bins[value as usize]
    }

    /// Local percentile of the window, `p` in `(0, 1]`.
    ///
    /// For `p <= 0.5` the bins are walked upward from 0 with a rank of
    /// `floor(n * p)`; above the median they are walked downward from 255
    /// with a rank of `floor(n * (1 - p))`, so bright percentiles touch few
    /// bins. Each occupied bin's count is taken off the rank and the first
    /// occupied bin that brings it to zero or below is returned. The result
    /// is therefore always an intensity present in the window.
    ///
    /// The two roundings are not symmetric on purpose: `floor` is applied
    /// to `n * p` and to `n * (1 - p)` separately.
    ///
    /// # Panics
    ///
    /// Panics if the window is empty.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    #[must_use]
    pub fn percentile(&self, p: f64) -> u8 {
        assert!(self.total > 0, "percentile query on an empty window");

        let n = self.total as f64;
        if p <= 0.5 {
            let rank = (n * p).floor() as u64;
            scan(self.bins.iter().enumerate(), rank)
        } else {
            let rank = (n * (1.0 - p)).floor() as u64;
            scan(self.bins.iter().enumerate().rev(), rank)
        }
    }

    /// Darkest intensity present, if any.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn min(&self) -> Option<u8> {
        self.bins.iter().position(|&c| c > 0).map(|i| i as u8)
    }

    /// Brightest intensity present, if any.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn max(&self) -> Option<u8> {
        self.bins.iter().rposition(|&c| c > 0).map(|i| i as u8)
    }

    /// Mean intensity, 0 for an empty window.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as u64) * count)
            .sum();
        sum as f64 / self.total as f64
    }

    /// Min, max and mean, zeros for an empty window.
    #[must_use]
    pub fn stats(&self) -> FieldStats {
        FieldStats {
            min: self.min().unwrap_or(0),
            max: self.max().unwrap_or(0),
            mean: self.mean(),
        }
    }
}

/// Walks bins in iteration order and returns the first occupied intensity
/// at which the remaining rank is used up.
///
/// `rank <= total` and the occupied bins sum to `total`, so the walk always
/// ends inside the loop.
#[allow(clippy::cast_possible_truncation)]
fn scan<'a>(bins: impl Iterator<Item = (usize, &'a u64)>, rank: u64) -> u8 {
    let mut remaining = rank;
    for (value, &count) in bins {
        if count == 0 {
            continue;
        }
        if count >= remaining {
            // Safe: value is a bin index in 0..256
            return value as u8;
        }
        remaining -= count;
    }
    unreachable!("rank {rank} exceeds the window total")
}
