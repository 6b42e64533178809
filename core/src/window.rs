//! Sliding windows along the genome.
//!
//! Windows have a fixed width and start at positions `1 + k * stride` on each chromosome. Windows
//! that would contain no variants are never created, and a chromosome change always closes the
//! current window.

use std::{collections::HashSet, io, num::NonZeroUsize};

use crate::variant::{BaseCounts, Variant};

mod sliding;
pub use sliding::SlidingWindows;

/// Window width and stride.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct WindowSettings {
    width: NonZeroUsize,
    stride: usize,
}

impl WindowSettings {
    /// The default window width.
    pub const DEFAULT_WIDTH: usize = 1000;

    /// Creates new settings.
    ///
    /// A stride of zero is interpreted as a stride equal to the width, giving non-overlapping,
    /// adjacent windows.
    pub fn new(width: NonZeroUsize, stride: usize) -> Self {
        Self { width, stride }
    }

    /// Returns the effective stride.
    pub fn stride(&self) -> usize {
        if self.stride == 0 {
            self.width.get()
        } else {
            self.stride
        }
    }

    /// Returns the width.
    pub fn width(&self) -> usize {
        self.width.get()
    }

    /// Returns the smallest window start whose window ends at or after `position`.
    ///
    /// If windows are separated by gaps, the returned start may lie after `position`.
    fn first_start_reaching(&self, position: usize) -> usize {
        let stride = self.stride();
        position
            .saturating_sub(self.width())
            .div_ceil(stride)
            .saturating_mul(stride)
            .saturating_add(1)
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: NonZeroUsize::new(Self::DEFAULT_WIDTH).unwrap_or(NonZeroUsize::MIN),
            stride: 0,
        }
    }
}

/// A positioned entry in a window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry<D> {
    /// The 1-based position of the entry.
    pub position: usize,
    /// The entry data.
    pub data: D,
}

/// A window of entries on a single chromosome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Window<D> {
    chromosome: String,
    start: usize,
    end: usize,
    entries: Vec<Entry<D>>,
}

impl<D> Window<D> {
    /// Returns the chromosome of the window.
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Returns the inclusive, 1-based end position of the window.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the entries in the window, ordered by position.
    pub fn entries(&self) -> &[Entry<D>] {
        &self.entries
    }

    /// Returns the entries in the window, consuming the window.
    pub fn into_entries(self) -> Vec<Entry<D>> {
        self.entries
    }

    /// Returns true if the window has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries in the window.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the 1-based start position of the window.
    pub fn start(&self) -> usize {
        self.start
    }
}

/// Returns windows holding whole variants.
pub fn variant_windows<I>(
    variants: I,
    settings: WindowSettings,
) -> SlidingWindows<I, fn(Variant) -> Variant, Variant>
where
    I: Iterator<Item = io::Result<Variant>>,
{
    let convert: fn(Variant) -> Variant = |variant| variant;
    SlidingWindows::new(variants, settings, convert)
}

/// Returns windows holding only the per-sample base counts of each variant.
pub fn base_counts_windows<I>(
    variants: I,
    settings: WindowSettings,
) -> SlidingWindows<I, fn(Variant) -> Vec<BaseCounts>, Vec<BaseCounts>>
where
    I: Iterator<Item = io::Result<Variant>>,
{
    let convert: fn(Variant) -> Vec<BaseCounts> = |variant| variant.samples;
    SlidingWindows::new(variants, settings, convert)
}

/// Checks that variants arrive sorted by position within chromosomes, and that chromosomes are
/// contiguous.
#[derive(Debug, Default)]
struct SortOrder {
    chromosome: Option<String>,
    position: usize,
    finished: HashSet<String>,
}

impl SortOrder {
    fn check(&mut self, chromosome: &str, position: usize) -> io::Result<()> {
        if self.chromosome.as_deref() == Some(chromosome) {
            if position < self.position {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "input is not sorted: position {position} follows position {} \
                        on chromosome '{chromosome}'",
                        self.position
                    ),
                ));
            }
        } else {
            if self.finished.contains(chromosome) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "input is not sorted: chromosome '{chromosome}' appears again \
                        after other chromosomes"
                    ),
                ));
            }

            if let Some(previous) = self.chromosome.replace(chromosome.to_string()) {
                self.finished.insert(previous);
            }
        }

        self.position = position;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(width: usize, stride: usize) -> WindowSettings {
        WindowSettings::new(NonZeroUsize::new(width).unwrap(), stride)
    }

    #[test]
    fn test_stride_zero_is_width() {
        assert_eq!(settings(10, 0).stride(), 10);
        assert_eq!(settings(10, 3).stride(), 3);
    }

    #[test]
    fn test_first_start_reaching() {
        let adjacent = settings(10, 10);
        assert_eq!(adjacent.first_start_reaching(1), 1);
        assert_eq!(adjacent.first_start_reaching(10), 1);
        assert_eq!(adjacent.first_start_reaching(11), 11);
        assert_eq!(adjacent.first_start_reaching(25), 21);

        let overlapping = settings(10, 3);
        assert_eq!(overlapping.first_start_reaching(10), 1);
        assert_eq!(overlapping.first_start_reaching(15), 7);

        let gapped = settings(5, 10);
        assert_eq!(gapped.first_start_reaching(5), 1);
        assert_eq!(gapped.first_start_reaching(7), 11);
    }

    #[test]
    fn test_sort_order() {
        let mut order = SortOrder::default();

        assert!(order.check("chr1", 5).is_ok());
        assert!(order.check("chr1", 5).is_ok());
        assert!(order.check("chr1", 4).is_err());
        assert!(order.check("chr2", 1).is_ok());
        assert!(order.check("chr1", 10).is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = WindowSettings::default();

        assert_eq!(settings.width(), 1000);
        assert_eq!(settings.stride(), 1000);
    }
}
