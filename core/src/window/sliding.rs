use std::{collections::VecDeque, io};

use crate::variant::Variant;

use super::{Entry, SortOrder, Window, WindowSettings};

/// An iterator grouping a stream of variants into sliding windows.
///
/// Variants must be sorted by position within each chromosome, and each chromosome must appear in
/// a single contiguous block. Input violating this yields an error of kind
/// [`io::ErrorKind::InvalidData`], after which the iterator is exhausted.
///
/// When the stride is smaller than the width, windows overlap and each entry is included in all
/// windows containing it. When the stride is larger than the width, variants falling between
/// windows are dropped.
pub struct SlidingWindows<I, F, D> {
    inner: I,
    convert: F,
    settings: WindowSettings,
    order: SortOrder,
    current: Option<Current>,
    buffer: VecDeque<Entry<D>>,
    pending: Option<Variant>,
    exhausted: bool,
    failed: bool,
}

struct Current {
    chromosome: String,
    start: usize,
}

impl<I, F, D> SlidingWindows<I, F, D>
where
    I: Iterator<Item = io::Result<Variant>>,
    F: FnMut(Variant) -> D,
{
    /// Creates a new sliding window iterator, converting each variant into window entry data.
    pub fn new(variants: I, settings: WindowSettings, convert: F) -> Self {
        Self {
            inner: variants,
            convert,
            settings,
            order: SortOrder::default(),
            current: None,
            buffer: VecDeque::new(),
            pending: None,
            exhausted: false,
            failed: false,
        }
    }

    /// Returns the window settings.
    pub fn settings(&self) -> WindowSettings {
        self.settings
    }

    fn push(&mut self, variant: Variant) {
        let position = variant.position;
        let data = (self.convert)(variant);

        self.buffer.push_back(Entry { position, data });
    }

    fn emit(&mut self, current: Current) -> Window<D>
    where
        D: Clone,
    {
        let end = window_end(current.start, self.settings);
        let next_start = current.start.checked_add(self.settings.stride());

        // Entries before the next window are moved out, the rest are shared with it
        let moved = match next_start {
            Some(next_start) => self
                .buffer
                .iter()
                .take_while(|entry| entry.position < next_start)
                .count(),
            None => self.buffer.len(),
        };
        let mut entries = self.buffer.drain(..moved).collect::<Vec<_>>();
        entries.extend(self.buffer.iter().cloned());

        if let Some(next_start) = next_start.filter(|_| !self.buffer.is_empty()) {
            self.current = Some(Current {
                chromosome: current.chromosome.clone(),
                start: next_start,
            });
        }

        Window {
            chromosome: current.chromosome,
            start: current.start,
            end,
            entries,
        }
    }
}

impl<I, F, D> Iterator for SlidingWindows<I, F, D>
where
    I: Iterator<Item = io::Result<Variant>>,
    F: FnMut(Variant) -> D,
    D: Clone,
{
    type Item = io::Result<Window<D>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if self.pending.is_none() && !self.exhausted {
                match self.inner.next() {
                    Some(Ok(variant)) => {
                        if let Err(e) = self.order.check(&variant.chromosome, variant.position) {
                            self.failed = true;
                            return Some(Err(e));
                        }

                        self.pending = Some(variant);
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    None => self.exhausted = true,
                }
            }

            match self.current.take() {
                Some(current) => {
                    let end = window_end(current.start, self.settings);

                    match self.pending.take() {
                        Some(variant)
                            if variant.chromosome == current.chromosome
                                && variant.position <= end =>
                        {
                            self.push(variant);
                            self.current = Some(current);
                        }
                        pending => {
                            self.pending = pending;
                            return Some(Ok(self.emit(current)));
                        }
                    }
                }
                None => {
                    let variant = self.pending.take()?;
                    let start = self.settings.first_start_reaching(variant.position);

                    // Variants between windows belong to none
                    if start <= variant.position {
                        self.current = Some(Current {
                            chromosome: variant.chromosome.clone(),
                            start,
                        });
                        self.push(variant);
                    }
                }
            }
        }
    }
}

/// Returns the inclusive end of the window starting at `start`, saturating at the largest position.
fn window_end(start: usize, settings: WindowSettings) -> usize {
    start.saturating_add(settings.width() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::num::NonZeroUsize;

    use crate::{
        variant::{Base, BaseCounts},
        window::{base_counts_windows, variant_windows},
    };

    fn variant(chromosome: &str, position: usize) -> Variant {
        Variant {
            chromosome: chromosome.to_string(),
            position,
            reference_base: Base::A,
            alternative_base: Base::C,
            samples: vec![BaseCounts {
                a: position,
                ..Default::default()
            }],
        }
    }

    fn variants(sites: &[(&str, usize)]) -> impl Iterator<Item = io::Result<Variant>> {
        sites
            .iter()
            .map(|&(chromosome, position)| Ok(variant(chromosome, position)))
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn settings(width: usize, stride: usize) -> WindowSettings {
        WindowSettings::new(NonZeroUsize::new(width).unwrap(), stride)
    }

    type Summary = (String, usize, usize, Vec<usize>);

    fn summarise(sites: &[(&str, usize)], settings: WindowSettings) -> io::Result<Vec<Summary>> {
        variant_windows(variants(sites), settings)
            .map(|result| {
                result.map(|window| {
                    (
                        window.chromosome().to_string(),
                        window.start(),
                        window.end(),
                        window.entries().iter().map(|e| e.position).collect(),
                    )
                })
            })
            .collect()
    }

    fn summary(chromosome: &str, start: usize, end: usize, positions: &[usize]) -> Summary {
        (chromosome.to_string(), start, end, positions.to_vec())
    }

    #[test]
    fn test_adjacent_windows() -> io::Result<()> {
        let sites = [("chr1", 1), ("chr1", 5), ("chr1", 10), ("chr1", 15), ("chr1", 21)];

        assert_eq!(
            summarise(&sites, settings(10, 10))?,
            [
                summary("chr1", 1, 10, &[1, 5, 10]),
                summary("chr1", 11, 20, &[15]),
                summary("chr1", 21, 30, &[21]),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_zero_stride_equals_width() -> io::Result<()> {
        let sites = [("chr1", 1), ("chr1", 5), ("chr1", 10), ("chr1", 15), ("chr1", 21)];

        assert_eq!(
            summarise(&sites, settings(10, 0))?,
            summarise(&sites, settings(10, 10))?
        );

        Ok(())
    }

    #[test]
    fn test_chromosome_change_closes_window() -> io::Result<()> {
        let sites = [("chrA", 9), ("chrA", 11), ("chrB", 1)];

        assert_eq!(
            summarise(&sites, settings(10, 10))?,
            [
                summary("chrA", 1, 10, &[9]),
                summary("chrA", 11, 20, &[11]),
                summary("chrB", 1, 10, &[1]),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_overlapping_windows_share_entries() -> io::Result<()> {
        let sites = [("chr1", 3), ("chr1", 8), ("chr1", 12)];

        assert_eq!(
            summarise(&sites, settings(10, 5))?,
            [
                summary("chr1", 1, 10, &[3, 8]),
                summary("chr1", 6, 15, &[8, 12]),
                summary("chr1", 11, 20, &[12]),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_overlapping_windows_across_chromosomes() -> io::Result<()> {
        let sites = [("chr1", 9), ("chr2", 2)];

        assert_eq!(
            summarise(&sites, settings(10, 5))?,
            [
                summary("chr1", 1, 10, &[9]),
                summary("chr1", 6, 15, &[9]),
                summary("chr2", 1, 10, &[2]),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_empty_windows_are_skipped() -> io::Result<()> {
        let sites = [("chr1", 5), ("chr1", 95), ("chr1", 95)];

        assert_eq!(
            summarise(&sites, settings(10, 10))?,
            [
                summary("chr1", 1, 10, &[5]),
                summary("chr1", 91, 100, &[95, 95]),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_variants_between_windows_are_dropped() -> io::Result<()> {
        let sites = [("chr1", 3), ("chr1", 7), ("chr1", 12)];

        assert_eq!(
            summarise(&sites, settings(5, 10))?,
            [summary("chr1", 1, 5, &[3]), summary("chr1", 11, 15, &[12])]
        );

        Ok(())
    }

    #[test]
    fn test_empty_input() -> io::Result<()> {
        assert!(summarise(&[], settings(10, 10))?.is_empty());

        Ok(())
    }

    #[test]
    fn test_unsorted_positions() {
        let mut windows = variant_windows(variants(&[("chr1", 5), ("chr1", 3)]), settings(10, 0));

        assert!(matches!(
            windows.next(),
            Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData
        ));
        assert!(windows.next().is_none());
    }

    #[test]
    fn test_revisited_chromosome() {
        let sites = [("chr1", 5), ("chr2", 3), ("chr1", 20)];
        let results = variant_windows(variants(&sites), settings(10, 0)).collect::<Vec<_>>();

        assert!(matches!(results.last(), Some(Err(_))));
    }

    #[test]
    fn test_input_errors_are_passed_through() -> io::Result<()> {
        let inner = vec![
            Ok(variant("chr1", 1)),
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad line")),
            Ok(variant("chr1", 2)),
        ];
        let mut windows = variant_windows(inner.into_iter(), settings(10, 0));

        assert!(matches!(windows.next(), Some(Err(_))));
        assert_eq!(windows.next().transpose()?.map(|w| w.len()), Some(2));
        assert!(windows.next().is_none());

        Ok(())
    }

    #[test]
    fn test_base_counts_windows() -> io::Result<()> {
        let windows = base_counts_windows(variants(&[("chr1", 2), ("chr1", 4)]), settings(10, 0))
            .collect::<io::Result<Vec<_>>>()?;

        assert_eq!(windows.len(), 1);

        let counts = windows
            .into_iter()
            .flat_map(Window::into_entries)
            .map(|entry| entry.data[0].a)
            .collect::<Vec<_>>();
        assert_eq!(counts, [2, 4]);

        Ok(())
    }

    #[test]
    fn test_positions_near_maximum() -> io::Result<()> {
        let position = usize::MAX - 1;
        let windows = summarise(&[("chr1", 5), ("chr1", position)], settings(10, 5))?;

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0], summary("chr1", 1, 10, &[5]));
        assert!(windows[1..].iter().all(|(_, start, end, positions)| {
            *start <= position && *end == usize::MAX && positions == &[position]
        }));

        Ok(())
    }

    #[test]
    fn test_maximum_position() -> io::Result<()> {
        let windows = summarise(&[("chr1", usize::MAX)], settings(10, 5))?;

        assert_eq!(windows.len(), 2);
        assert!(windows
            .iter()
            .all(|(_, _, end, positions)| *end == usize::MAX && positions == &[usize::MAX]));

        Ok(())
    }
}
