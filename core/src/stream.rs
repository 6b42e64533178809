//! A format-independent stream of variants.

use std::{fmt, io};

use crate::{
    input::{convert, IntoVariant, RecordReader},
    region::Region,
    sample::SampleSet,
    variant::{Locus, Variant},
};

/// A lazy, single-pass stream of variants read from any supported input format.
///
/// Every variant in the stream carries one set of base counts per sample in [`Self::samples`],
/// in the same order.
pub struct VariantStream {
    samples: SampleSet,
    inner: Box<dyn Iterator<Item = io::Result<Variant>> + Send>,
}

impl VariantStream {
    /// Creates a new stream from samples and an iterator of variants.
    pub fn new<I>(samples: SampleSet, variants: I) -> Self
    where
        I: Iterator<Item = io::Result<Variant>> + Send + 'static,
    {
        Self {
            samples,
            inner: Box::new(variants),
        }
    }

    /// Creates a new stream from a format reader.
    ///
    /// If a region is provided, raw records outside the region are dropped before conversion.
    /// Records without a usable variant are skipped.
    pub(crate) fn from_reader<R>(reader: R, samples: SampleSet, region: Option<Region>) -> Self
    where
        R: RecordReader + Send + 'static,
        R::Record: IntoVariant,
    {
        let records = reader.records();

        match region {
            Some(region) => Self::new(
                samples,
                records
                    .filter(move |result| match result {
                        Ok(record) => region.contains(record.chromosome(), record.position()),
                        Err(_) => true,
                    })
                    .filter_map(convert),
            ),
            None => Self::new(samples, records.filter_map(convert)),
        }
    }

    /// Returns the samples of the stream.
    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }
}

impl fmt::Debug for VariantStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantStream")
            .field("samples", &self.samples)
            .finish_non_exhaustive()
    }
}

impl Iterator for VariantStream {
    type Item = io::Result<Variant>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
