//! Unified per-site variant records.

use std::fmt;

mod base_counts;
pub use base_counts::BaseCounts;

/// A nucleotide base.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Base {
    /// Adenine.
    A,
    /// Cytosine.
    C,
    /// Guanine.
    G,
    /// Thymine.
    T,
    /// Unknown or ambiguous base.
    N,
}

impl Base {
    /// The four determined bases, in tie-breaking order.
    pub const ACGT: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

    /// Returns the base corresponding to an ASCII character, ignoring case.
    ///
    /// Any character other than `A`, `C`, `G`, or `T` maps to [`Base::N`].
    pub fn from_ascii(c: u8) -> Self {
        match c.to_ascii_uppercase() {
            b'A' => Self::A,
            b'C' => Self::C,
            b'G' => Self::G,
            b'T' => Self::T,
            _ => Self::N,
        }
    }

    /// Returns true if the base is one of `A`, `C`, `G`, or `T`.
    pub fn is_determined(&self) -> bool {
        !matches!(self, Self::N)
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
            Base::N => 'N',
        };

        write!(f, "{c}")
    }
}

/// A single genomic site with per-sample base counts.
///
/// Within a stream, every variant carries exactly one [`BaseCounts`] per retained sample, in the
/// sample order fixed when the stream was opened.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Variant {
    /// Chromosome name.
    pub chromosome: String,
    /// 1-based position on the chromosome.
    pub position: usize,
    /// Reference base.
    pub reference_base: Base,
    /// Alternative base.
    pub alternative_base: Base,
    /// Base counts, one per retained sample.
    pub samples: Vec<BaseCounts>,
}

impl Variant {
    /// Creates a new variant, guessing the alternative base from the sample counts.
    ///
    /// The alternative is the most frequent determined base other than the reference, summed over
    /// all samples. If the reference base is not determined, the reference becomes the most
    /// frequent base and the alternative the second most frequent one. Ties are broken in `A`,
    /// `C`, `G`, `T` order.
    pub fn with_guessed_alternative(
        chromosome: String,
        position: usize,
        reference_base: Base,
        samples: Vec<BaseCounts>,
    ) -> Self {
        let total = samples.iter().copied().sum::<BaseCounts>();

        let (reference_base, alternative_base) = if reference_base.is_determined() {
            (reference_base, total.most_frequent_except(reference_base))
        } else {
            let reference_base = total.most_frequent_except(Base::N);
            (reference_base, total.most_frequent_except(reference_base))
        };

        Self {
            chromosome,
            position,
            reference_base,
            alternative_base,
            samples,
        }
    }
}

/// A raw record that can be located on the genome.
///
/// Implemented by the raw records of every input format, so that region membership can be tested
/// before a record is converted into a [`Variant`].
pub trait Locus {
    /// Returns the chromosome name.
    fn chromosome(&self) -> &str;

    /// Returns the 1-based position.
    fn position(&self) -> usize;
}

impl Locus for Variant {
    fn chromosome(&self) -> &str {
        &self.chromosome
    }

    fn position(&self) -> usize {
        self.position
    }
}
