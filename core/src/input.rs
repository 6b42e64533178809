//! Readers for pileup, sync, and VCF input.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use flate2::bufread::MultiGzDecoder;

use crate::variant::{Base, BaseCounts, Locus, Variant};

pub mod builder;
pub use builder::Builder;

pub mod pileup;

mod read_ahead;
pub use read_ahead::ReadAhead;

pub mod sync;

mod text;

pub mod vcf;

/// A status when trying to read an element from a reader.
#[derive(Debug)]
pub enum ReadStatus<T> {
    /// Element was succesfully read.
    Read(T),
    /// An error was encountered.
    Error(io::Error),
    /// The reader has finished.
    Done,
}

impl<T> ReadStatus<T> {
    /// Converts the status into the item of an iterator.
    pub fn into_option(self) -> Option<io::Result<T>> {
        match self {
            ReadStatus::Read(t) => Some(Ok(t)),
            ReadStatus::Error(e) => Some(Err(e)),
            ReadStatus::Done => None,
        }
    }
}

/// A reader of raw records from a single input format.
pub trait RecordReader {
    /// The raw record type of the format.
    type Record;

    /// Reads the next record.
    fn read_record(&mut self) -> ReadStatus<Self::Record>;

    /// Returns the number of samples in each record.
    fn sample_count(&self) -> usize;

    /// Returns an iterator over the remaining records.
    fn records(self) -> Records<Self>
    where
        Self: Sized,
    {
        Records(self)
    }
}

impl<R> RecordReader for Box<R>
where
    R: RecordReader + ?Sized,
{
    type Record = R::Record;

    fn read_record(&mut self) -> ReadStatus<Self::Record> {
        (**self).read_record()
    }

    fn sample_count(&self) -> usize {
        (**self).sample_count()
    }
}

/// An iterator over the records of a [`RecordReader`].
#[derive(Debug)]
pub struct Records<R>(R);

impl<R> Iterator for Records<R>
where
    R: RecordReader,
{
    type Item = io::Result<R::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.read_record().into_option()
    }
}

/// A raw record that is positioned before it is converted into a variant.
///
/// Readers only do the work needed to locate a record, so that records can be filtered by locus
/// before paying for conversion.
pub trait IntoVariant: Locus {
    /// Converts the record into a variant.
    ///
    /// Returns `None` if the record holds no usable variant, in which case it is skipped.
    fn into_variant(self) -> io::Result<Option<Variant>>;
}

/// Converts a read result into a variant, dropping records without a usable variant.
pub(crate) fn convert<T>(result: io::Result<T>) -> Option<io::Result<Variant>>
where
    T: IntoVariant,
{
    result.and_then(T::into_variant).transpose()
}

/// A raw record of per-sample base counts, as read from pileup and sync input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// Chromosome name.
    pub chromosome: String,
    /// 1-based position on the chromosome.
    pub position: usize,
    /// Reference base given by the input.
    pub reference_base: Base,
    /// Base counts for each parsed sample.
    pub samples: Vec<BaseCounts>,
}

impl Locus for Record {
    fn chromosome(&self) -> &str {
        &self.chromosome
    }

    fn position(&self) -> usize {
        self.position
    }
}

impl IntoVariant for Record {
    fn into_variant(self) -> io::Result<Option<Variant>> {
        Ok(Some(Variant::from(self)))
    }
}

impl From<Record> for Variant {
    fn from(record: Record) -> Self {
        Variant::with_guessed_alternative(
            record.chromosome,
            record.position,
            record.reference_base,
            record.samples,
        )
    }
}

/// A supported input format.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    /// Samtools mpileup format.
    Pileup,
    /// PoPoolation2 sync format.
    Sync,
    /// Variant call format.
    Vcf,
}

impl Format {
    /// Returns true if sample names are embedded in the format.
    pub fn has_sample_names(&self) -> bool {
        matches!(self, Format::Vcf)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Pileup => "pileup",
            Format::Sync => "sync",
            Format::Vcf => "vcf",
        })
    }
}

/// An input file of a particular format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Input {
    format: Format,
    path: PathBuf,
}

impl Input {
    /// Creates a new input.
    pub fn new<P>(format: Format, path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            format,
            path: path.into(),
        }
    }

    /// Returns the format of the input.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Opens the input for reading.
    ///
    /// Gzip or BGZF compressed input is detected and decompressed transparently.
    pub fn open(&self) -> io::Result<Box<dyn BufRead + Send>> {
        let mut reader = File::open(&self.path).map(io::BufReader::new)?;

        Ok(match CompressionMethod::detect(&mut reader)? {
            Some(CompressionMethod::Gzip) => {
                Box::new(io::BufReader::new(MultiGzDecoder::new(reader)))
            }
            None => Box::new(reader),
        })
    }

    /// Returns the path of the input.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A compression method of an input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CompressionMethod {
    /// Gzip, including BGZF which is a series of gzip members.
    Gzip,
}

impl CompressionMethod {
    fn detect<R>(reader: &mut R) -> io::Result<Option<Self>>
    where
        R: BufRead,
    {
        const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

        let src = reader.fill_buf()?;

        if let Some(buf) = src.get(..GZIP_MAGIC_NUMBER.len()) {
            if buf == GZIP_MAGIC_NUMBER {
                return Ok(Some(CompressionMethod::Gzip));
            }
        }

        Ok(None)
    }
}

/// An error associated with opening a format reader.
#[derive(Debug)]
pub enum OpenError {
    /// I/O error.
    Io(io::Error),
    /// The input contains no records from which to read the number of samples.
    Empty,
    /// The input is well-formed, but cannot be used.
    Unsupported {
        /// The reason the input is unsupported.
        reason: String,
    },
}

impl From<io::Error> for OpenError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::Io(e) => write!(f, "{e}"),
            OpenError::Empty => f.write_str("input contains no records"),
            OpenError::Unsupported { reason } => f.write_str(reason),
        }
    }
}

impl std::error::Error for OpenError {}
