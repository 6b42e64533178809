//! Line-based, tab-separated input with a fixed number of columns per sample.

use std::{fmt, io, marker::PhantomData};

use crate::variant::{Base, BaseCounts};

use super::{OpenError, ReadStatus, Record, RecordReader};

/// The per-sample columns of a line-based format.
pub trait Columns {
    /// The number of tab-separated fields per sample.
    const FIELDS_PER_SAMPLE: usize;

    /// Parses the fields of a single sample.
    fn parse_sample(fields: &[&str], reference: Base) -> Result<BaseCounts, ParseSampleError>;
}

/// An error associated with parsing the columns of a single sample.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSampleError(pub String);

impl fmt::Display for ParseSampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseSampleError {}

/// A reader of line-based input.
///
/// The first record is read on construction to determine the number of samples. Samples not
/// retained by the column mask are skipped without being parsed.
pub struct Reader<R, C> {
    inner: R,
    buf: String,
    line: usize,
    raw_sample_count: usize,
    mask: Option<Vec<bool>>,
    first: Option<Record>,
    columns: PhantomData<C>,
}

impl<R, C> Reader<R, C>
where
    R: io::BufRead,
    C: Columns,
{
    /// Creates a new reader parsing all samples.
    pub fn new(inner: R) -> Result<Self, OpenError> {
        Self::with_mask(inner, None)
    }

    /// Creates a new reader parsing only the samples retained by the mask.
    ///
    /// The mask must have one entry per sample column in the input.
    pub fn with_mask(inner: R, mask: Option<Vec<bool>>) -> Result<Self, OpenError> {
        let mut reader = Self {
            inner,
            buf: String::new(),
            line: 0,
            raw_sample_count: 0,
            mask,
            first: None,
            columns: PhantomData,
        };

        if !reader.read_line()? {
            return Err(OpenError::Empty);
        }

        let fields = reader.buf.trim_end_matches(['\n', '\r']).split('\t').count();
        reader.raw_sample_count = match fields.checked_sub(3) {
            Some(columns) if columns > 0 && columns % C::FIELDS_PER_SAMPLE == 0 => {
                columns / C::FIELDS_PER_SAMPLE
            }
            _ => {
                return Err(reader
                    .invalid_data(format!("unexpected number of fields ({fields})"))
                    .into())
            }
        };

        if let Some(mask) = reader.mask.as_ref() {
            if mask.len() != reader.raw_sample_count {
                return Err(reader
                    .invalid_data(format!(
                        "sample mask covers {} samples, but input has {}",
                        mask.len(),
                        reader.raw_sample_count
                    ))
                    .into());
            }
        }

        reader.first = Some(reader.parse_line()?);

        Ok(reader)
    }

    /// Returns the number of sample columns in the input, including those not retained.
    pub fn raw_sample_count(&self) -> usize {
        self.raw_sample_count
    }

    fn invalid_data(&self, msg: String) -> io::Error {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("line {}: {msg}", self.line),
        )
    }

    fn parse_line(&self) -> io::Result<Record> {
        let fields = self
            .buf
            .trim_end_matches(['\n', '\r'])
            .split('\t')
            .collect::<Vec<_>>();

        let (chromosome, position, reference, sample_fields) = match fields.as_slice() {
            [chromosome, position, reference, sample_fields @ ..] if !chromosome.is_empty() => {
                (*chromosome, *position, *reference, sample_fields)
            }
            _ => return Err(self.invalid_data(String::from("missing site fields"))),
        };

        let position = match position.parse::<usize>() {
            Ok(position) if position > 0 => position,
            _ => return Err(self.invalid_data(format!("invalid position '{position}'"))),
        };

        let reference_base = match reference.as_bytes() {
            [b] => Base::from_ascii(*b),
            _ => {
                return Err(self.invalid_data(format!("invalid reference base '{reference}'")))
            }
        };

        let raw_sample_count = sample_fields.len() / C::FIELDS_PER_SAMPLE;
        if sample_fields.len() % C::FIELDS_PER_SAMPLE != 0
            || raw_sample_count != self.raw_sample_count
        {
            return Err(self.invalid_data(format!(
                "expected {} samples, found {} sample fields",
                self.raw_sample_count,
                sample_fields.len()
            )));
        }

        let samples = sample_fields
            .chunks(C::FIELDS_PER_SAMPLE)
            .enumerate()
            .filter(|(i, _)| self.mask.as_ref().map_or(true, |mask| mask[*i]))
            .map(|(_, fields)| C::parse_sample(fields, reference_base))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.invalid_data(e.0))?;

        Ok(Record {
            chromosome: chromosome.to_string(),
            position,
            reference_base,
            samples,
        })
    }

    /// Reads the next non-empty line into the buffer, returning false at end of input.
    fn read_line(&mut self) -> io::Result<bool> {
        loop {
            self.buf.clear();

            match self.inner.read_line(&mut self.buf) {
                Ok(0) => return Ok(false),
                Ok(_) => self.line += 1,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    // The invalid line is consumed
                    self.line += 1;
                    return Err(self.invalid_data(e.to_string()));
                }
                Err(e) => return Err(e),
            }

            if !self.buf.trim().is_empty() {
                return Ok(true);
            }
        }
    }
}

impl<R, C> RecordReader for Reader<R, C>
where
    R: io::BufRead,
    C: Columns,
{
    type Record = Record;

    fn read_record(&mut self) -> ReadStatus<Self::Record> {
        if let Some(record) = self.first.take() {
            return ReadStatus::Read(record);
        }

        match self.read_line() {
            Ok(true) => match self.parse_line() {
                Ok(record) => ReadStatus::Read(record),
                Err(e) => ReadStatus::Error(e),
            },
            Ok(false) => ReadStatus::Done,
            Err(e) => ReadStatus::Error(e),
        }
    }

    fn sample_count(&self) -> usize {
        match self.mask.as_ref() {
            Some(mask) => mask.iter().filter(|&&keep| keep).count(),
            None => self.raw_sample_count,
        }
    }
}
