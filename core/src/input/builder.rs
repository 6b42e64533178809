//! Variant stream builder.

use std::{fmt, io, num::NonZeroUsize, path::PathBuf};

use crate::{
    region::{ParseRegionError, Region},
    sample::{self, SampleList, SampleSet},
    stream::VariantStream,
};

use super::{
    pileup::PileupColumns,
    sync::SyncColumns,
    text::{self, Columns},
    vcf, Format, Input, IntoVariant, OpenError, ReadAhead, RecordReader,
};

const READ_AHEAD_CAPACITY: usize = 1024;

/// A variant stream builder.
///
/// Exactly one of the pileup, sync, or VCF inputs must be set.
#[derive(Debug)]
pub struct Builder {
    pileup_file: Option<PathBuf>,
    sync_file: Option<PathBuf>,
    vcf_file: Option<PathBuf>,
    sample_name_prefix: Option<String>,
    region: Option<String>,
    samples_include: Option<SampleList>,
    samples_exclude: Option<SampleList>,
    threads: NonZeroUsize,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            pileup_file: None,
            sync_file: None,
            vcf_file: None,
            sample_name_prefix: None,
            region: None,
            samples_include: None,
            samples_exclude: None,
            threads: NonZeroUsize::MIN,
        }
    }
}

impl Builder {
    /// Returns a new variant stream based on the builder configuration.
    ///
    /// The configuration is validated before any input is opened.
    ///
    /// # Errors
    ///
    /// For a variety of reasons, see [`Error`] for details.
    pub fn build(self) -> Result<VariantStream, Error> {
        let input = self.input()?;

        if input.format().has_sample_names() && self.sample_name_prefix.is_some() {
            return Err(ConfigError::SampleNamePrefixUnsupported.into());
        }

        if self.samples_include.is_some() && self.samples_exclude.is_some() {
            return Err(ConfigError::ConflictingSampleFilters.into());
        }

        let region = match self.region.as_deref().map(str::trim) {
            Some(region) if !region.is_empty() => Some(region.parse::<Region>()?),
            _ => None,
        };

        let include = read_sample_list(self.samples_include.as_ref())?;
        let exclude = read_sample_list(self.samples_exclude.as_ref())?;

        log::info!(
            "Reading {} input from '{}'",
            input.format(),
            input.path().display()
        );
        if let Some(region) = region.as_ref() {
            log::debug!("Restricting input to region {region}");
        }

        let options = Options {
            include,
            exclude,
            region,
            threads: self.threads,
        };

        let stream = match input.format() {
            Format::Pileup => {
                build_text::<PileupColumns>(&input, self.sample_name_prefix, options)
            }
            Format::Sync => build_text::<SyncColumns>(&input, self.sample_name_prefix, options),
            Format::Vcf => build_vcf(&input, options),
        }?;

        log::debug!("Using {} samples", stream.samples().len());

        Ok(stream)
    }

    fn input(&self) -> Result<Input, Error> {
        let mut inputs = [
            (Format::Pileup, self.pileup_file.as_ref()),
            (Format::Sync, self.sync_file.as_ref()),
            (Format::Vcf, self.vcf_file.as_ref()),
        ]
        .into_iter()
        .filter_map(|(format, path)| path.map(|path| Input::new(format, path.clone())));

        match (inputs.next(), inputs.next()) {
            (Some(input), None) => Ok(input),
            (None, _) => Err(ConfigError::NoInput.into()),
            (Some(_), Some(_)) => Err(ConfigError::MultipleInputs.into()),
        }
    }

    /// Sets the pileup input file.
    pub fn set_pileup_file(mut self, path: Option<PathBuf>) -> Self {
        self.pileup_file = path;
        self
    }

    /// Sets the region to which the input is restricted.
    ///
    /// By default, or if the region is empty, the whole input is read.
    pub fn set_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Sets the prefix of synthesized sample names for formats without embedded sample names.
    ///
    /// By default, samples are named by their 1-based column index only.
    pub fn set_sample_name_prefix(mut self, prefix: Option<String>) -> Self {
        self.sample_name_prefix = prefix;
        self
    }

    /// Sets the samples to exclude from the input.
    pub fn set_samples_exclude(mut self, samples: Option<SampleList>) -> Self {
        self.samples_exclude = samples;
        self
    }

    /// Sets the samples to include from the input, excluding all others.
    pub fn set_samples_include(mut self, samples: Option<SampleList>) -> Self {
        self.samples_include = samples;
        self
    }

    /// Sets the sync input file.
    pub fn set_sync_file(mut self, path: Option<PathBuf>) -> Self {
        self.sync_file = path;
        self
    }

    /// Sets the number of threads used for reading.
    ///
    /// With more than one thread, records are parsed ahead of consumption on a single background
    /// worker. By default, reading happens on the calling thread.
    pub fn set_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the VCF input file.
    pub fn set_vcf_file(mut self, path: Option<PathBuf>) -> Self {
        self.vcf_file = path;
        self
    }
}

/// Validated options shared by all formats.
struct Options {
    include: Vec<String>,
    exclude: Vec<String>,
    region: Option<Region>,
    threads: NonZeroUsize,
}

fn read_sample_list(list: Option<&SampleList>) -> io::Result<Vec<String>> {
    list.map_or(Ok(Vec::new()), SampleList::names)
}

fn build_text<C>(
    input: &Input,
    prefix: Option<String>,
    options: Options,
) -> Result<VariantStream, Error>
where
    C: Columns + Send + 'static,
{
    let reader = text::Reader::<_, C>::new(open(input)?).map_err(|e| Error::open(input, e))?;

    let prefix = prefix.as_deref().unwrap_or_default();
    let raw = SampleSet::from_prefix(prefix, reader.raw_sample_count());
    let resolved = sample::resolve(raw, &options.include, &options.exclude)?;

    let reader = if resolved.is_filtered() {
        log::debug!(
            "Reopening '{}' to read {} of {} samples",
            input.path().display(),
            resolved.samples().len(),
            reader.raw_sample_count(),
        );

        text::Reader::<_, C>::with_mask(open(input)?, Some(resolved.mask()))
            .map_err(|e| Error::open(input, e))?
    } else {
        reader
    };

    finish(reader, resolved.into_samples(), options)
}

fn build_vcf(input: &Input, options: Options) -> Result<VariantStream, Error> {
    let mut reader = vcf::Reader::new(open(input)?).map_err(|e| Error::open(input, e))?;

    let resolved = sample::resolve(reader.samples(), &options.include, &options.exclude)?;
    reader.set_sample_indices(resolved.indices().to_vec());

    finish(reader, resolved.into_samples(), options)
}

fn finish<R>(reader: R, samples: SampleSet, options: Options) -> Result<VariantStream, Error>
where
    R: RecordReader + Send + 'static,
    R::Record: IntoVariant + Send + 'static,
{
    if samples.is_empty() {
        log::warn!("No samples remain after sample filtering");
    }

    let stream = if options.threads.get() > 1 {
        let reader = ReadAhead::spawn(reader, READ_AHEAD_CAPACITY)?;
        VariantStream::from_reader(reader, samples, options.region)
    } else {
        VariantStream::from_reader(reader, samples, options.region)
    };

    Ok(stream)
}

fn open(input: &Input) -> io::Result<Box<dyn io::BufRead + Send>> {
    input.open().map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("failed to open '{}': {e}", input.path().display()),
        )
    })
}

/// An error associated with building a variant stream.
#[derive(Debug)]
pub enum Error {
    /// Invalid configuration.
    Config(ConfigError),
    /// The input contains no records.
    EmptyFile {
        /// The path of the input.
        path: PathBuf,
    },
    /// I/O error.
    Io(io::Error),
    /// Invalid region.
    Region(ParseRegionError),
    /// A sample filter names a sample not defined by the input.
    UnknownSample {
        /// The unknown sample.
        sample: String,
    },
    /// The input cannot be used.
    UnsupportedInput {
        /// The path of the input.
        path: PathBuf,
        /// The reason the input cannot be used.
        reason: String,
    },
}

impl Error {
    fn open(input: &Input, e: OpenError) -> Self {
        match e {
            OpenError::Io(e) => Self::Io(e),
            OpenError::Empty => Self::EmptyFile {
                path: input.path().to_path_buf(),
            },
            OpenError::Unsupported { reason } => Self::UnsupportedInput {
                path: input.path().to_path_buf(),
                reason,
            },
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseRegionError> for Error {
    fn from(e: ParseRegionError) -> Self {
        Self::Region(e)
    }
}

impl From<sample::Error> for Error {
    fn from(e: sample::Error) -> Self {
        match e {
            sample::Error::ConflictingFilters => {
                Self::Config(ConfigError::ConflictingSampleFilters)
            }
            sample::Error::UnknownSample { sample } => Self::UnknownSample { sample },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "{e}"),
            Error::EmptyFile { path } => {
                write!(f, "input '{}' contains no records", path.display())
            }
            Error::Io(e) => write!(f, "{e}"),
            Error::Region(e) => write!(f, "{e}"),
            Error::UnknownSample { sample } => {
                write!(f, "invalid sample name used for filtering: '{sample}'")
            }
            Error::UnsupportedInput { path, reason } => {
                write!(f, "cannot use input '{}': {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}

/// An invalid builder configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// No input was provided.
    NoInput,
    /// More than one input was provided.
    MultipleInputs,
    /// Both an include and an exclude sample filter were provided.
    ConflictingSampleFilters,
    /// A sample name prefix was provided for a format with embedded sample names.
    SampleNamePrefixUnsupported,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigError::NoInput => "exactly one input file must be provided, found none",
            ConfigError::MultipleInputs => {
                "exactly one input file must be provided, found several"
            }
            ConfigError::ConflictingSampleFilters => {
                "cannot use both sample include and sample exclude filters"
            }
            ConfigError::SampleNamePrefixUnsupported => {
                "sample name prefix can only be used with pileup or sync input"
            }
        })
    }
}

impl std::error::Error for ConfigError {}
