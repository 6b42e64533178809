//! Sample names and sample filtering.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexSet;

/// An ordered set of unique sample names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SampleSet(IndexSet<String>);

impl SampleSet {
    /// Creates a set of synthesized sample names `prefix1`, `prefix2`, ..., `prefix{count}`.
    pub fn from_prefix(prefix: &str, count: usize) -> Self {
        Self((1..=count).map(|i| format!("{prefix}{i}")).collect())
    }

    /// Returns the index of a sample name, if present.
    pub fn get_index_of(&self, sample: &str) -> Option<usize> {
        self.0.get_index_of(sample)
    }

    /// Returns true if the set contains no samples.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the sample names, in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S> FromIterator<S> for SampleSet
where
    S: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Extend<String> for SampleSet {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.0.extend(iter)
    }
}

/// A source for a list of sample names used for filtering.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SampleList {
    /// A path to a file with one sample name per line.
    Path(PathBuf),
    /// An inline list of sample names.
    List(Vec<String>),
}

impl SampleList {
    /// Interprets a user-provided value as a sample list.
    ///
    /// If the value names an existing file, the list is read from that file. Otherwise, the value
    /// is split on commas and tabs, and empty items are ignored.
    pub fn from_arg(value: &str) -> Self {
        let path = Path::new(value);

        if path.is_file() {
            Self::Path(path.to_path_buf())
        } else {
            Self::List(
                value
                    .split([',', '\t'])
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect(),
            )
        }
    }

    /// Returns the sample names in the list, reading from file if necessary.
    pub fn names(&self) -> io::Result<Vec<String>> {
        match self {
            SampleList::Path(path) => fs::read_to_string(path).map(|s| parse_lines(&s)),
            SampleList::List(names) => Ok(names.clone()),
        }
    }
}

fn parse_lines(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// A sample set after filtering, along with the original column index of each retained sample.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolved {
    samples: SampleSet,
    indices: Vec<usize>,
    raw_count: usize,
}

impl Resolved {
    /// Returns the original column indices of the retained samples.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns true if any sample was removed by filtering.
    pub fn is_filtered(&self) -> bool {
        self.indices.len() != self.raw_count
    }

    /// Returns the column mask over the raw samples, with `true` for retained samples.
    pub fn mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.raw_count];
        for &i in self.indices.iter() {
            mask[i] = true;
        }
        mask
    }

    /// Returns the retained samples.
    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    /// Returns the retained samples, consuming the resolved set.
    pub fn into_samples(self) -> SampleSet {
        self.samples
    }
}

/// Applies include and exclude lists to a set of raw sample names.
///
/// Retained samples keep their raw order and their original indices, they are never renumbered.
///
/// # Errors
///
/// If both lists are non-empty, or if either list names a sample not among the raw names.
pub fn resolve(raw: SampleSet, include: &[String], exclude: &[String]) -> Result<Resolved, Error> {
    let raw_count = raw.len();

    let (names, keep_listed) = match (include.is_empty(), exclude.is_empty()) {
        (false, false) => return Err(Error::ConflictingFilters),
        (true, true) => {
            return Ok(Resolved {
                indices: (0..raw_count).collect(),
                samples: raw,
                raw_count,
            })
        }
        (false, true) => (include, true),
        (true, false) => (exclude, false),
    };

    if let Some(unknown) = names.iter().find(|name| raw.get_index_of(name).is_none()) {
        return Err(Error::UnknownSample {
            sample: unknown.clone(),
        });
    }

    let (indices, samples) = raw
        .iter()
        .enumerate()
        .filter(|(_, sample)| names.iter().any(|name| name == sample) == keep_listed)
        .map(|(i, sample)| (i, sample.to_string()))
        .unzip::<_, _, Vec<_>, SampleSet>();

    Ok(Resolved {
        samples,
        indices,
        raw_count,
    })
}

/// An error associated with resolving samples.
#[derive(Debug)]
pub enum Error {
    /// Both an include and an exclude list were provided.
    ConflictingFilters,
    /// A filter list names a sample not present in the input.
    UnknownSample {
        /// The unknown sample.
        sample: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConflictingFilters => {
                f.write_str("cannot use both sample include and sample exclude filters")
            }
            Error::UnknownSample { sample } => {
                write!(f, "invalid sample name used for filtering: '{sample}'")
            }
        }
    }
}

impl std::error::Error for Error {}
