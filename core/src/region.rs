//! Genomic regions used for filtering.

use std::{fmt, str::FromStr};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::digit1,
    combinator::{all_consuming, map_res, opt},
    sequence::{pair, preceded},
    IResult,
};

/// A genomic region.
///
/// Either a whole chromosome, or an inclusive, 1-based interval on a chromosome. A single position
/// is represented as an interval of length one.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Region {
    chromosome: String,
    interval: Option<(usize, usize)>,
}

impl Region {
    /// Creates a region covering a whole chromosome.
    pub fn chromosome<S>(chromosome: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            chromosome: chromosome.into(),
            interval: None,
        }
    }

    /// Creates a region covering the inclusive interval `[start, end]` on a chromosome.
    ///
    /// Returns `None` if `start` is zero or larger than `end`.
    pub fn interval<S>(chromosome: S, start: usize, end: usize) -> Option<Self>
    where
        S: Into<String>,
    {
        (start > 0 && start <= end).then(|| Self {
            chromosome: chromosome.into(),
            interval: Some((start, end)),
        })
    }

    /// Returns true if the provided site falls inside the region.
    pub fn contains(&self, chromosome: &str, position: usize) -> bool {
        self.chromosome == chromosome
            && self
                .interval
                .map_or(true, |(start, end)| (start..=end).contains(&position))
    }

    /// Returns the chromosome of the region.
    pub fn get_chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Returns the interval of the region, if the region does not cover the whole chromosome.
    pub fn get_interval(&self) -> Option<(usize, usize)> {
        self.interval
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.interval {
            Some((start, end)) if start == end => write!(f, "{}:{start}", self.chromosome),
            Some((start, end)) => write!(f, "{}:{start}-{end}", self.chromosome),
            None => f.write_str(&self.chromosome),
        }
    }
}

impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, (chromosome, interval)) =
            parse_region(s.trim()).map_err(|_| ParseRegionError(s.to_string()))?;

        match interval {
            Some((start, end)) => Region::interval(chromosome, start, end.unwrap_or(start))
                .ok_or_else(|| ParseRegionError(s.to_string())),
            None => Ok(Region::chromosome(chromosome)),
        }
    }
}

type RawRegion<'a> = (&'a str, Option<(usize, Option<usize>)>);

fn parse_region(s: &str) -> IResult<&str, RawRegion<'_>> {
    all_consuming(pair(
        take_while1(|c: char| c != ':'),
        opt(preceded(
            tag(":"),
            pair(
                parse_position,
                opt(preceded(alt((tag("-"), tag(".."))), parse_position)),
            ),
        )),
    ))(s)
}

fn parse_position(s: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(s)
}

/// An error associated with parsing a region.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseRegionError(String);

impl fmt::Display for ParseRegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to parse '{}' as region, expected one of 'chr', 'chr:pos', \
            'chr:start-end', or 'chr:start..end'",
            self.0
        )
    }
}

impl std::error::Error for ParseRegionError {}
