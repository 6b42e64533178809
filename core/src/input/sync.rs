//! Reading PoPoolation2 sync input.
//!
//! Each line holds a chromosome, a position, and a reference base, followed by one field per
//! sample with colon-separated counts in the order `A:T:C:G:N:del`.

use crate::variant::{Base, BaseCounts};

use super::text::{self, ParseSampleError};

/// Sync per-sample columns.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SyncColumns;

/// A sync reader.
pub type Reader<R> = text::Reader<R, SyncColumns>;

impl text::Columns for SyncColumns {
    const FIELDS_PER_SAMPLE: usize = 1;

    fn parse_sample(fields: &[&str], _reference: Base) -> Result<BaseCounts, ParseSampleError> {
        let &[field] = fields else {
            return Err(ParseSampleError(format!(
                "expected 1 sync field per sample, found {}",
                fields.len()
            )));
        };

        parse_counts(field)
    }
}

fn parse_counts(field: &str) -> Result<BaseCounts, ParseSampleError> {
    let err = || ParseSampleError(format!("invalid sync counts '{field}'"));

    // Missing data
    if field == ".:.:.:.:.:." {
        return Ok(BaseCounts::default());
    }

    let mut counts = [0; 6];
    let mut values = field.split(':');
    for count in counts.iter_mut() {
        *count = values
            .next()
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or_else(err)?;
    }

    if values.next().is_some() {
        return Err(err());
    }

    let [a, t, c, g, n, d] = counts;

    Ok(BaseCounts { a, c, g, t, n, d })
}
