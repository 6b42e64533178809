//! Reading samtools mpileup input.
//!
//! Each line holds a chromosome, a position, and a reference base, followed by three fields per
//! sample: read coverage, read bases, and base qualities.

use crate::variant::{Base, BaseCounts};

use super::text::{self, ParseSampleError};

/// Pileup per-sample columns.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PileupColumns;

/// A pileup reader.
pub type Reader<R> = text::Reader<R, PileupColumns>;

impl text::Columns for PileupColumns {
    const FIELDS_PER_SAMPLE: usize = 3;

    fn parse_sample(fields: &[&str], reference: Base) -> Result<BaseCounts, ParseSampleError> {
        let &[coverage, bases, _qualities] = fields else {
            return Err(ParseSampleError(format!(
                "expected 3 pileup fields per sample, found {}",
                fields.len()
            )));
        };

        match coverage.parse::<usize>() {
            Ok(0) => Ok(BaseCounts::default()),
            Ok(_) => tally(bases, reference),
            Err(_) => Err(ParseSampleError(format!(
                "invalid read coverage '{coverage}'"
            ))),
        }
    }
}

/// Counts the bases in a pileup read bases field.
fn tally(bases: &str, reference: Base) -> Result<BaseCounts, ParseSampleError> {
    let mut counts = BaseCounts::default();

    let bytes = bases.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'.' | b',' => *counts.get_mut(reference) += 1,
            b'*' | b'#' => counts.d += 1,
            // Read start is followed by the mapping quality
            b'^' => i += 1,
            b'$' | b'<' | b'>' => (),
            b'+' | b'-' => {
                let digits = bytes[i + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();

                let len = bases[i + 1..i + 1 + digits]
                    .parse::<usize>()
                    .map_err(|_| {
                        ParseSampleError(format!("missing indel length in read bases '{bases}'"))
                    })?;

                i += digits + len;
                if i >= bytes.len() {
                    return Err(ParseSampleError(format!(
                        "truncated indel in read bases '{bases}'"
                    )));
                }
            }
            b if b.is_ascii_alphabetic() => *counts.get_mut(Base::from_ascii(b)) += 1,
            b => {
                return Err(ParseSampleError(format!(
                    "unexpected character '{}' in read bases '{bases}'",
                    b as char
                )))
            }
        }

        i += 1;
    }

    Ok(counts)
}
