//! Reading allelic depths from VCF input.

use std::{
    fmt, io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use noodles_vcf::{
    self as vcf,
    variant::{
        record_buf::samples::sample::{value::Array, Value},
        RecordBuf,
    },
};

use crate::{
    sample::SampleSet,
    variant::{Base, BaseCounts, Locus, Variant},
};

use super::{IntoVariant, OpenError, ReadStatus, RecordReader};

const ALLELIC_DEPTHS: &str = "AD";

/// A VCF reader.
///
/// Records are yielded unconverted. On conversion, only biallelic SNPs carrying allelic depths
/// give variants; all other records are skipped. The reference and alternative depths of each
/// sample are assigned to the reference and alternative bases, respectively.
pub struct Reader<R> {
    inner: vcf::io::Reader<R>,
    header: vcf::Header,
    indices: Arc<[usize]>,
    skipped: Arc<Skipped>,
}

impl<R> Reader<R>
where
    R: io::BufRead,
{
    /// Creates a new reader, reading the VCF header.
    ///
    /// # Errors
    ///
    /// If the input is empty, if the header cannot be read, or if the header does not declare the
    /// `AD` FORMAT field.
    pub fn new(mut inner: R) -> Result<Self, OpenError> {
        if inner.fill_buf()?.is_empty() {
            return Err(OpenError::Empty);
        }

        let mut inner = vcf::io::Reader::new(inner);
        let header = inner.read_header()?;

        if !header.formats().contains_key(ALLELIC_DEPTHS) {
            return Err(OpenError::Unsupported {
                reason: format!(
                    "VCF header does not declare the '{ALLELIC_DEPTHS}' FORMAT field, \
                    which is required to read allele counts"
                ),
            });
        }

        let sample_count = header.sample_names().len();
        if sample_count == 0 {
            return Err(OpenError::Unsupported {
                reason: String::from("VCF header does not declare any samples"),
            });
        }

        Ok(Self {
            inner,
            header,
            indices: (0..sample_count).collect(),
            skipped: Arc::default(),
        })
    }

    /// Returns the sample names declared by the header.
    pub fn samples(&self) -> SampleSet {
        self.header.sample_names().iter().cloned().collect()
    }

    /// Restricts the reader to the samples at the provided header indices, in the provided order.
    pub fn set_sample_indices(&mut self, indices: Vec<usize>) {
        self.indices = indices.into();
    }
}

impl<R> RecordReader for Reader<R>
where
    R: io::BufRead,
{
    type Record = Record;

    fn read_record(&mut self) -> ReadStatus<Self::Record> {
        let mut buf = RecordBuf::default();

        match self.inner.read_record_buf(&self.header, &mut buf) {
            Ok(0) => ReadStatus::Done,
            Ok(_) => ReadStatus::Read(Record {
                buf,
                indices: Arc::clone(&self.indices),
                skipped: Arc::clone(&self.skipped),
            }),
            Err(e) => ReadStatus::Error(e),
        }
    }

    fn sample_count(&self) -> usize {
        self.indices.len()
    }
}

/// A raw VCF record.
///
/// The record is located by its chromosome and position without inspecting alleles or sample
/// data, which happens on conversion into a variant.
pub struct Record {
    buf: RecordBuf,
    indices: Arc<[usize]>,
    skipped: Arc<Skipped>,
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("chromosome", &self.chromosome())
            .field("position", &self.position())
            .finish_non_exhaustive()
    }
}

impl Locus for Record {
    fn chromosome(&self) -> &str {
        self.buf.reference_sequence_name()
    }

    /// Returns the 1-based position, or 0 if the record has no position.
    fn position(&self) -> usize {
        self.buf.variant_start().map(usize::from).unwrap_or(0)
    }
}

impl IntoVariant for Record {
    fn into_variant(self) -> io::Result<Option<Variant>> {
        let record = &self.buf;

        let position = record.variant_start().map(usize::from).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "missing position for record on '{}'",
                    record.reference_sequence_name()
                ),
            )
        })?;

        let (reference_base, alternative_base) = match snp_bases(record) {
            Ok(bases) => bases,
            Err(skip) => {
                self.skipped.add(skip);
                return Ok(None);
            }
        };

        let Some(depths) = record.samples().select(ALLELIC_DEPTHS) else {
            self.skipped.add(Skip::MissingDepths);
            return Ok(None);
        };

        let samples = self
            .indices
            .iter()
            .map(|&i| {
                let mut counts = BaseCounts::default();

                if let Some(Some(Value::Array(Array::Integer(values)))) = depths.get(i) {
                    let depth = |allele: usize| {
                        values
                            .get(allele)
                            .copied()
                            .flatten()
                            .and_then(|n| usize::try_from(n).ok())
                            .unwrap_or(0)
                    };

                    *counts.get_mut(reference_base) += depth(0);
                    *counts.get_mut(alternative_base) += depth(1);
                }

                counts
            })
            .collect();

        Ok(Some(Variant {
            chromosome: record.reference_sequence_name().to_string(),
            position,
            reference_base,
            alternative_base,
            samples,
        }))
    }
}

fn snp_bases(record: &RecordBuf) -> Result<(Base, Base), Skip> {
    let is_determined = |b: u8| Base::from_ascii(b).is_determined();

    match (
        record.reference_bases().as_bytes(),
        record.alternate_bases().as_ref(),
    ) {
        (_, []) => Err(Skip::NoAlternative),
        (_, [_, _, ..]) => Err(Skip::Multiallelic),
        (&[reference], [alternative]) => match alternative.as_bytes() {
            &[alternative] if is_determined(reference) && is_determined(alternative) => {
                Ok((Base::from_ascii(reference), Base::from_ascii(alternative)))
            }
            _ => Err(Skip::NotSnp),
        },
        _ => Err(Skip::NotSnp),
    }
}

/// A reason for skipping a VCF record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Skip {
    NoAlternative,
    Multiallelic,
    NotSnp,
    MissingDepths,
}

/// Counts of skipped VCF records by reason, shared by a reader and its records.
///
/// The counts are logged once the reader and all of its records have been dropped.
#[derive(Debug, Default)]
struct Skipped {
    no_alternative: AtomicUsize,
    multiallelic: AtomicUsize,
    not_snp: AtomicUsize,
    missing_depths: AtomicUsize,
}

impl Skipped {
    fn add(&self, skip: Skip) {
        let count = match skip {
            Skip::NoAlternative => &self.no_alternative,
            Skip::Multiallelic => &self.multiallelic,
            Skip::NotSnp => &self.not_snp,
            Skip::MissingDepths => &self.missing_depths,
        };

        count.fetch_add(1, Ordering::Relaxed);
    }

    fn counts(&self) -> [usize; 4] {
        [
            &self.no_alternative,
            &self.multiallelic,
            &self.not_snp,
            &self.missing_depths,
        ]
        .map(|count| count.load(Ordering::Relaxed))
    }

    fn total(&self) -> usize {
        self.counts().iter().sum()
    }
}

impl Drop for Skipped {
    fn drop(&mut self) {
        if self.total() > 0 {
            log::debug!("Skipped {self}");
        }
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [no_alternative, multiallelic, not_snp, missing_depths] = self.counts();

        write!(
            f,
            "{} VCF records: {no_alternative} without alternative allele, \
            {multiallelic} multiallelic, {not_snp} not SNPs, \
            {missing_depths} without '{ALLELIC_DEPTHS}'",
            self.total(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::input::convert;

    const HEADER: &str = "\
##fileformat=VCFv4.3
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##FORMAT=<ID=AD,Number=R,Type=Integer,Description=\"Allelic depths\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample1\tsample2\tsample3
";

    fn reader(records: &str) -> Result<Reader<io::Cursor<Vec<u8>>>, OpenError> {
        Reader::new(io::Cursor::new(format!("{HEADER}{records}").into_bytes()))
    }

    fn variants(reader: Reader<io::Cursor<Vec<u8>>>) -> io::Result<Vec<Variant>> {
        reader.records().filter_map(convert).collect()
    }

    #[test]
    fn test_samples_from_header() -> Result<(), Box<dyn std::error::Error>> {
        let reader = reader("")?;

        assert_eq!(
            reader.samples().iter().collect::<Vec<_>>(),
            ["sample1", "sample2", "sample3"]
        );
        assert_eq!(reader.sample_count(), 3);

        Ok(())
    }

    #[test]
    fn test_read_biallelic_snp() -> Result<(), Box<dyn std::error::Error>> {
        let reader = reader("chr1\t5\t.\tA\tg\t.\t.\t.\tGT:AD\t0/1:3,2\t1/1:0,4\t./.:.\n")?;

        let variants = variants(reader)?;
        assert_eq!(variants.len(), 1);

        let variant = &variants[0];
        assert_eq!(variant.chromosome, "chr1");
        assert_eq!(variant.position, 5);
        assert_eq!(variant.reference_base, Base::A);
        assert_eq!(variant.alternative_base, Base::G);
        assert_eq!(
            variant.samples,
            [
                BaseCounts {
                    a: 3,
                    g: 2,
                    ..Default::default()
                },
                BaseCounts {
                    g: 4,
                    ..Default::default()
                },
                BaseCounts::default(),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_skip_unusable_records() -> Result<(), Box<dyn std::error::Error>> {
        let reader = reader(
            "\
chr1\t1\t.\tA\t.\t.\t.\t.\tAD\t1\t2\t3
chr1\t2\t.\tA\tC,G\t.\t.\t.\tAD\t1,1,1\t2,2,2\t3,3,3
chr1\t3\t.\tAT\tA\t.\t.\t.\tAD\t1,1\t2,2\t3,3
chr1\t4\t.\tA\tT\t.\t.\t.\tGT\t0/1\t0/1\t0/1
chr1\t5\t.\tC\tT\t.\t.\t.\tAD\t1,1\t2,2\t3,3
",
        )?;

        let variants = variants(reader)?;
        assert_eq!(
            variants.iter().map(|v| v.position).collect::<Vec<_>>(),
            [5]
        );

        Ok(())
    }

    #[test]
    fn test_skipped_records_are_counted() -> Result<(), Box<dyn std::error::Error>> {
        let reader = reader(
            "\
chr1\t2\t.\tA\tC,G\t.\t.\t.\tAD\t1,1,1\t2,2,2\t3,3,3
chr1\t3\t.\tAT\tA\t.\t.\t.\tAD\t1,1\t2,2\t3,3
chr1\t4\t.\tA\tT\t.\t.\t.\tGT\t0/1\t0/1\t0/1
",
        )?;
        let skipped = Arc::clone(&reader.skipped);

        assert!(variants(reader)?.is_empty());
        assert_eq!(skipped.counts(), [0, 1, 1, 1]);
        assert_eq!(skipped.total(), 3);

        Ok(())
    }

    #[test]
    fn test_records_are_located_before_conversion() -> Result<(), Box<dyn std::error::Error>> {
        let reader = reader(
            "\
chr2\t0\t.\tA\tC\t.\t.\t.\tAD\t1,1\t1,1\t1,1
chr1\t5\t.\tAT\tA\t.\t.\t.\tAD\t1,1\t2,2\t3,3
",
        )?;
        let skipped = Arc::clone(&reader.skipped);

        let records = reader.records().collect::<io::Result<Vec<_>>>()?;
        assert_eq!(
            records
                .iter()
                .map(|record| (record.chromosome(), record.position()))
                .collect::<Vec<_>>(),
            [("chr2", 0), ("chr1", 5)]
        );
        assert_eq!(skipped.total(), 0);

        let mut records = records.into_iter();
        let missing_position = records.next().ok_or("missing record")?.into_variant();
        assert!(matches!(
            missing_position,
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));
        assert!(records.next().ok_or("missing record")?.into_variant()?.is_none());
        assert_eq!(skipped.total(), 1);

        Ok(())
    }

    #[test]
    fn test_sample_indices() -> Result<(), Box<dyn std::error::Error>> {
        let mut reader = reader("chr1\t5\t.\tA\tC\t.\t.\t.\tAD\t1,2\t3,4\t5,6\n")?;
        reader.set_sample_indices(vec![0, 2]);
        assert_eq!(reader.sample_count(), 2);

        let variants = variants(reader)?;
        assert_eq!(variants[0].samples.len(), 2);
        assert_eq!(variants[0].samples[1].a, 5);
        assert_eq!(variants[0].samples[1].c, 6);

        Ok(())
    }

    #[test]
    fn test_header_without_allelic_depths() {
        let src = "\
##fileformat=VCFv4.3
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample1
chr1\t5\t.\tA\tC\t.\t.\t.\tGT\t0/1
";

        assert!(matches!(
            Reader::new(src.as_bytes()),
            Err(OpenError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(Reader::new(&b""[..]), Err(OpenError::Empty)));
    }
}
