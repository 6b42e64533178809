use std::io::{self, Write};

use anyhow::Error;

use clap::Parser;

use crate::input::InputArgs;

/// Print the names of the samples in the input.
///
/// Names are printed one per line, in input order and after sample filtering. For pileup and sync
/// input, names are generated from the sample name prefix and the 1-based sample column.
#[derive(Debug, Parser)]
#[clap(name = crate::NAME, about)]
pub struct Samples {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print only the number of samples.
    #[clap(short = 'c', long)]
    pub count: bool,
}

impl Samples {
    pub fn run(self) -> Result<(), Error> {
        let stream = self.input.builder().build()?;
        let samples = stream.samples();

        let mut writer = io::BufWriter::new(io::stdout().lock());

        if self.count {
            writeln!(writer, "{}", samples.len())?;
        } else {
            for name in samples.iter() {
                writeln!(writer, "{name}")?;
            }
        }

        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use clap::error::ErrorKind as ClapErrorKind;

    use afinput_core::sample::SampleList;

    use crate::tests::{parse_subcmd, try_parse_subcmd};

    #[test]
    fn test_input_required() {
        let result = try_parse_subcmd::<Samples>("afinput samples");

        assert_eq!(
            result.unwrap_err().kind(),
            ClapErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_multiple_inputs_conflict() {
        let result =
            try_parse_subcmd::<Samples>("afinput samples --sync-file a.sync --vcf-file b.vcf");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_sample_filters_conflict() {
        let result = try_parse_subcmd::<Samples>(
            "afinput samples --sync-file a.sync \
            --filter-samples-include s1 --filter-samples-exclude s2",
        );

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_sample_name_prefix_conflicts_with_vcf() {
        let result = try_parse_subcmd::<Samples>(
            "afinput samples --vcf-file a.vcf --sample-name-prefix pool",
        );

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_empty_sample_list() {
        let result = try_parse_subcmd::<Samples>(
            "afinput samples --sync-file a.sync --filter-samples-include ,",
        );

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_input_args() {
        let args = parse_subcmd::<Samples>(
            "afinput samples --pileup-file a.pileup --sample-name-prefix pool \
            --filter-region chr1:1-100 --filter-samples-exclude pool1,pool3 -t 2",
        );

        assert_eq!(args.input.pileup_file, Some(PathBuf::from("a.pileup")));
        assert_eq!(args.input.sync_file, None);
        assert_eq!(args.input.sample_name_prefix.as_deref(), Some("pool"));
        assert_eq!(args.input.filter_region.as_deref(), Some("chr1:1-100"));
        assert_eq!(
            args.input.filter_samples_exclude,
            Some(SampleList::List(vec![
                String::from("pool1"),
                String::from("pool3")
            ]))
        );
        assert_eq!(args.input.threads.get(), 2);
        assert!(!args.count);
    }

    #[test]
    fn test_default_threads() {
        let args = parse_subcmd::<Samples>("afinput samples --sync-file a.sync --count");

        assert_eq!(args.input.threads.get(), 1);
        assert!(args.count);
    }

    #[test]
    fn test_zero_threads() {
        let result = try_parse_subcmd::<Samples>("afinput samples --sync-file a.sync -t 0");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ValueValidation);
    }
}
