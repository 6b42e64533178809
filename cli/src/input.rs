use std::{num::NonZeroUsize, path::PathBuf};

use clap::{ArgGroup, Args};

use afinput_core::{input, sample::SampleList, WindowSettings};

/// Arguments selecting and filtering the input.
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["pileup_file", "sync_file", "vcf_file"]),
))]
pub struct InputArgs {
    /// Input samtools mpileup file.
    ///
    /// Gzip-compressed input is detected and decompressed automatically.
    #[arg(long, value_name = "FILE")]
    pub pileup_file: Option<PathBuf>,

    /// Input PoPoolation2 sync file.
    ///
    /// Gzip-compressed input is detected and decompressed automatically.
    #[arg(long, value_name = "FILE")]
    pub sync_file: Option<PathBuf>,

    /// Input VCF file.
    ///
    /// Records must carry per-sample allelic depths in the 'AD' FORMAT field. Only biallelic SNPs
    /// are used.
    #[arg(long, value_name = "FILE")]
    pub vcf_file: Option<PathBuf>,

    /// Prefix for sample names in formats without a header.
    ///
    /// Samples in pileup and sync files are named by their 1-based column index, prefixed by this
    /// value. Not available for VCF input, which defines its own sample names.
    #[arg(long, value_name = "STRING", conflicts_with = "vcf_file")]
    pub sample_name_prefix: Option<String>,

    /// Restrict input to a genomic region.
    ///
    /// Given as 'chromosome', 'chromosome:position', 'chromosome:start-end', or
    /// 'chromosome:start..end', with 1-based, inclusive coordinates.
    #[arg(long, value_name = "REGION")]
    pub filter_region: Option<String>,

    /// Only use the listed samples.
    ///
    /// Either a comma-separated list of sample names, or the path to a file with one sample name
    /// per line. Samples keep their input order.
    #[arg(
        long,
        value_name = "LIST|FILE",
        value_parser = parse_sample_list,
        conflicts_with = "filter_samples_exclude",
    )]
    pub filter_samples_include: Option<SampleList>,

    /// Do not use the listed samples.
    ///
    /// Either a comma-separated list of sample names, or the path to a file with one sample name
    /// per line.
    #[arg(long, value_name = "LIST|FILE", value_parser = parse_sample_list)]
    pub filter_samples_exclude: Option<SampleList>,

    /// Number of threads.
    ///
    /// With more than one thread, input is read and parsed on a background thread.
    #[arg(short = 't', long, default_value_t = NonZeroUsize::MIN, value_name = "INT")]
    pub threads: NonZeroUsize,
}

impl InputArgs {
    /// Returns a variant stream builder configured by the arguments.
    pub fn builder(&self) -> input::Builder {
        input::Builder::default()
            .set_pileup_file(self.pileup_file.clone())
            .set_sync_file(self.sync_file.clone())
            .set_vcf_file(self.vcf_file.clone())
            .set_sample_name_prefix(self.sample_name_prefix.clone())
            .set_region(self.filter_region.clone())
            .set_samples_include(self.filter_samples_include.clone())
            .set_samples_exclude(self.filter_samples_exclude.clone())
            .set_threads(self.threads)
    }
}

fn parse_sample_list(s: &str) -> Result<SampleList, String> {
    let list = SampleList::from_arg(s);

    match &list {
        SampleList::List(names) if names.is_empty() => {
            Err(String::from("sample list contains no names"))
        }
        _ => Ok(list),
    }
}

/// Arguments defining sliding windows.
#[derive(Args, Debug)]
pub struct WindowArgs {
    /// Window width in base pairs.
    #[arg(
        long,
        default_value_t = NonZeroUsize::new(WindowSettings::DEFAULT_WIDTH).unwrap(),
        value_name = "INT",
    )]
    pub window_width: NonZeroUsize,

    /// Window stride in base pairs.
    ///
    /// A stride of zero uses the window width, giving adjacent, non-overlapping windows.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub window_stride: usize,
}

impl WindowArgs {
    /// Returns the window settings given by the arguments.
    pub fn settings(&self) -> WindowSettings {
        WindowSettings::new(self.window_width, self.window_stride)
    }
}
