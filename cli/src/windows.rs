use std::io::{self, Write};

use anyhow::Error;

use clap::Parser;

use afinput_core::window;

use crate::input::{InputArgs, WindowArgs};

/// Print the sliding windows over the input.
///
/// For each non-empty window, prints the chromosome, the 1-based inclusive start and end, and the
/// number of sites in the window, separated by tabs. Input must be sorted by position within each
/// chromosome.
#[derive(Debug, Parser)]
#[clap(name = crate::NAME, about)]
pub struct Windows {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Include a header with column names.
    #[clap(short = 'H', long)]
    pub header: bool,
}

impl Windows {
    pub fn run(self) -> Result<(), Error> {
        let settings = self.window.settings();
        let stream = self.input.builder().build()?;

        log::info!(
            "Creating windows of width {} with stride {} over {} samples",
            settings.width(),
            settings.stride(),
            stream.samples().len(),
        );

        let mut writer = io::BufWriter::new(io::stdout().lock());

        if self.header {
            writeln!(writer, "chromosome\tstart\tend\tsites")?;
        }

        let mut windows = 0;
        for result in window::base_counts_windows(stream, settings) {
            let window = result?;

            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                window.chromosome(),
                window.start(),
                window.end(),
                window.len()
            )?;

            windows += 1;
        }

        writer.flush()?;

        log::info!("Wrote {windows} windows");

        Ok(())
    }
}
