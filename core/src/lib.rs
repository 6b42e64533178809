#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Unified, streaming input of per-sample allele counts.
//!
//! This serves as the core library implementation for the `afinput` CLI, but can also be used as
//! a free-standing library by tools that compute statistics from pooled or individual sequencing
//! data.
//!
//! # Overview
//!
//! Input may come from samtools mpileup, PoPoolation2 sync, or VCF files. Whatever the format, an
//! [`input::Builder`] opens it as a [`VariantStream`]: a lazy sequence of [`Variant`]s, each
//! holding one [`BaseCounts`] per sample. Streams may be restricted to a [`Region`] and to a
//! subset of samples, and may be grouped into sliding windows using the [`window`] module.
//!
//! # Example
//!
//! ```no_run
//! use std::num::NonZeroUsize;
//!
//! use afinput_core::{input, window};
//!
//! let stream = input::Builder::default()
//!     .set_sync_file(Some("samples.sync".into()))
//!     .set_region(Some(String::from("2R:1-100000")))
//!     .build()?;
//!
//! println!("{} samples", stream.samples().len());
//!
//! let settings = window::WindowSettings::new(NonZeroUsize::new(10_000).unwrap(), 5_000);
//! for window in window::base_counts_windows(stream, settings) {
//!     let window = window?;
//!     println!("{}:{}-{}", window.chromosome(), window.start(), window.end());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod input;
pub use input::Input;

pub mod region;
pub use region::Region;

pub mod sample;
pub use sample::SampleSet;

pub mod stream;
pub use stream::VariantStream;

pub mod variant;
pub use variant::{Base, BaseCounts, Variant};

pub mod window;
pub use window::{Window, WindowSettings};
