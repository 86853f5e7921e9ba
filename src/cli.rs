//! # Command line interface for `loopoverlap`
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    io::json,
    jobs::OverlapType,
    query::{self, Query},
    shuffle,
};

#[derive(Parser)]
#[command(
    name = "loopoverlap",
    author,
    version,
    about = "Overlap chromatin loop calls with genomic annotations using bedtools and swarm",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a cLoops loop table to `loops.bedpe`
    Convert {
        /// Loop table written by cLoops. Expected format is tab-separated with header
        input: PathBuf,

        /// Directory to write `loops.bedpe` to
        output_dir: PathBuf,

        /// Only keep loops flagged as significant
        #[arg(long)]
        significant: bool,
    },
    /// Collect Juicer loop lists into one directory and rewrite them as six-column BEDPE
    Prepare {
        #[command(flatten)]
        samples: SampleArgs,

        /// Juicer output directory containing one sub-directory per sample. If given, the
        /// merged loop lists are copied into --sample-dir first
        #[arg(long)]
        juicer_dir: Option<PathBuf>,

        /// Directory holding `<sample>.bedpe` files with Juicer headers
        #[arg(long)]
        sample_dir: PathBuf,

        /// Directory to write the reformatted files to. Defaults to --sample-dir, overwriting in
        /// place
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write bedtools overlap jobs to a swarm script and submit it
    Jobs {
        #[command(flatten)]
        samples: SampleArgs,

        /// What the samples are compared against
        #[arg(long, value_enum)]
        against: Against,

        /// Reference BED or BEDPE file. Required unless comparing samples with each other
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Overlap type passed to `bedtools -type`
        #[arg(long = "type", value_enum, default_value_t = OverlapType::Either)]
        overlap_type: OverlapType,

        /// Directory holding `<sample>.bedpe` files
        #[arg(long)]
        sample_dir: PathBuf,

        /// Directory bedtools output is written to
        #[arg(long)]
        overlap_dir: PathBuf,

        /// Directory the swarm script is written to
        #[arg(long)]
        script_dir: PathBuf,

        #[command(flatten)]
        shuffles: ShuffleArgs,

        #[command(flatten)]
        dispatch: DispatchArgs,

        #[command(flatten)]
        tools: ToolOptions,
    },
    /// Summarize overlap files of every sample against one reference
    Summarize {
        #[command(flatten)]
        samples: SampleArgs,

        /// Reference BED or BEDPE file the samples were compared against
        #[arg(long)]
        reference: PathBuf,

        /// Directory holding `<sample>.bedpe` files
        #[arg(long)]
        sample_dir: PathBuf,

        /// Directory holding bedtools output
        #[arg(long)]
        overlap_dir: PathBuf,

        #[command(flatten)]
        shuffles: ShuffleArgs,

        /// Delete overlap files once summarized (and shuffled sample files, with --shuffles).
        /// This cannot be undone
        #[arg(long)]
        delete: bool,

        /// Output file. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build count and percent matrices of overlaps between samples
    Matrix {
        #[command(flatten)]
        samples: SampleArgs,

        /// Directory holding `<sample>.bedpe` files
        #[arg(long)]
        sample_dir: PathBuf,

        /// Directory holding bedtools output
        #[arg(long)]
        overlap_dir: PathBuf,

        /// Delete overlap files once read. This cannot be undone
        #[arg(long)]
        delete: bool,

        /// Output file for the count matrix
        #[arg(long)]
        counts_output: PathBuf,

        /// Output file for the percent matrix
        #[arg(long)]
        percent_output: PathBuf,
    },
    /// Shuffle every sample's loops across the genome with `bedtools shuffle`
    Shuffle {
        #[command(flatten)]
        samples: SampleArgs,

        /// Number of shuffled files to generate per sample
        #[arg(short, long = "shuffles", default_value_t = 1, value_parser = shuffles_in_range)]
        n: usize,

        /// Directory holding `<sample>.bedpe` files
        #[arg(long)]
        sample_dir: PathBuf,

        /// Directory to write shuffled files to
        #[arg(long)]
        shuffle_dir: PathBuf,

        /// Genome file with contig sizes
        #[arg(long)]
        genome: PathBuf,

        #[command(flatten)]
        tools: ToolOptions,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Against {
    /// `bedtools pairtobed` against a BED file
    Bed,
    /// `bedtools pairtopair` against a BEDPE file
    Bedpe,
    /// `bedtools pairtopair` between every ordered pair of samples
    Samples,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Sample identifiers
    #[arg(long, num_args = 1.., conflicts_with = "sample_sheet")]
    pub samples: Vec<String>,

    /// JSON file containing an array of sample identifiers
    #[arg(long)]
    pub sample_sheet: Option<PathBuf>,
}

impl SampleArgs {
    pub fn resolve(&self) -> Result<Vec<String>> {
        if let Some(sheet) = &self.sample_sheet {
            json::read_sample_sheet(sheet)
        } else if !self.samples.is_empty() {
            Ok(self.samples.clone())
        } else {
            bail!("No samples given. Use --samples or --sample-sheet")
        }
    }
}

#[derive(Args, Debug)]
pub struct ShuffleArgs {
    /// Use the shuffled files made by `loopoverlap shuffle -n <N>` instead of the samples
    #[arg(long, requires = "shuffle_dir", value_parser = shuffles_in_range)]
    pub shuffles: Option<usize>,

    /// Directory holding shuffled files
    #[arg(long)]
    pub shuffle_dir: Option<PathBuf>,
}

impl ShuffleArgs {
    /// Queries for the real samples, or for their shuffled files if `--shuffles` was given.
    /// The flag says whether the queries are shuffled files.
    pub fn queries(&self, samples: &[String], sample_dir: &Path) -> Result<(Vec<Query>, bool)> {
        match (self.shuffles, &self.shuffle_dir) {
            (Some(n), Some(shuffle_dir)) => {
                Ok((shuffle::shuffled_queries(samples, n, shuffle_dir)?, true))
            }
            (Some(_), None) => bail!("--shuffles requires --shuffle-dir"),
            (None, _) => Ok((query::sample_queries(samples, sample_dir), false)),
        }
    }
}

#[derive(Args, Debug)]
pub struct DispatchArgs {
    /// Run every job here, one after another, instead of submitting to swarm
    #[arg(long, conflicts_with = "no_submit")]
    pub local: bool,

    /// Only write the swarm script
    #[arg(long)]
    pub no_submit: bool,
}

/// External programs and their scheduler settings.
#[derive(Args, Debug, Clone)]
pub struct ToolOptions {
    /// bedtools executable
    #[arg(long, default_value = "bedtools")]
    pub bedtools: String,

    /// swarm executable
    #[arg(long, default_value = "swarm")]
    pub swarm: String,

    /// Environment module loaded by swarm for every job
    #[arg(long, default_value = "bedtools")]
    pub module: String,

    /// Memory in GB per process, passed to swarm's -g (--gb-per-process) option
    #[arg(long, default_value_t = 50, value_parser = gb_in_range)]
    pub gb_per_process: usize,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            bedtools: "bedtools".into(),
            swarm: "swarm".into(),
            module: "bedtools".into(),
            gb_per_process: 50,
        }
    }
}

fn shuffles_in_range(s: &str) -> Result<usize> {
    let n = s
        .parse()
        .context("Could not parse number of shuffles to integer")?;
    if n < 1 {
        bail!("Number of shuffles must be at least 1");
    }
    Ok(n)
}

fn gb_in_range(s: &str) -> Result<usize> {
    let gb = s
        .parse()
        .context("Could not parse value passed to --gb-per-process to integer")?;
    if gb < 1 {
        bail!("--gb-per-process must be at least 1");
    }
    Ok(gb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_jobs() {
        let cli = Cli::try_parse_from([
            "loopoverlap", "jobs", "--samples", "A", "B", "--against", "bed", "--reference",
            "ctcf.bed", "--type", "both", "--sample-dir", "nh", "--overlap-dir", "ov",
            "--script-dir", "sw", "--no-submit",
        ])
        .unwrap();
        let Commands::Jobs {
            samples,
            against,
            overlap_type,
            dispatch,
            tools,
            ..
        } = cli.command
        else {
            panic!("expected jobs subcommand");
        };
        assert_eq!(vec!["A", "B"], samples.resolve().unwrap());
        assert_eq!(Against::Bed, against);
        assert_eq!(OverlapType::Both, overlap_type);
        assert!(dispatch.no_submit);
        assert_eq!(50, tools.gb_per_process);
    }

    #[test]
    fn parse_gb_per_process() {
        let cli = Cli::try_parse_from([
            "loopoverlap", "shuffle", "--samples", "A", "--sample-dir", "nh", "--shuffle-dir",
            "sh", "--genome", "hg19.sizes", "--gb-per-process", "8",
        ])
        .unwrap();
        let Commands::Shuffle { tools, .. } = cli.command else {
            panic!("expected shuffle subcommand");
        };
        assert_eq!(8, tools.gb_per_process);
        assert!(gb_in_range("0").is_err());
    }

    #[test]
    fn shuffled_queries_replace_samples() {
        let samples = vec![String::from("A"), String::from("B")];
        let real = ShuffleArgs {
            shuffles: None,
            shuffle_dir: Some(PathBuf::from("/sh")),
        };
        let (queries, shuffled) = real.queries(&samples, Path::new("/nh")).unwrap();
        assert!(!shuffled);
        assert_eq!(PathBuf::from("/nh/B.bedpe"), queries[1].path);

        let shuffles = ShuffleArgs {
            shuffles: Some(2),
            shuffle_dir: Some(PathBuf::from("/sh")),
        };
        let (queries, shuffled) = shuffles.queries(&samples, Path::new("/nh")).unwrap();
        assert!(shuffled);
        assert_eq!(4, queries.len());
        assert!(queries.iter().all(|q| q.path.starts_with("/sh")));

        let no_dir = ShuffleArgs {
            shuffles: Some(2),
            shuffle_dir: None,
        };
        assert!(no_dir.queries(&samples, Path::new("/nh")).is_err());
    }

    #[test]
    fn shuffles_must_be_positive() {
        assert!(shuffles_in_range("0").is_err());
        assert!(shuffles_in_range("x").is_err());
        assert_eq!(3, shuffles_in_range("3").unwrap());
    }

    #[test]
    fn samples_required() {
        let args = SampleArgs {
            samples: Vec::new(),
            sample_sheet: None,
        };
        assert!(args.resolve().is_err());
    }
}
