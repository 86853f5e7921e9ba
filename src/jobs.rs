//! # bedtools jobs
//!
//! Jobs are built as [`Job`] values first and only turned into shell text when a swarm script
//! is written (see [`dispatch`]). A job names its query file, the bedtools [`Operation`] to
//! run and the file its stdout is redirected to.
use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;

use crate::{
    cli::Against,
    query::{overlap_path, Query},
    utils,
};

pub mod dispatch;

/// Values of `bedtools pairtobed -type` / `bedtools pairtopair -type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OverlapType {
    Either,
    Neither,
    Both,
    Xor,
    Notboth,
    Ispan,
    Ospan,
    Notispan,
    Notospan,
}

impl OverlapType {
    pub fn name(&self) -> &str {
        match self {
            OverlapType::Either => "either",
            OverlapType::Neither => "neither",
            OverlapType::Both => "both",
            OverlapType::Xor => "xor",
            OverlapType::Notboth => "notboth",
            OverlapType::Ispan => "ispan",
            OverlapType::Ospan => "ospan",
            OverlapType::Notispan => "notispan",
            OverlapType::Notospan => "notospan",
        }
    }

    /// `pairtopair` only knows a subset of the types `pairtobed` accepts.
    pub fn valid_for_pairtopair(&self) -> bool {
        matches!(
            self,
            OverlapType::Either | OverlapType::Neither | OverlapType::Both | OverlapType::Notboth
        )
    }
}

impl fmt::Display for OverlapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `bedtools pairtobed`: loops against single intervals
    PairToBed { bed: PathBuf, overlap_type: OverlapType },
    /// `bedtools pairtopair`: loops against loops
    PairToPair { bedpe: PathBuf, overlap_type: OverlapType },
    /// `bedtools shuffle -bedpe`: loops placed randomly within the contigs of `genome`
    Shuffle { genome: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub query: PathBuf,
    pub operation: Operation,
    pub output: PathBuf,
}

impl Job {
    /// Arguments passed to the bedtools executable, without the output redirection.
    pub fn args(&self) -> Vec<OsString> {
        match &self.operation {
            Operation::PairToBed { bed, overlap_type } => vec![
                OsString::from("pairtobed"),
                OsString::from("-a"),
                self.query.clone().into_os_string(),
                OsString::from("-b"),
                bed.clone().into_os_string(),
                OsString::from("-type"),
                OsString::from(overlap_type.name()),
            ],
            Operation::PairToPair {
                bedpe,
                overlap_type,
            } => vec![
                OsString::from("pairtopair"),
                OsString::from("-a"),
                self.query.clone().into_os_string(),
                OsString::from("-b"),
                bedpe.clone().into_os_string(),
                OsString::from("-type"),
                OsString::from(overlap_type.name()),
            ],
            Operation::Shuffle { genome } => vec![
                OsString::from("shuffle"),
                OsString::from("-i"),
                self.query.clone().into_os_string(),
                OsString::from("-g"),
                genome.clone().into_os_string(),
                OsString::from("-bedpe"),
            ],
        }
    }

    /// Render the job as one line of a swarm script.
    pub fn render(&self, bedtools: &str) -> String {
        let args: Vec<String> = self
            .args()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        format!("{bedtools} {} > {}", args.join(" "), self.output.display())
    }
}

/// One `pairtobed` job per query against `bed`, written to
/// `<overlap_dir>/<query>_<bed name>_overlap.txt`.
pub fn bed_jobs<P: AsRef<Path>>(
    queries: &[Query],
    bed: &Path,
    overlap_type: OverlapType,
    overlap_dir: P,
) -> Result<Vec<Job>> {
    let bed_name = utils::name_from_path(bed)?;
    Ok(queries
        .iter()
        .map(|query| Job {
            query: query.path.clone(),
            operation: Operation::PairToBed {
                bed: bed.to_path_buf(),
                overlap_type,
            },
            output: overlap_path(&overlap_dir, &query.name, &bed_name),
        })
        .collect())
}

/// One `pairtopair` job per query against `bedpe`, written to
/// `<overlap_dir>/<query>_<bedpe name>_overlap.txt`.
pub fn bedpe_jobs<P: AsRef<Path>>(
    queries: &[Query],
    bedpe: &Path,
    overlap_type: OverlapType,
    overlap_dir: P,
) -> Result<Vec<Job>> {
    check_pairtopair_type(overlap_type)?;
    let bedpe_name = utils::name_from_path(bedpe)?;
    Ok(queries
        .iter()
        .map(|query| Job {
            query: query.path.clone(),
            operation: Operation::PairToPair {
                bedpe: bedpe.to_path_buf(),
                overlap_type,
            },
            output: overlap_path(&overlap_dir, &query.name, &bedpe_name),
        })
        .collect())
}

/// One `pairtopair` job for every ordered pair of distinct queries, written to
/// `<overlap_dir>/<query>_<other>_overlap.txt`. A query is never compared with itself.
pub fn between_jobs<P: AsRef<Path>>(
    queries: &[Query],
    overlap_type: OverlapType,
    overlap_dir: P,
) -> Result<Vec<Job>> {
    check_pairtopair_type(overlap_type)?;
    let mut jobs = Vec::new();
    for query in queries {
        for other in queries {
            if query.name == other.name {
                continue;
            }
            jobs.push(Job {
                query: query.path.clone(),
                operation: Operation::PairToPair {
                    bedpe: other.path.clone(),
                    overlap_type,
                },
                output: overlap_path(&overlap_dir, &query.name, &other.name),
            });
        }
    }
    Ok(jobs)
}

fn check_pairtopair_type(overlap_type: OverlapType) -> Result<()> {
    if !overlap_type.valid_for_pairtopair() {
        bail!("Overlap type '{overlap_type}' is not supported by bedtools pairtopair");
    }
    Ok(())
}

/// Build the jobs comparing `queries` with what `against` names, together with the label of
/// their swarm script. `reference` is required for bed and bedpe comparisons and must be
/// absent when samples are compared with each other. `shuffled` marks queries that are
/// shuffled files, which are only compared against a reference file.
pub fn overlap_jobs<P: AsRef<Path>>(
    against: Against,
    queries: &[Query],
    reference: Option<&Path>,
    overlap_type: OverlapType,
    overlap_dir: P,
    shuffled: bool,
) -> Result<(Vec<Job>, String)> {
    match against {
        Against::Samples => {
            if shuffled {
                bail!("Shuffled files can only be compared against a reference file");
            }
            if let Some(reference) = reference {
                bail!(
                    "Reference {} is not used when comparing samples with each other",
                    reference.display()
                );
            }
            let jobs = between_jobs(queries, overlap_type, overlap_dir)?;
            Ok((jobs, String::from("samples_between")))
        }
        Against::Bed | Against::Bedpe => {
            let reference = reference
                .context("A reference file is required when comparing against bed or bedpe")?;
            let jobs = if against == Against::Bed {
                bed_jobs(queries, reference, overlap_type, overlap_dir)?
            } else {
                bedpe_jobs(queries, reference, overlap_type, overlap_dir)?
            };
            Ok((jobs, script_label(reference, shuffled)?))
        }
    }
}

/// Label of the swarm script for jobs against `reference`. Jobs on shuffled files get
/// their own script, `all_<reference>_shuffle_overlap.swarm`.
pub fn script_label(reference: &Path, shuffled: bool) -> Result<String> {
    let name = utils::name_from_path(reference)?;
    Ok(if shuffled {
        format!("{name}_shuffle")
    } else {
        name
    })
}

/// Path of the swarm script for jobs labelled `label`: `<script_dir>/all_<label>_overlap.swarm`.
pub fn script_path<P: AsRef<Path>>(script_dir: P, label: &str) -> PathBuf {
    script_dir
        .as_ref()
        .join(format!("all_{label}_overlap.swarm"))
}
