//! # Summarizing bedtools overlap output
//!
//! bedtools reports one line per match, so a loop that hits three annotations appears three
//! times with the same leading six columns. Every count here is the number of distinct loops,
//! i.e. distinct first-six-column rows, and percentages are relative to the number of loops in
//! the query file at the time of summarizing.
use std::{collections::HashSet, path::Path};

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use log::{info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    bedpe::BEDPE_COLUMNS,
    query::{overlap_path, sample_path, Query},
    utils,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapSummary {
    pub sample: String,
    pub counts: usize,
    pub total: usize,
    pub percent: f64,
}

/// Which consumed files [`summarize_queries`] removes after summarizing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    Keep,
    /// Remove the bedtools output
    OverlapFiles,
    /// Remove the bedtools output and the query file, for throwaway shuffled files
    OverlapAndQueryFiles,
}

/// `counts` as a percentage of `total`. No overlaps is 0% regardless of `total`.
pub fn percent(counts: usize, total: usize) -> Result<f64> {
    if counts == 0 {
        return Ok(0.);
    }
    if total == 0 {
        bail!("Found {counts} overlaps but the query file has no loops");
    }
    Ok(counts as f64 / total as f64 * 100.)
}

/// Number of distinct loops in a non-empty bedtools output file.
pub fn count_unique_loops<P: AsRef<Path>>(overlap_file: P) -> Result<usize> {
    let overlap_file = overlap_file.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b'\t')
        .from_path(overlap_file)
        .with_context(|| format!("Could not read overlap file {}", overlap_file.display()))?;

    let mut unique: HashSet<Vec<String>> = HashSet::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to read line {} of {}", i + 1, overlap_file.display())
        })?;
        if record.len() < BEDPE_COLUMNS {
            bail!(
                "Line {} of {} has {} columns, expected at least {BEDPE_COLUMNS}",
                i + 1,
                overlap_file.display(),
                record.len()
            );
        }
        unique.insert(record.iter().take(BEDPE_COLUMNS).map(String::from).collect());
    }

    Ok(unique.len())
}

/// Summarize the bedtools output in `overlap_file` for the query file `sample_file`.
/// The summary is named after the file stem of `sample_file`. An empty `overlap_file`
/// means no overlaps.
pub fn summarize_overlap<P: AsRef<Path>, Q: AsRef<Path>>(
    overlap_file: P,
    sample_file: Q,
) -> Result<OverlapSummary> {
    let sample = utils::name_from_path(&sample_file)?;
    let total = utils::count_lines(&sample_file)?;

    let counts = if utils::is_empty_file(&overlap_file)? {
        0
    } else {
        count_unique_loops(&overlap_file)?
    };

    Ok(OverlapSummary {
        sample,
        counts,
        total,
        percent: percent(counts, total)?,
    })
}

/// Summarize the overlap of every query with the reference called `reference_name`, reading
/// `<overlap_dir>/<query>_<reference>_overlap.txt`. Rows come out in the order of `queries`.
/// With anything but [`Cleanup::Keep`], consumed files are deleted right after their row is
/// computed, so a failure halfway leaves the earlier files deleted.
pub fn summarize_queries<P: AsRef<Path>>(
    queries: &[Query],
    reference_name: &str,
    overlap_dir: P,
    cleanup: Cleanup,
) -> Result<Vec<OverlapSummary>> {
    let mut rows = Vec::with_capacity(queries.len());
    for query in queries {
        let overlap_file = overlap_path(&overlap_dir, &query.name, reference_name);
        let mut row = summarize_overlap(&overlap_file, &query.path)?;
        row.sample = query.name.clone();
        info!("{}", query.name);

        match cleanup {
            Cleanup::Keep => (),
            Cleanup::OverlapFiles => utils::remove_file(&overlap_file)?,
            Cleanup::OverlapAndQueryFiles => {
                utils::remove_file(&overlap_file)?;
                utils::remove_file(&query.path)?;
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Overlaps between every ordered pair of samples.
/// Column `j`, row `i` holds the overlap of sample `j` (the `-a` file) with sample `i`.
/// The diagonal is `None`. Since every ordered pair is computed separately, the matrices
/// are not symmetric in general.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapMatrices {
    pub samples: Vec<String>,
    pub counts: Array2<Option<usize>>,
    pub percents: Array2<Option<f64>>,
}

impl OverlapMatrices {
    fn index(&self, sample: &str) -> Option<usize> {
        self.samples.iter().position(|s| s == sample)
    }

    pub fn count(&self, query: &str, reference: &str) -> Option<usize> {
        self.counts[[self.index(reference)?, self.index(query)?]]
    }

    pub fn percent(&self, query: &str, reference: &str) -> Option<f64> {
        self.percents[[self.index(reference)?, self.index(query)?]]
    }
}

/// Build count and percent matrices from the output of
/// [`between_jobs`](crate::jobs::between_jobs). Samples are sorted first. A zero-byte
/// sample file has no loops, and a zero-byte overlap file has no overlaps. If `delete` is
/// set, every overlap file is removed once read.
pub fn between_sample_matrices<P: AsRef<Path>, Q: AsRef<Path>>(
    samples: &[String],
    sample_dir: P,
    overlap_dir: Q,
    delete: bool,
) -> Result<OverlapMatrices> {
    let mut samples = samples.to_vec();
    samples.sort();
    samples.dedup();

    let n = samples.len();
    let mut counts = Array2::from_elem((n, n), None);
    let mut percents = Array2::from_elem((n, n), None);

    for (i, sample) in samples.iter().enumerate() {
        let sample_file = sample_path(sample, &sample_dir);
        let total = if utils::is_empty_file(&sample_file)? {
            warn!("{} is empty", sample_file.display());
            0
        } else {
            utils::count_lines(&sample_file)?
        };

        for (j, other) in samples.iter().enumerate() {
            if i == j {
                continue;
            }
            let overlap_file = overlap_path(&overlap_dir, sample, other);
            let n_overlaps = if utils::is_empty_file(&overlap_file)? {
                0
            } else {
                count_unique_loops(&overlap_file)?
            };
            counts[[j, i]] = Some(n_overlaps);
            percents[[j, i]] = Some(
                percent(n_overlaps, total)
                    .with_context(|| format!("Could not compare {sample} with {other}"))?,
            );

            if delete {
                utils::remove_file(&overlap_file)?;
            }
        }
        info!("{sample}");
    }

    Ok(OverlapMatrices {
        samples,
        counts,
        percents,
    })
}
