//! # Paired genomic intervals
//!
//! [`BedpeRecord`] is the six-column representation of a chromatin loop that every other
//! part of the crate reads and writes. [`Locus`] is a single anchor, as it appears in
//! composite `chrom:start-end` strings.
use std::{fmt, path::Path, str::FromStr, sync::LazyLock};

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of leading columns that identify an interval pair in BEDPE-derived files.
pub const BEDPE_COLUMNS: usize = 6;

static LOCUS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\s]+):(\d+)-(\d+)$").expect("locus pattern is valid"));

/// One anchor of a loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locus {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl FromStr for Locus {
    type Err = anyhow::Error;

    /// Parse a locus from `chrom:start-end`, e.g. `chr1:1000-2000`.
    fn from_str(s: &str) -> Result<Self> {
        let Some(caps) = LOCUS_PATTERN.captures(s.trim()) else {
            bail!("Locus '{s}' does not match the expected format 'chrom:start-end'");
        };
        let start = caps[2]
            .parse()
            .with_context(|| format!("Invalid start coordinate in locus '{s}'"))?;
        let end = caps[3]
            .parse()
            .with_context(|| format!("Invalid end coordinate in locus '{s}'"))?;

        Ok(Locus {
            chrom: caps[1].to_string(),
            start,
            end,
        })
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BedpeRecord {
    pub chrom1: String,
    pub start1: u64,
    pub end1: u64,
    pub chrom2: String,
    pub start2: u64,
    pub end2: u64,
}

impl BedpeRecord {
    pub fn from_loci(a: Locus, b: Locus) -> Self {
        BedpeRecord {
            chrom1: a.chrom,
            start1: a.start,
            end1: a.end,
            chrom2: b.chrom,
            start2: b.start,
            end2: b.end,
        }
    }

    /// Build a record from the first six fields of `record`. Extra fields are ignored.
    pub fn from_fields(record: &StringRecord) -> Result<Self> {
        if record.len() < BEDPE_COLUMNS {
            bail!(
                "Expected at least {BEDPE_COLUMNS} columns but found {}",
                record.len()
            );
        }
        let coord = |idx: usize| -> Result<u64> {
            let field = &record[idx];
            field
                .parse()
                .with_context(|| format!("Invalid coordinate '{field}' in column {}", idx + 1))
        };

        Ok(BedpeRecord {
            chrom1: record[0].to_string(),
            start1: coord(1)?,
            end1: coord(2)?,
            chrom2: record[3].to_string(),
            start2: coord(4)?,
            end2: coord(5)?,
        })
    }

    pub fn first_anchor(&self) -> Locus {
        Locus {
            chrom: self.chrom1.clone(),
            start: self.start1,
            end: self.end1,
        }
    }

    pub fn second_anchor(&self) -> Locus {
        Locus {
            chrom: self.chrom2.clone(),
            start: self.start2,
            end: self.end2,
        }
    }
}

/// Read a headerless BEDPE file. Columns beyond the sixth are ignored.
pub fn read_bedpe<P: AsRef<Path>>(path: P) -> Result<Vec<BedpeRecord>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Could not read bedpe file {}", path.display()))?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("Failed to read line {} of {}", i + 1, path.display()))?;
        let bedpe = BedpeRecord::from_fields(&record)
            .with_context(|| format!("Malformed line {} in {}", i + 1, path.display()))?;
        records.push(bedpe);
    }

    Ok(records)
}

/// Write `records` to `path` as a tab-separated BEDPE file without header, replacing
/// whatever was there before.
pub fn write_bedpe<P: AsRef<Path>>(path: P, records: &[BedpeRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Could not create bedpe file {}", path.display()))?;

    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write bedpe record to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    Ok(())
}
