//! Converting cLoops loop calls to BEDPE.
//!
//! cLoops writes one loop per row of a tab-separated table with a header:
//!
//! `loopId ES FDR binomal_p-value distance hypergeometric_p-value iva ivb ... significant`
//!
//! The two anchors are stored as composite `chrom:start-end` strings in `iva` and `ivb`.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::info;
use serde::{de, Deserialize, Deserializer};

use crate::bedpe::{self, BedpeRecord, Locus};

/// Name of the BEDPE file written by [`convert_loop_file`].
pub const LOOPS_BEDPE: &str = "loops.bedpe";

#[derive(Debug, Clone, Deserialize)]
pub struct LoopRecord {
    #[serde(rename = "loopId", default)]
    pub loop_id: Option<String>,
    #[serde(rename = "ES", default)]
    pub enrichment_score: Option<f64>,
    #[serde(rename = "FDR", default)]
    pub fdr: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    pub iva: String,
    pub ivb: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub significant: bool,
}

impl LoopRecord {
    pub fn to_bedpe(&self) -> Result<BedpeRecord> {
        let context = || {
            format!(
                "Could not split anchors of loop {}",
                self.loop_id.as_deref().unwrap_or("<unnamed>")
            )
        };
        let a: Locus = self.iva.parse().with_context(context)?;
        let b: Locus = self.ivb.parse().with_context(context)?;
        Ok(BedpeRecord::from_loci(a, b))
    }
}

/// cLoops writes the significance indicator as `1`/`0` or `1.0`/`0.0` depending on version.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let s = String::deserialize(deserializer)?;
    match s.trim() {
        "1" | "1.0" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "0.0" | "false" | "False" | "FALSE" => Ok(false),
        other => Err(de::Error::custom(format!(
            "invalid significance value '{other}'"
        ))),
    }
}

/// Read all loops from the cLoops table at `path`.
pub fn read_loops<P: AsRef<Path>>(path: P) -> Result<Vec<LoopRecord>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Could not read loop file {}", path.display()))?;

    let mut loops = Vec::new();
    for result in reader.deserialize() {
        let record: LoopRecord = result
            .with_context(|| format!("Failed to deserialize loop record in {}", path.display()))?;
        loops.push(record);
    }

    info!("Read {} loops from {}", loops.len(), path.display());
    Ok(loops)
}

/// Split the anchors of every loop into a BEDPE record. If `significant_only` is set, loops
/// that cLoops did not flag as significant are dropped first.
pub fn loops_to_bedpe(loops: &[LoopRecord], significant_only: bool) -> Result<Vec<BedpeRecord>> {
    loops
        .iter()
        .filter(|record| !significant_only || record.significant)
        .map(LoopRecord::to_bedpe)
        .collect()
}

/// Convert the cLoops table at `input` into `<output_dir>/loops.bedpe` and return the path
/// of the written file.
pub fn convert_loop_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    significant_only: bool,
) -> Result<PathBuf> {
    if significant_only {
        info!("Only including significant loops");
    }
    let loops = read_loops(&input)?;
    let records = loops_to_bedpe(&loops, significant_only)?;

    let output = output_dir.as_ref().join(LOOPS_BEDPE);
    bedpe::write_bedpe(&output, &records)?;
    info!("Wrote {} loops to {}", records.len(), output.display());

    Ok(output)
}
