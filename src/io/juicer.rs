//! Preparing per-sample BEDPE files from Juicer HiCCUPS output.
//!
//! Juicer stores the merged loop list of a sample at
//! `<juicer_dir>/<sample>/aligned/inter_30_loops/merged_loops.bedpe`. That file has a header
//! (`chr1 x1 x2 chr2 y1 y2 ...`, sometimes prefixed with `#`) and contigs without the `chr`
//! prefix, so it is copied next to the other samples and rewritten to plain six-column BEDPE.
use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use log::info;

use crate::{
    bedpe::{self, BedpeRecord},
    query::sample_path,
};

/// Location of the merged loop list inside a sample's Juicer output directory.
pub const MERGED_LOOPS: &str = "aligned/inter_30_loops/merged_loops.bedpe";

const CANONICAL_COLUMNS: [&str; 6] = ["chr1", "x1", "x2", "chr2", "y1", "y2"];
const CHROM_PREFIX: &str = "chr";

/// Copy the merged loop list of every sample in `samples` to `<sample_dir>/<sample>.bedpe`.
/// Samples are copied in order, a failure leaves the samples before it in place.
pub fn copy_sample_loops<P: AsRef<Path>, Q: AsRef<Path>>(
    juicer_dir: P,
    sample_dir: Q,
    samples: &[String],
) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::with_capacity(samples.len());
    for sample in samples {
        let source = juicer_dir.as_ref().join(sample).join(MERGED_LOOPS);
        let target = sample_path(sample, &sample_dir);
        fs::copy(&source, &target).with_context(|| {
            format!(
                "Could not copy {} to {}",
                source.display(),
                target.display()
            )
        })?;
        info!("Copied loops of {sample} to {}", target.display());
        copied.push(target);
    }
    Ok(copied)
}

/// Rewrite `<sample_dir>/<sample>.bedpe` for every sample as headerless six-column BEDPE
/// in `output_dir`, adding the `chr` prefix to both contig columns. If `output_dir` is
/// `sample_dir`, the files are overwritten in place.
pub fn reformat_sample_loops<P: AsRef<Path>, Q: AsRef<Path>>(
    sample_dir: P,
    output_dir: Q,
    samples: &[String],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(samples.len());
    for sample in samples {
        let source = sample_path(sample, &sample_dir);
        let records = read_juicer_loops(&source)?;

        let target = sample_path(sample, &output_dir);
        bedpe::write_bedpe(&target, &records)?;
        info!("Wrote {} loops of {sample} to {}", records.len(), target.display());
        written.push(target);
    }
    Ok(written)
}

/// Read a Juicer loop list and return its loops with `chr`-prefixed contigs.
pub fn read_juicer_loops<P: AsRef<Path>>(path: P) -> Result<Vec<BedpeRecord>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Could not read loop file {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Could not read header of {}", path.display()))?
        .clone();
    let columns = canonical_column_indices(&headers)
        .with_context(|| format!("Unexpected header in {}", path.display()))?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record =
            result.with_context(|| format!("Failed to read loop record in {}", path.display()))?;
        if record.get(0).is_some_and(|field| field.starts_with('#')) {
            continue;
        }
        let selected: StringRecord = columns
            .iter()
            .map(|&idx| record.get(idx).unwrap_or(""))
            .collect();
        let mut loop_record = BedpeRecord::from_fields(&selected)
            .with_context(|| format!("Malformed loop record in {}", path.display()))?;
        loop_record.chrom1 = with_chrom_prefix(&loop_record.chrom1);
        loop_record.chrom2 = with_chrom_prefix(&loop_record.chrom2);
        records.push(loop_record);
    }

    Ok(records)
}

fn canonical_column_indices(headers: &StringRecord) -> Result<[usize; 6]> {
    let names: Vec<&str> = headers
        .iter()
        .map(|name| name.trim().trim_start_matches('#'))
        .collect();

    let mut indices = [0; 6];
    for (slot, column) in indices.iter_mut().zip(CANONICAL_COLUMNS) {
        *slot = names
            .iter()
            .position(|name| *name == column)
            .with_context(|| format!("Missing column '{column}'"))?;
    }
    Ok(indices)
}

/// Prefix `chrom` with `chr` unless it already starts with it.
pub fn with_chrom_prefix(chrom: &str) -> String {
    if chrom.starts_with(CHROM_PREFIX) {
        chrom.to_string()
    } else {
        format!("{CHROM_PREFIX}{chrom}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrom_prefix_is_idempotent() {
        assert_eq!("chr1", with_chrom_prefix("1"));
        assert_eq!("chrX", with_chrom_prefix("X"));
        assert_eq!("chr1", with_chrom_prefix("chr1"));
    }

    #[test]
    fn reorders_and_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S1.bedpe");
        fs::write(
            &path,
            "#chr1\tx1\tx2\tchr2\ty1\ty2\tname\tscore\n\
             # juicer_tools version 1.22\n\
             1\t100\t200\t1\t5000\t5100\t.\t.\n\
             X\t10\t20\tX\t900\t950\t.\t.\n",
        )
        .unwrap();

        let records = read_juicer_loops(&path).unwrap();
        assert_eq!(2, records.len());
        assert_eq!("chr1", records[0].chrom1);
        assert_eq!("chr1", records[0].chrom2);
        assert_eq!(5100, records[0].end2);
        assert_eq!("chrX", records[1].chrom2);
    }

    #[test]
    fn columns_found_by_name() {
        let headers = StringRecord::from(vec!["y2", "y1", "chr2", "x2", "x1", "chr1"]);
        assert_eq!([5, 4, 3, 2, 1, 0], canonical_column_indices(&headers).unwrap());

        let headers = StringRecord::from(vec!["chr1", "x1", "x2", "chr2", "y1"]);
        assert!(canonical_column_indices(&headers).is_err());
    }

    #[test]
    fn rewrite_in_place() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("S1.bedpe"),
            "chr1\tx1\tx2\tchr2\ty1\ty2\n2\t1\t2\t2\t3\t4\n",
        )
        .unwrap();

        let samples = vec![String::from("S1")];
        reformat_sample_loops(dir.path(), dir.path(), &samples).unwrap();

        let text = fs::read_to_string(dir.path().join("S1.bedpe")).unwrap();
        assert_eq!("chr2\t1\t2\tchr2\t3\t4\n", text);
    }
}
