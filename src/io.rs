//! # Reading and writing tables
//!
//! Input formats live in the sub-modules: cLoops loop calls ([`cloops`]), Juicer loop lists
//! ([`juicer`]) and JSON sample sheets ([`json`]). This module holds the writers for the
//! summary tables and matrices produced by [`crate::overlap`].
use std::{fmt::Debug, fs::File, io, path::Path};

use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use ndarray::Array2;

use crate::overlap::OverlapSummary;

pub mod cloops;
pub mod json;
pub mod juicer;

/// Tab-separated writer to `output`, or to stdout if no path is given.
pub fn tsv_writer(output: Option<&Path>) -> Result<Writer<Box<dyn io::Write>>> {
    let sink: Box<dyn io::Write> = match output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Could not create output file {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    Ok(WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_writer(sink))
}

/// Write overlap summary rows with a `sample counts total percent` header.
pub fn write_summaries(rows: &[OverlapSummary], output: Option<&Path>) -> Result<()> {
    let mut writer = tsv_writer(output)?;
    writer.write_record(["sample", "counts", "total", "percent"])?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write summary row for {}", row.sample))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a square matrix labelled by `samples`. The first column holds the row labels,
/// missing values are written as empty cells. Values are formatted with `Debug`, which keeps
/// the `.0` of whole floats, so percentages read the same as in [`write_summaries`].
pub fn write_matrix<T: Debug>(
    samples: &[String],
    matrix: &Array2<Option<T>>,
    output: Option<&Path>,
) -> Result<()> {
    let mut writer = tsv_writer(output)?;

    let mut header = vec![String::from("sample")];
    header.extend(samples.iter().cloned());
    writer.write_record(&header)?;

    for (sample, row) in samples.iter().zip(matrix.rows()) {
        let mut line = vec![sample.clone()];
        line.extend(row.iter().map(|cell| match cell {
            Some(value) => format!("{value:?}"),
            None => String::new(),
        }));
        writer
            .write_record(&line)
            .with_context(|| format!("Failed to write matrix row for {sample}"))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::fs;

    #[test]
    fn matrix_with_missing_diagonal() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("counts.tsv");
        let samples = vec![String::from("A"), String::from("B")];
        let matrix = array![[None, Some(3)], [Some(1), None]];

        write_matrix(&samples, &matrix, Some(&out)).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert_eq!("sample\tA\tB\nA\t\t3\nB\t1\t\n", text);
    }

    #[test]
    fn matrix_percent_format_matches_summaries() {
        let dir = tempfile::tempdir().unwrap();
        let samples = vec![String::from("A"), String::from("B")];
        let percent = 200. / 3.;

        let out = dir.path().join("percent.tsv");
        let matrix = array![[None, Some(50.)], [Some(percent), None]];
        write_matrix(&samples, &matrix, Some(&out)).unwrap();
        let matrix_text = fs::read_to_string(&out).unwrap();

        let out = dir.path().join("summary.tsv");
        let rows = vec![OverlapSummary {
            sample: "B".into(),
            counts: 2,
            total: 3,
            percent,
        }];
        write_summaries(&rows, Some(&out)).unwrap();
        let summary_text = fs::read_to_string(&out).unwrap();

        assert_eq!("sample\tA\tB\nA\t\t50.0\nB\t66.66666666666667\t\n", matrix_text);
        assert!(summary_text.ends_with("B\t2\t3\t66.66666666666667\n"));
    }

    #[test]
    fn summaries_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.tsv");
        let rows = vec![OverlapSummary {
            sample: "A".into(),
            counts: 1,
            total: 10,
            percent: 10.0,
        }];

        write_summaries(&rows, Some(&out)).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert_eq!("sample\tcounts\ttotal\tpercent\nA\t1\t10\t10.0\n", text);
    }
}
