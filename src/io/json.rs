use std::{fs::File, io::BufReader, path::Path};

use anyhow::{bail, Context, Result};

/// Read sample identifiers from a json sample sheet at `path`.
/// The json should be an array of sample names, e.g.:
/// `
/// [
///     "PPMI_3000",
///     ... other samples ...
///     "PPMI_4010"
/// ]
/// `
pub fn read_sample_sheet<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let file = File::open(&path)
        .with_context(|| format!("Could not read json {}", path.as_ref().display()))?;
    let reader = BufReader::new(file);
    let samples: Vec<String> = serde_json::from_reader(reader)
        .with_context(|| format!("Could not deserialize json {}", path.as_ref().display()))?;
    if samples.is_empty() {
        bail!("Sample sheet {} lists no samples", path.as_ref().display());
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sample_sheet() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["A", "B", "C"]"#).unwrap();
        assert_eq!(vec!["A", "B", "C"], read_sample_sheet(file.path()).unwrap());
    }

    #[test]
    fn empty_or_invalid_sample_sheet() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(read_sample_sheet(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"A": 1}}"#).unwrap();
        assert!(read_sample_sheet(file.path()).is_err());
    }
}
