//! # Utility functions
//!
//! Small file-system helpers shared by the job generator and the aggregator.
use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::Path,
};

/// Infer a name from the file stem of `filepath`. Sample files, reference files and
/// shuffled files are all identified this way in output names.
///
/// # Examples
///
/// ```
/// let name = loopoverlap::utils::name_from_path("./path/to/ctcf_peaks.bed").unwrap();
///
/// assert_eq!("ctcf_peaks", name);
/// ```
pub fn name_from_path<P: AsRef<Path>>(filepath: P) -> Result<String> {
    let filepath = filepath.as_ref();
    let context = || format!("Could not infer name from path {}", filepath.display());
    let name = filepath
        .file_stem()
        .with_context(context)?
        .to_str()
        .with_context(context)?;

    Ok(String::from(name))
}

/// Check whether the file at `path` is zero bytes long. Fails if the file does not exist.
pub fn is_empty_file<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    let metadata =
        fs::metadata(path).with_context(|| format!("Could not stat file {}", path.display()))?;
    Ok(metadata.len() == 0)
}

/// Count the non-blank lines in the file at `path`.
pub fn count_lines<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;

    let mut n = 0;
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("Failed to read from {}", path.display()))?;
        if !line.trim().is_empty() {
            n += 1;
        }
    }
    Ok(n)
}

/// Remove the file at `path`, for opt-in cleanup of consumed intermediate files.
pub fn remove_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    fs::remove_file(path).with_context(|| format!("Could not remove {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn name_from_nested_path() {
        assert_eq!("A", name_from_path("/data/samples/A.bedpe").unwrap());
        assert_eq!("B_shuffle_2", name_from_path("B_shuffle_2.bedpe").unwrap());
        assert!(name_from_path("/").is_err());
    }

    #[test]
    fn counts_non_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a\tb\n\nc\td\n   \ne\tf").unwrap();
        assert_eq!(3, count_lines(file.path()).unwrap());
    }

    #[test]
    fn empty_file_detection() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        assert!(is_empty_file(file.path()).unwrap());
        writeln!(file, "x").unwrap();
        file.flush().unwrap();
        assert!(!is_empty_file(file.path()).unwrap());
        assert!(is_empty_file("/definitely/not/here.txt").is_err());
    }
}
