use std::path::{Path, PathBuf};

/// A BEDPE file that is compared against a reference. `name` identifies the file in overlap
/// output names and in summary rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub path: PathBuf,
}

impl Query {
    pub fn new(name: &str, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }

    /// The prepared BEDPE file of `sample`, i.e. `<sample_dir>/<sample>.bedpe`.
    pub fn sample<P: AsRef<Path>>(sample: &str, sample_dir: P) -> Self {
        Self::new(sample, sample_path(sample, sample_dir))
    }
}

pub fn sample_path<P: AsRef<Path>>(sample: &str, sample_dir: P) -> PathBuf {
    sample_dir.as_ref().join(format!("{sample}.bedpe"))
}

/// Queries for every sample in `samples`, in order.
pub fn sample_queries<P: AsRef<Path>>(samples: &[String], sample_dir: P) -> Vec<Query> {
    samples
        .iter()
        .map(|sample| Query::sample(sample, &sample_dir))
        .collect()
}

/// Where `bedtools` output for `query_name` against `reference_name` is written.
pub fn overlap_path<P: AsRef<Path>>(
    overlap_dir: P,
    query_name: &str,
    reference_name: &str,
) -> PathBuf {
    overlap_dir
        .as_ref()
        .join(format!("{query_name}_{reference_name}_overlap.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_query_paths() {
        let query = Query::sample("A", "/data/nh");
        assert_eq!("A", query.name);
        assert_eq!(PathBuf::from("/data/nh/A.bedpe"), query.path);
        assert_eq!(
            PathBuf::from("/data/overlap/A_ctcf_overlap.txt"),
            overlap_path("/data/overlap", &query.name, "ctcf")
        );
    }
}
