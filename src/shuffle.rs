//! # Shuffled background loops
//!
//! `bedtools shuffle -bedpe` places each loop of a sample at a random position within the
//! genome, which gives a background to compare real overlaps against. Shuffled files are
//! regular [`Query`] values, so jobs and summaries for them go through [`crate::jobs`] and
//! [`crate::overlap`] like real samples do.
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use log::info;

use crate::{
    cli::ToolOptions,
    jobs::{dispatch, Job, Operation},
    query::{sample_path, Query},
};

/// Name of shuffle `i` of `sample`. A single shuffle carries no index.
pub fn shuffle_name(sample: &str, i: usize, n: usize) -> String {
    if n == 1 {
        format!("{sample}_shuffle")
    } else {
        format!("{sample}_shuffle_{i}")
    }
}

/// The `n` shuffled files of every sample in `shuffle_dir`, grouped by sample.
pub fn shuffled_queries<P: AsRef<Path>>(
    samples: &[String],
    n: usize,
    shuffle_dir: P,
) -> Result<Vec<Query>> {
    if n == 0 {
        bail!("Number of shuffles must be at least 1");
    }
    let mut queries = Vec::with_capacity(samples.len() * n);
    for sample in samples {
        for i in 0..n {
            let name = shuffle_name(sample, i, n);
            let path = shuffle_dir.as_ref().join(format!("{name}.bedpe"));
            queries.push(Query { name, path });
        }
    }
    Ok(queries)
}

/// One `bedtools shuffle` job per shuffled file.
pub fn shuffle_jobs<P: AsRef<Path>, Q: AsRef<Path>>(
    samples: &[String],
    n: usize,
    sample_dir: P,
    shuffle_dir: Q,
    genome: &Path,
) -> Result<Vec<Job>> {
    let queries = shuffled_queries(samples, n, shuffle_dir)?;
    let jobs = samples
        .iter()
        .flat_map(|sample| std::iter::repeat(sample_path(sample, &sample_dir)).take(n))
        .zip(queries)
        .map(|(source, shuffled): (PathBuf, Query)| Job {
            query: source,
            operation: Operation::Shuffle {
                genome: genome.to_path_buf(),
            },
            output: shuffled.path,
        })
        .collect();
    Ok(jobs)
}

/// Shuffle every sample `n` times, one sample after the other, and return the shuffled files.
pub fn shuffle_samples<P: AsRef<Path>, Q: AsRef<Path>>(
    samples: &[String],
    n: usize,
    sample_dir: P,
    shuffle_dir: Q,
    genome: &Path,
    tools: &ToolOptions,
) -> Result<Vec<Query>> {
    let jobs = shuffle_jobs(samples, n, &sample_dir, &shuffle_dir, genome)?;
    for job in &jobs {
        dispatch::run_job(job, tools)?;
    }
    info!("Wrote {} shuffled files", jobs.len());
    shuffled_queries(samples, n, shuffle_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_shuffle_has_no_index() {
        let queries = shuffled_queries(&[String::from("B")], 1, "/sh").unwrap();
        assert_eq!(1, queries.len());
        assert_eq!("B_shuffle", queries[0].name);
        assert_eq!(PathBuf::from("/sh/B_shuffle.bedpe"), queries[0].path);
    }

    #[test]
    fn indexed_shuffles() {
        let samples = vec![String::from("A"), String::from("B")];
        let queries = shuffled_queries(&samples, 3, "/sh").unwrap();
        let names: Vec<&str> = queries.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(
            vec![
                "A_shuffle_0",
                "A_shuffle_1",
                "A_shuffle_2",
                "B_shuffle_0",
                "B_shuffle_1",
                "B_shuffle_2"
            ],
            names
        );
        assert!(shuffled_queries(&samples, 0, "/sh").is_err());
    }

    #[test]
    fn jobs_read_the_sample_file() {
        let samples = vec![String::from("A"), String::from("B")];
        let jobs = shuffle_jobs(&samples, 2, "/nh", "/sh", Path::new("/ref/hg38.sizes")).unwrap();
        assert_eq!(4, jobs.len());
        assert_eq!(PathBuf::from("/nh/B.bedpe"), jobs[2].query);
        assert_eq!(PathBuf::from("/sh/B_shuffle_0.bedpe"), jobs[2].output);
        assert_eq!(
            "bedtools shuffle -i /nh/A.bedpe -g /ref/hg38.sizes -bedpe > /sh/A_shuffle_1.bedpe",
            jobs[1].render("bedtools")
        );
    }
}
