//! Writing swarm scripts and handing them to the scheduler.
//!
//! Submitting to swarm is fire-and-forget. A [`Submission`] only says that swarm accepted
//! the script, so the overlap files may not exist yet when it is returned. Wait for the
//! swarm jobs to finish before running [`crate::overlap`] on their output.
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

use super::Job;
use crate::cli::ToolOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Submit the script with `swarm`
    Swarm,
    /// Run every job in this process, one after another
    Local,
    /// Only write the script
    ScriptOnly,
}

#[derive(Debug)]
pub struct Submission {
    pub script: PathBuf,
    pub n_jobs: usize,
    pub dispatch: Dispatch,
}

impl Submission {
    /// Whether the job outputs are produced outside this process and may not exist yet.
    pub fn awaits_scheduler(&self) -> bool {
        !matches!(self.dispatch, Dispatch::Local)
    }
}

/// Write one rendered job per line to `path`.
pub fn write_script<P: AsRef<Path>>(path: P, jobs: &[Job], bedtools: &str) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Could not create swarm script {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for job in jobs {
        writeln!(writer, "{}", job.render(bedtools))
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// Write `jobs` to the swarm script at `script` and run them as requested by `mode`.
pub fn dispatch<P: AsRef<Path>>(
    jobs: &[Job],
    script: P,
    tools: &ToolOptions,
    mode: Dispatch,
) -> Result<Submission> {
    let script = script.as_ref();
    if jobs.is_empty() {
        warn!("No jobs to write to {}", script.display());
    }
    write_script(script, jobs, &tools.bedtools)?;
    info!("Wrote {} jobs to {}", jobs.len(), script.display());

    match mode {
        Dispatch::Swarm => {
            submit_script(script, tools)?;
            info!(
                "Submitted {} to swarm. Wait for the jobs to finish before summarizing",
                script.display()
            );
        }
        Dispatch::Local => run_local(jobs, tools)?,
        Dispatch::ScriptOnly => (),
    }

    Ok(Submission {
        script: script.to_path_buf(),
        n_jobs: jobs.len(),
        dispatch: mode,
    })
}

/// Run `swarm -f <script> --module <module> -g <gb_per_process>` and return once swarm has
/// accepted it.
pub fn submit_script<P: AsRef<Path>>(script: P, tools: &ToolOptions) -> Result<()> {
    let script = script.as_ref();
    let status = Command::new(&tools.swarm)
        .arg("-f")
        .arg(script)
        .arg("--module")
        .arg(&tools.module)
        .arg("-g")
        .arg(tools.gb_per_process.to_string())
        .status()
        .with_context(|| format!("Could not run `{}`", tools.swarm))?;

    if !status.success() {
        bail!("`{}` failed on {}: {status}", tools.swarm, script.display());
    }
    Ok(())
}

/// Run a single job with the bedtools executable from `tools`, redirecting stdout to the
/// job's output file.
pub fn run_job(job: &Job, tools: &ToolOptions) -> Result<()> {
    debug!("Running {}", job.render(&tools.bedtools));
    let output = File::create(&job.output)
        .with_context(|| format!("Could not create output file {}", job.output.display()))?;

    let status = Command::new(&tools.bedtools)
        .args(job.args())
        .stdout(Stdio::from(output))
        .status()
        .with_context(|| format!("Could not run `{}`", tools.bedtools))?;

    if !status.success() {
        bail!("`{}` exited with {status}", job.render(&tools.bedtools));
    }
    Ok(())
}

/// Run `jobs` in order. Stops at the first failure.
pub fn run_local(jobs: &[Job], tools: &ToolOptions) -> Result<()> {
    for job in jobs {
        run_job(job, tools)?;
        info!("Finished {}", job.output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{Operation, OverlapType};
    use std::fs;

    fn pairtobed_job(dir: &Path, name: &str) -> Job {
        Job {
            query: dir.join(format!("{name}.bedpe")),
            operation: Operation::PairToBed {
                bed: dir.join("peaks.bed"),
                overlap_type: OverlapType::Either,
            },
            output: dir.join(format!("{name}_peaks_overlap.txt")),
        }
    }

    #[test]
    fn script_only() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = vec![pairtobed_job(dir.path(), "A"), pairtobed_job(dir.path(), "B")];
        let script = dir.path().join("all_peaks_overlap.swarm");

        let submission =
            dispatch(&jobs, &script, &ToolOptions::default(), Dispatch::ScriptOnly).unwrap();

        assert_eq!(2, submission.n_jobs);
        assert!(submission.awaits_scheduler());
        let text = fs::read_to_string(&script).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(2, lines.len());
        assert!(lines[1].starts_with("bedtools pairtobed -a "));
        assert!(lines[1].ends_with("B_peaks_overlap.txt"));
    }

    #[test]
    fn local_run_redirects_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = vec![pairtobed_job(dir.path(), "A")];
        // `echo` stands in for bedtools and prints its arguments
        let tools = ToolOptions {
            bedtools: "echo".into(),
            ..ToolOptions::default()
        };

        let script = dir.path().join("local.swarm");
        let submission = dispatch(&jobs, script, &tools, Dispatch::Local).unwrap();

        assert!(!submission.awaits_scheduler());
        let text = fs::read_to_string(&jobs[0].output).unwrap();
        assert!(text.starts_with("pairtobed -a "));
        assert!(text.trim_end().ends_with("-type either"));
    }

    #[test]
    fn failing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = vec![pairtobed_job(dir.path(), "A")];
        let tools = ToolOptions {
            bedtools: "false".into(),
            swarm: "false".into(),
            ..ToolOptions::default()
        };

        assert!(run_local(&jobs, &tools).is_err());
        assert!(dispatch(&jobs, dir.path().join("x.swarm"), &tools, Dispatch::Swarm).is_err());
    }

    #[test]
    fn swarm_submission() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = vec![pairtobed_job(dir.path(), "A")];
        let tools = ToolOptions {
            swarm: "true".into(),
            ..ToolOptions::default()
        };

        let submission =
            dispatch(&jobs, dir.path().join("x.swarm"), &tools, Dispatch::Swarm).unwrap();
        assert_eq!(Dispatch::Swarm, submission.dispatch);
        assert!(submission.awaits_scheduler());
    }
}
