//! # loopoverlap
//!
//! Library backing the `loopoverlap` and `loop2bedpe` binaries. It converts chromatin loop
//! calls into BEDPE, prepares per-sample BEDPE files, writes `bedtools` overlap jobs into
//! `swarm` batch scripts and folds the finished overlap files into summary tables and
//! between-sample matrices.
//!
//! The interval arithmetic itself is left to `bedtools`, and scheduling is left to `swarm`.
//! Submitting a script returns as soon as `swarm` accepts it. Callers must wait for the
//! scheduler to finish before summarizing the overlap files.
pub mod bedpe;
pub mod cli;
pub mod io;
pub mod jobs;
pub mod overlap;
pub mod query;
pub mod shuffle;
pub mod utils;
